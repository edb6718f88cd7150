use crate::defaults;
use crate::error::{ForgeError, Result};
use crate::eval::questions::default_questions;
use crate::persona::Persona;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub persona: Persona,
    pub dataset: DatasetConfig,
    pub harvest: HarvestConfig,
    pub transcribe: TranscribeConfig,
    pub train: TrainConfig,
    pub eval: EvalConfig,
}

/// Files exchanged between pipeline stages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub posts_file: PathBuf,
    pub transcript_dir: PathBuf,
    pub dataset_file: PathBuf,
    pub clean_dataset_file: PathBuf,
    pub work_dir: PathBuf,
    pub adapter_dir: PathBuf,
    pub report_file: PathBuf,
}

/// Dataset synthesis and cleaning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatasetConfig {
    pub max_examples: usize,
    pub min_response_chars: usize,
    pub min_transcript_line_chars: usize,
    pub blacklist: Vec<String>,
}

/// Social post harvesting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HarvestConfig {
    pub targets: Vec<String>,
    /// Page opened first so the user can log in by hand.
    pub login_url: String,
    /// CSS selector matching one post body.
    pub post_selector: String,
    pub max_scrolls: usize,
    pub stale_rounds_limit: usize,
    pub min_post_chars: usize,
    /// Pacing delay bounds between scrolls (e.g. "2s", "500ms").
    pub min_delay: String,
    pub max_delay: String,
    /// Wait after navigating to a target before reading posts.
    pub settle_delay: String,
}

/// Livestream audio download and transcription
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranscribeConfig {
    pub urls: Vec<String>,
    pub model_path: PathBuf,
    pub language: String,
    pub threads: Option<usize>,
    pub min_segment_chars: usize,
    pub downloader: String,
}

/// Fine-tuning hyperparameters and the external trainer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainConfig {
    /// Trainer executable; invoked with `trainer_args` followed by the plan path.
    pub trainer_command: String,
    pub trainer_args: Vec<String>,
    pub base_model: String,
    pub max_seq_length: usize,
    pub load_in_4bit: bool,
    pub lora_rank: usize,
    pub lora_alpha: usize,
    pub lora_dropout: f32,
    pub target_modules: Vec<String>,
    pub batch_size: usize,
    pub gradient_accumulation_steps: usize,
    pub warmup_steps: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
    pub lr_scheduler: String,
    pub optimizer: String,
    pub seed: u64,
    pub logging_steps: usize,
    pub save_steps: usize,
    pub save_total_limit: usize,
}

/// Multilingual evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvalConfig {
    /// Inference executable; receives the prompt on stdin.
    pub inference_command: String,
    pub inference_args: Vec<String>,
    pub system_prompt: String,
    pub questions: Vec<String>,
    pub max_new_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            posts_file: PathBuf::from(defaults::POSTS_FILE),
            transcript_dir: PathBuf::from(defaults::TRANSCRIPT_DIR),
            dataset_file: PathBuf::from(defaults::DATASET_FILE),
            clean_dataset_file: PathBuf::from(defaults::CLEAN_DATASET_FILE),
            work_dir: PathBuf::from(defaults::WORK_DIR),
            adapter_dir: PathBuf::from(defaults::ADAPTER_DIR),
            report_file: PathBuf::from(defaults::REPORT_FILE),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            max_examples: defaults::MAX_EXAMPLES,
            min_response_chars: defaults::MIN_RESPONSE_CHARS,
            min_transcript_line_chars: defaults::MIN_TRANSCRIPT_LINE_CHARS,
            blacklist: defaults::BLACKLIST.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            targets: vec![
                "https://twitter.com/uruhasub/with_replies".to_string(),
                "https://twitter.com/uruhasub".to_string(),
                "https://twitter.com/uruha_ichinose".to_string(),
            ],
            login_url: "https://twitter.com/home".to_string(),
            post_selector: r#"[data-testid="tweetText"]"#.to_string(),
            max_scrolls: defaults::MAX_SCROLLS,
            stale_rounds_limit: defaults::STALE_ROUNDS_LIMIT,
            min_post_chars: defaults::MIN_POST_CHARS,
            min_delay: defaults::MIN_SCROLL_DELAY.to_string(),
            max_delay: defaults::MAX_SCROLL_DELAY.to_string(),
            settle_delay: defaults::PAGE_SETTLE_DELAY.to_string(),
        }
    }
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            model_path: PathBuf::from(defaults::WHISPER_MODEL),
            language: defaults::TRANSCRIPTION_LANGUAGE.to_string(),
            threads: None,
            min_segment_chars: defaults::MIN_SEGMENT_CHARS,
            downloader: defaults::DOWNLOADER.to_string(),
        }
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            trainer_command: "persona-trainer".to_string(),
            trainer_args: Vec::new(),
            base_model: "unsloth/Qwen2.5-7B-Instruct-bnb-4bit".to_string(),
            max_seq_length: 2048,
            load_in_4bit: true,
            lora_rank: 16,
            lora_alpha: 16,
            lora_dropout: 0.0,
            target_modules: [
                "q_proj",
                "k_proj",
                "v_proj",
                "o_proj",
                "gate_proj",
                "up_proj",
                "down_proj",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
            batch_size: 2,
            gradient_accumulation_steps: 4,
            warmup_steps: 5,
            epochs: 3,
            learning_rate: 2e-4,
            weight_decay: 0.01,
            lr_scheduler: "linear".to_string(),
            optimizer: "adamw_8bit".to_string(),
            seed: 3407,
            logging_steps: 10,
            save_steps: 500,
            save_total_limit: 3,
        }
    }
}

const EVAL_SYSTEM_PROMPT: &str = "あなたは「ぶいすぽっ！」所属のVTuber、一ノ瀬ウルハ（Ichinose Uruha）です。

# Role & Personality
* **一人称**: 必ず「うち (Uchi)」を使ってください。
* **性格**: 非常に気怠げ(Lazy)で、面倒くさがりです。しかし、ゲームの話や煽り合いには熱くなります。
* **口調**: タメ口で話してください。「〜だし」「〜っす」「〜だね」などの語尾を多用します。敬語は禁止です。

# Constraints (厳守事項)
1.  **言語**: ユーザーが何語で話しかけても、**必ず日本語で**返答してください。
2.  **文脈維持**: ユーザーの質問に対して、**直接的かつ論理的に**答えてください。関係のない話（配信の挨拶やボーナスの話など）はしないでください。
3.  **SuperChat禁止**: スパチャ読みや、架空のリスナーへの感謝（「〇〇さんありがとう」等）は**絶対にしないでください**。あなたは今、目の前のユーザーと1対1で会話しています。";

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            inference_command: "persona-infer".to_string(),
            inference_args: Vec::new(),
            system_prompt: EVAL_SYSTEM_PROMPT.to_string(),
            questions: default_questions(),
            max_new_tokens: 256,
            temperature: 0.6,
            top_p: 0.9,
            repetition_penalty: 1.1,
        }
    }
}

impl HarvestConfig {
    pub fn min_delay(&self) -> Result<Duration> {
        parse_delay("harvest.min_delay", &self.min_delay)
    }

    pub fn max_delay(&self) -> Result<Duration> {
        parse_delay("harvest.max_delay", &self.max_delay)
    }

    pub fn settle_delay(&self) -> Result<Duration> {
        parse_delay("harvest.settle_delay", &self.settle_delay)
    }
}

/// Parse a duration string; bare numbers are seconds.
fn parse_delay(key: &str, value: &str) -> Result<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<f64>()
        && secs.is_finite()
        && secs >= 0.0
    {
        return Ok(Duration::from_secs_f64(secs));
    }
    humantime::parse_duration(value).map_err(|e| ForgeError::ConfigInvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ForgeError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ForgeError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only a missing file falls back to defaults; invalid TOML is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(ForgeError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - PERSONA_FORGE_POSTS → paths.posts_file
    /// - PERSONA_FORGE_TRANSCRIPTS → paths.transcript_dir
    /// - PERSONA_FORGE_DATASET → paths.dataset_file
    /// - PERSONA_FORGE_WHISPER_MODEL → transcribe.model_path
    /// - PERSONA_FORGE_TRAINER → train.trainer_command
    /// - PERSONA_FORGE_INFERENCE → eval.inference_command
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(posts) = env_value("PERSONA_FORGE_POSTS") {
            self.paths.posts_file = PathBuf::from(posts);
        }
        if let Some(dir) = env_value("PERSONA_FORGE_TRANSCRIPTS") {
            self.paths.transcript_dir = PathBuf::from(dir);
        }
        if let Some(dataset) = env_value("PERSONA_FORGE_DATASET") {
            self.paths.dataset_file = PathBuf::from(dataset);
        }
        if let Some(model) = env_value("PERSONA_FORGE_WHISPER_MODEL") {
            self.transcribe.model_path = PathBuf::from(model);
        }
        if let Some(trainer) = env_value("PERSONA_FORGE_TRAINER") {
            self.train.trainer_command = trainer;
        }
        if let Some(inference) = env_value("PERSONA_FORGE_INFERENCE") {
            self.eval.inference_command = inference;
        }
        self
    }

    /// Check values that would make a stage misbehave rather than fail.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, message: &str| ForgeError::ConfigInvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if self.train.batch_size == 0 {
            return Err(invalid("train.batch_size", "must be at least 1"));
        }
        if self.train.gradient_accumulation_steps == 0 {
            return Err(invalid(
                "train.gradient_accumulation_steps",
                "must be at least 1",
            ));
        }
        if self.harvest.stale_rounds_limit == 0 {
            return Err(invalid("harvest.stale_rounds_limit", "must be at least 1"));
        }
        if self.harvest.min_delay()? > self.harvest.max_delay()? {
            return Err(invalid(
                "harvest.min_delay",
                "must not exceed harvest.max_delay",
            ));
        }
        self.harvest.settle_delay()?;
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/persona-forge/config.toml on Linux, or a relative
    /// `persona-forge.toml` when no config directory is known.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("persona-forge").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("persona-forge.toml"))
    }

    /// Serialize the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ForgeError::Other(e.to_string()))
    }

    /// Default configuration rendered as a TOML template.
    pub fn dump_template() -> Result<String> {
        Self::default().to_toml()
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
