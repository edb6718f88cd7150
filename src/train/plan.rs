use crate::config::TrainConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// LoRA adapter shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoraParams {
    pub rank: usize,
    pub alpha: usize,
    pub dropout: f32,
    pub target_modules: Vec<String>,
}

/// Everything the external trainer needs for one run, written as `plan.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingPlan {
    pub base_model: String,
    pub max_seq_length: usize,
    pub load_in_4bit: bool,
    pub lora: LoraParams,
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
    /// JSONL file with one `{"text": ...}` record per example.
    pub train_file: PathBuf,
    /// Directory the adapter weights are saved to.
    pub output_dir: PathBuf,
    pub num_examples: usize,
    pub steps_per_epoch: usize,
    pub total_steps: usize,
}

/// Optimizer steps per epoch: `n / (batch × accumulation)`, rounded down.
///
/// Returns 0 when the effective batch size is 0.
pub fn steps_per_epoch(num_examples: usize, batch_size: usize, accumulation: usize) -> usize {
    match batch_size.saturating_mul(accumulation) {
        0 => 0,
        effective => num_examples / effective,
    }
}

impl TrainingPlan {
    pub fn new(
        config: &TrainConfig,
        train_file: PathBuf,
        output_dir: PathBuf,
        num_examples: usize,
    ) -> Self {
        let per_epoch = steps_per_epoch(
            num_examples,
            config.batch_size,
            config.gradient_accumulation_steps,
        );
        Self {
            base_model: config.base_model.clone(),
            max_seq_length: config.max_seq_length,
            load_in_4bit: config.load_in_4bit,
            lora: LoraParams {
                rank: config.lora_rank,
                alpha: config.lora_alpha,
                dropout: config.lora_dropout,
                target_modules: config.target_modules.clone(),
            },
            batch_size: config.batch_size,
            gradient_accumulation_steps: config.gradient_accumulation_steps,
            warmup_steps: config.warmup_steps,
            epochs: config.epochs,
            learning_rate: config.learning_rate,
            weight_decay: config.weight_decay,
            lr_scheduler: config.lr_scheduler.clone(),
            optimizer: config.optimizer.clone(),
            seed: config.seed,
            logging_steps: config.logging_steps,
            save_steps: config.save_steps,
            save_total_limit: config.save_total_limit,
            train_file,
            output_dir,
            num_examples,
            steps_per_epoch: per_epoch,
            total_steps: per_epoch.saturating_mul(config.epochs),
        }
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size * self.gradient_accumulation_steps
    }
}
