//! Default configuration constants for persona-forge.
//!
//! Shared by the config types and the pipeline stages so that a stage run
//! without a config file behaves exactly like one run with the dumped template.

/// Maximum number of examples kept in the synthesized dataset.
///
/// The shuffled set is truncated to this size, never resampled.
pub const MAX_EXAMPLES: usize = 6000;

/// How many times each vaccine rule is repeated in the synthesized set.
pub const RULE_WEIGHT: usize = 50;

/// Outputs with fewer characters than this are dropped by the cleaning filter.
pub const MIN_RESPONSE_CHARS: usize = 2;

/// Transcript lines must be longer than this (in characters) to be paired.
pub const MIN_TRANSCRIPT_LINE_CHARS: usize = 4;

/// Transcribed segments must be longer than this (in characters) to be written.
pub const MIN_SEGMENT_CHARS: usize = 5;

/// Harvested posts must be longer than this (in characters) to be kept.
pub const MIN_POST_CHARS: usize = 3;

/// Scroll rounds per harvest target.
pub const MAX_SCROLLS: usize = 30;

/// Consecutive rounds without new posts before moving to the next target.
pub const STALE_ROUNDS_LIMIT: usize = 3;

/// Pacing delay bounds between scroll rounds.
pub const MIN_SCROLL_DELAY: &str = "2s";
pub const MAX_SCROLL_DELAY: &str = "5s";

/// Settle time after navigating to a harvest target.
pub const PAGE_SETTLE_DELAY: &str = "3s";

/// Default whisper model file.
pub const WHISPER_MODEL: &str = "models/ggml-large-v3.bin";

/// Transcription language. Livestreams are Japanese, so detection is skipped.
pub const TRANSCRIPTION_LANGUAGE: &str = "ja";

/// Language value that triggers automatic language detection.
pub const AUTO_LANGUAGE: &str = "auto";

/// Sample rate expected by the transcriber.
pub const SAMPLE_RATE: u32 = 16000;

/// Audio downloader executable.
pub const DOWNLOADER: &str = "yt-dlp";

/// Default file locations, relative to the working directory.
pub const POSTS_FILE: &str = "raw_posts.json";
pub const TRANSCRIPT_DIR: &str = "raw_transcripts";
pub const DATASET_FILE: &str = "persona_train.json";
pub const CLEAN_DATASET_FILE: &str = "persona_clean_train.json";
pub const WORK_DIR: &str = "outputs";
pub const ADAPTER_DIR: &str = "persona_lora_adapters";
pub const REPORT_FILE: &str = "persona_multilingual_report.txt";

/// Substrings that mark an output as livestream noise.
///
/// Superchat/membership readings, thank-you spam, stream housekeeping words
/// and currency symbols.
pub const BLACKLIST: &[&str] = &[
    "スーパーチャット",
    "スパチャ",
    "Super Chat",
    "SuperChat",
    "メンバーシップ",
    "メンシプ",
    "Membership",
    "ありがとうございます",
    "ありがとうございまーす",
    "ナイスパ",
    "ないすぱ",
    "下記",
    "概要欄",
    "待機所",
    "配信",
    "￥",
    "¥",
];

/// Get the compiled GPU backend name for whisper.
///
/// Returns "CPU" when no GPU feature is enabled.
pub fn gpu_backend() -> &'static str {
    if cfg!(feature = "cuda") {
        "CUDA"
    } else if cfg!(feature = "vulkan") {
        "Vulkan"
    } else {
        "CPU"
    }
}
