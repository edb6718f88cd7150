//! Command-line interface for persona-forge
//!
//! Provides argument parsing using clap derive macros.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Persona fine-tuning dataset pipeline
#[derive(Parser, Debug)]
#[command(
    name = "persona-forge",
    version = crate::version_string(),
    about = "Build a persona fine-tuning dataset, train an adapter and evaluate it"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: per-item detail, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrape social posts into the post file
    Harvest(HarvestArgs),

    /// Download livestream audio and transcribe it into per-video text files
    Transcribe(TranscribeArgs),

    /// Combine transcripts, posts and rules into a shuffled training set
    Synthesize(SynthesizeArgs),

    /// Drop training examples whose output hits the blacklist
    Clean(CleanArgs),

    /// Render training text, write the training plan and run the trainer
    Train(TrainArgs),

    /// Ask the multilingual question battery and write a Q/A report
    Evaluate(EvaluateArgs),

    /// Check external tools and compiled features
    Check,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
pub struct HarvestArgs {
    /// Replay a saved snapshot file instead of driving a browser
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Target page (repeatable; default: configured targets)
    #[arg(long = "target", value_name = "URL")]
    pub targets: Vec<String>,

    /// Post file to write (default: paths.posts_file)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Keep posts already in the output file and add new ones after them
    #[arg(long)]
    pub append: bool,

    /// Skip the random pause between scroll rounds
    #[arg(long)]
    pub no_delay: bool,
}

#[derive(Args, Debug, Default)]
pub struct TranscribeArgs {
    /// Video URLs (default: configured urls)
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Directory for transcript files (default: paths.transcript_dir)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Whisper model file
    #[arg(long, value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Transcription language, or "auto"
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Inference threads (default: auto)
    #[arg(long, short = 't', value_name = "THREADS")]
    pub threads: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct SynthesizeArgs {
    /// Post file (default: paths.posts_file)
    #[arg(long, value_name = "FILE")]
    pub posts: Option<PathBuf>,

    /// Transcript directory (default: paths.transcript_dir)
    #[arg(long, value_name = "DIR")]
    pub transcripts: Option<PathBuf>,

    /// Dataset file to write (default: paths.dataset_file)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Cap on the final dataset size
    #[arg(long, value_name = "N")]
    pub max_examples: Option<usize>,

    /// Seed for shuffling and prompt choice (default: random)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Default)]
pub struct CleanArgs {
    /// Dataset file to read (default: paths.dataset_file)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Cleaned dataset file to write (default: paths.clean_dataset_file)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct TrainArgs {
    /// Dataset file to train on (default: paths.clean_dataset_file)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Directory for the rendered text and plan (default: paths.work_dir)
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Directory the trainer saves adapter weights to (default: paths.adapter_dir)
    #[arg(long, value_name = "DIR")]
    pub adapter_dir: Option<PathBuf>,

    /// Number of epochs
    #[arg(long, value_name = "N")]
    pub epochs: Option<usize>,

    /// Write the text and plan but do not start the trainer
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Default)]
pub struct EvaluateArgs {
    /// Adapter directory passed to the inference command (default: paths.adapter_dir)
    #[arg(long, value_name = "DIR")]
    pub adapter_dir: Option<PathBuf>,

    /// Report file to write (default: paths.report_file)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (file, env overrides, defaults)
    Show,
    /// Print the default configuration as TOML
    Dump,
    /// Print the default configuration file path
    Path,
}
