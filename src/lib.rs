//! persona-forge - Persona fine-tuning dataset pipeline
//!
//! Harvests posts, transcribes livestreams, synthesizes and cleans an
//! instruction dataset, then trains and evaluates a LoRA adapter.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod chat;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dataset;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod error;
pub mod eval;
pub mod exec;
pub mod harvest;
pub mod output;
pub mod persona;
pub mod stt;
pub mod train;
pub mod transcribe;

// Composition root
#[cfg(feature = "cli")]
pub mod app;

// Seams to the outside world
pub use eval::InferenceBackend;
pub use exec::{CommandExecutor, SystemCommandExecutor};
pub use harvest::PostSource;
pub use stt::Transcriber;

// Dataset
pub use dataset::TrainingExample;
pub use persona::Persona;

// Error handling
pub use error::{ForgeError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.0.1+abc1234"` when git hash is available, `"0.0.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
