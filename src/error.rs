//! Error types for persona-forge.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForgeError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Dataset errors
    #[error("Failed to parse {path}: {source}")]
    DatasetParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize dataset: {0}")]
    DatasetSerialize(#[from] serde_json::Error),

    // Harvest errors
    #[error("Post source error: {message}")]
    Harvest { message: String },

    #[error("Not logged in: {target} redirected to a login page")]
    LoginRequired { target: String },

    // Audio errors
    #[error("Audio download failed for {url}: {message}")]
    AudioDownload { url: String, message: String },

    #[error("Failed to decode audio: {message}")]
    AudioDecode { message: String },

    // Transcription errors
    #[error("Transcription model not found at {path}")]
    TranscriptionModelNotFound { path: String },

    #[error("Transcription inference failed: {message}")]
    TranscriptionInferenceFailed { message: String },

    // External tools
    #[error("External tool not found: {tool}")]
    ToolNotFound { tool: String },

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("Inference failed: {message}")]
    Inference { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ForgeError>;
