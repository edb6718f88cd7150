//! Whisper speech-to-text behind the `whisper` feature.
//!
//! Without the feature a stub keeps the same constructor so callers compile
//! unchanged; it checks the model path and refuses to transcribe.
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::config::TranscribeConfig;
use crate::defaults;
use crate::error::{ForgeError, Result};
use crate::stt::transcriber::Transcriber;
use std::path::PathBuf;

#[cfg(feature = "whisper")]
use std::sync::{Mutex, Once};
#[cfg(feature = "whisper")]
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

#[cfg(feature = "whisper")]
static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Model file, language and thread count for a whisper run.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    pub model_path: PathBuf,
    /// Language code such as "ja", or "auto" to detect per file
    pub language: String,
    /// Inference threads (None = whisper's default)
    pub threads: Option<usize>,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(defaults::WHISPER_MODEL),
            language: defaults::TRANSCRIPTION_LANGUAGE.to_string(),
            threads: None,
        }
    }
}

impl From<&TranscribeConfig> for WhisperConfig {
    fn from(config: &TranscribeConfig) -> Self {
        Self {
            model_path: config.model_path.clone(),
            language: config.language.clone(),
            threads: config.threads,
        }
    }
}

impl WhisperConfig {
    /// Language passed to whisper; `None` enables detection.
    pub fn forced_language(&self) -> Option<&str> {
        if self.language == defaults::AUTO_LANGUAGE {
            None
        } else {
            Some(&self.language)
        }
    }

    /// Model name shown in progress output, taken from the file stem.
    fn model_name(&self) -> String {
        self.model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string()
    }

    fn ensure_model_exists(&self) -> Result<()> {
        if self.model_path.exists() {
            Ok(())
        } else {
            Err(ForgeError::TranscriptionModelNotFound {
                path: self.model_path.to_string_lossy().to_string(),
            })
        }
    }
}

/// Loaded whisper model. The context is not `Sync`, so it sits behind a Mutex.
#[cfg(feature = "whisper")]
pub struct WhisperTranscriber {
    context: Mutex<WhisperContext>,
    language: Option<String>,
    threads: Option<usize>,
    model_name: String,
}

#[cfg(feature = "whisper")]
impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("model_name", &self.model_name)
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

/// Stand-in used when the crate is built without `whisper`.
#[cfg(not(feature = "whisper"))]
#[derive(Debug)]
pub struct WhisperTranscriber {
    model_name: String,
}

#[cfg(feature = "whisper")]
impl WhisperTranscriber {
    /// Load the model file.
    ///
    /// # Errors
    /// `TranscriptionModelNotFound` if the file is missing,
    /// `TranscriptionInferenceFailed` if whisper cannot load it.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        // whisper.cpp logs to stderr unless the hooks are installed
        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });
        config.ensure_model_exists()?;

        let path = config.model_path.to_str().ok_or_else(|| {
            ForgeError::TranscriptionInferenceFailed {
                message: "Invalid UTF-8 in model path".to_string(),
            }
        })?;
        let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| ForgeError::TranscriptionInferenceFailed {
                message: format!("Failed to load Whisper model: {}", e),
            })?;

        Ok(Self {
            context: Mutex::new(context),
            language: config.forced_language().map(str::to_string),
            threads: config.threads,
            model_name: config.model_name(),
        })
    }
}

#[cfg(not(feature = "whisper"))]
impl WhisperTranscriber {
    /// Checks that the model file exists; transcribing always fails.
    pub fn new(config: WhisperConfig) -> Result<Self> {
        config.ensure_model_exists()?;
        Ok(Self {
            model_name: config.model_name(),
        })
    }
}

#[cfg(feature = "whisper")]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &[i16]) -> Result<Vec<String>> {
        let inference_error = |message: String| ForgeError::TranscriptionInferenceFailed { message };
        let samples = crate::audio::wav::to_f32(audio);

        let context = self
            .context
            .lock()
            .map_err(|e| inference_error(format!("Whisper context lock poisoned: {}", e)))?;
        let mut state = context
            .create_state()
            .map_err(|e| inference_error(format!("Failed to create Whisper state: {}", e)))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(self.language.as_deref());
        if let Some(threads) = self.threads {
            params.set_n_threads(threads as i32);
        }
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &samples)
            .map_err(|e| inference_error(format!("Whisper inference failed: {}", e)))?;

        Ok(state.as_iter().map(|segment| segment.to_string()).collect())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(not(feature = "whisper"))]
impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, _audio: &[i16]) -> Result<Vec<String>> {
        Err(ForgeError::TranscriptionInferenceFailed {
            message: "built without the whisper feature; rebuild with --features whisper \
                      (needs cmake)"
                .to_string(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
