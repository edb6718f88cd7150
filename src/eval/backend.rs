use crate::config::EvalConfig;
use crate::error::{ForgeError, Result};
use crate::exec::CommandExecutor;
use std::path::PathBuf;

/// Sampling parameters passed to the inference backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_new_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from(&EvalConfig::default())
    }
}

impl From<&EvalConfig> for GenerationParams {
    fn from(config: &EvalConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            repetition_penalty: config.repetition_penalty,
        }
    }
}

/// Trait for text generation against a base model plus adapter.
///
/// This trait allows swapping implementations (external process vs mock).
pub trait InferenceBackend: Send + Sync {
    /// Generate the assistant reply for a fully rendered prompt.
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    fn name(&self) -> &str;
}

/// Inference through an external command.
///
/// The command receives the rendered prompt on stdin and the adapter path and
/// sampling parameters as flags; its trimmed stdout is the reply.
pub struct CommandBackend<E: CommandExecutor> {
    executor: E,
    command: String,
    base_args: Vec<String>,
    adapter_dir: PathBuf,
}

impl<E: CommandExecutor> CommandBackend<E> {
    pub fn new(executor: E, command: &str, base_args: Vec<String>, adapter_dir: PathBuf) -> Self {
        Self {
            executor,
            command: command.to_string(),
            base_args,
            adapter_dir,
        }
    }

    fn args(&self, params: &GenerationParams) -> Vec<String> {
        let mut args = self.base_args.clone();
        args.extend([
            "--adapter".to_string(),
            self.adapter_dir.display().to_string(),
            "--max-new-tokens".to_string(),
            params.max_new_tokens.to_string(),
            "--temperature".to_string(),
            params.temperature.to_string(),
            "--top-p".to_string(),
            params.top_p.to_string(),
            "--repetition-penalty".to_string(),
            params.repetition_penalty.to_string(),
        ]);
        args
    }
}

impl<E: CommandExecutor> InferenceBackend for CommandBackend<E> {
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let args = self.args(params);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .executor
            .execute_with_input(&self.command, &arg_refs, prompt)
            .map_err(|e| ForgeError::Inference {
                message: e.to_string(),
            })?;
        Ok(output.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.command
    }
}

/// Mock backend for testing
#[derive(Debug, Clone)]
pub struct MockInferenceBackend {
    response: String,
    echo: bool,
    fail_after: Option<usize>,
    calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl MockInferenceBackend {
    pub fn new() -> Self {
        Self {
            response: "mock reply".to_string(),
            echo: false,
            fail_after: None,
            calls: Default::default(),
        }
    }

    /// Always reply with `response`.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Reply with the prompt itself.
    pub fn echoing(mut self) -> Self {
        self.echo = true;
        self
    }

    /// Fail every call after the first `n` successful ones.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for MockInferenceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceBackend for MockInferenceBackend {
    fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
        let previous = self
            .calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_after.is_some_and(|n| previous >= n) {
            return Err(ForgeError::Inference {
                message: "mock inference failure".to_string(),
            });
        }
        if self.echo {
            Ok(prompt.to_string())
        } else {
            Ok(self.response.clone())
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
