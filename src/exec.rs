//! External program execution with a mockable seam.
//!
//! Audio download, training and inference all shell out to external tools.
//! The `CommandExecutor` trait keeps those stages testable without the tools.

use crate::error::{ForgeError, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync so a single executor can be shared by stages.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments, returning stdout on success.
    fn execute(&self, command: &str, args: &[&str]) -> Result<String>;

    /// Execute a command, writing `input` to its stdin, returning stdout.
    fn execute_with_input(&self, command: &str, args: &[&str], input: &str) -> Result<String>;

    /// Execute a command with its output attached to the terminal.
    ///
    /// Used for long-running tools (the trainer) whose progress the user
    /// should see live. Defaults to `execute` and discards stdout.
    fn run_attached(&self, command: &str, args: &[&str]) -> Result<()> {
        self.execute(command, args).map(|_| ())
    }
}

/// Implement CommandExecutor for references so one executor can back
/// several stages.
impl<T: CommandExecutor + ?Sized> CommandExecutor for &T {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        (**self).execute(command, args)
    }

    fn execute_with_input(&self, command: &str, args: &[&str], input: &str) -> Result<String> {
        (**self).execute_with_input(command, args, input)
    }

    fn run_attached(&self, command: &str, args: &[&str]) -> Result<()> {
        (**self).run_attached(command, args)
    }
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor;

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

fn spawn_error(command: &str, e: std::io::Error) -> ForgeError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ForgeError::ToolNotFound {
            tool: command.to_string(),
        }
    } else {
        ForgeError::ToolFailed {
            tool: command.to_string(),
            message: format!("failed to start: {}", e),
        }
    }
}

fn check_output(command: &str, output: std::process::Output) -> Result<String> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ForgeError::ToolFailed {
            tool: command.to_string(),
            message: format!("exited with {}: {}", output.status, stderr.trim()),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        let output = Command::new(command)
            .args(args)
            .output()
            .map_err(|e| spawn_error(command, e))?;
        check_output(command, output)
    }

    fn execute_with_input(&self, command: &str, args: &[&str], input: &str) -> Result<String> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(command, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes())?;
            // stdin is dropped here so the child sees EOF
        }

        let output = child.wait_with_output()?;
        check_output(command, output)
    }

    fn run_attached(&self, command: &str, args: &[&str]) -> Result<()> {
        let status = Command::new(command)
            .args(args)
            .status()
            .map_err(|e| spawn_error(command, e))?;
        if !status.success() {
            return Err(ForgeError::ToolFailed {
                tool: command.to_string(),
                message: format!("exited with {}", status),
            });
        }
        Ok(())
    }
}

/// One recorded invocation of a `MockCommandExecutor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub command: String,
    pub args: Vec<String>,
    pub input: Option<String>,
}

/// Mock executor for tests: records calls and returns a fixed response.
#[derive(Debug, Default)]
pub struct MockCommandExecutor {
    response: String,
    fail_on: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return this stdout for every successful call.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Fail every call whose argument list contains `needle`, or whose
    /// command equals it.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, command: &str, args: &[&str], input: Option<&str>) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                command: command.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                input: input.map(str::to_string),
            });
        }

        if let Some(needle) = &self.fail_on
            && (command == needle || args.iter().any(|a| a.contains(needle.as_str())))
        {
            return Err(ForgeError::ToolFailed {
                tool: command.to_string(),
                message: "mock failure".to_string(),
            });
        }
        Ok(self.response.clone())
    }
}

impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> Result<String> {
        self.record(command, args, None)
    }

    fn execute_with_input(&self, command: &str, args: &[&str], input: &str) -> Result<String> {
        self.record(command, args, Some(input))
    }
}
