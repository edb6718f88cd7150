//! System diagnostics and dependency checking.
//!
//! Verifies that the external tools each pipeline stage shells out to are
//! installed, and reports which optional features this binary was built with.

use crate::config::Config;
use crate::defaults;
use std::path::Path;
use std::process::Command;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working
    Ok,
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues
    Warning(String),
}

/// Check if a command exists by running it with a version flag.
fn check_command_with(command: &str, version_flag: &str) -> CheckResult {
    match Command::new(command).arg(version_flag).output() {
        Ok(output) if output.status.success() => CheckResult::Ok,
        Ok(_) => CheckResult::Warning(format!(
            "'{}' found but {} failed",
            command, version_flag
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error checking '{}': {}", command, e)),
    }
}

/// Check if a command exists and is executable.
fn check_command(command: &str) -> CheckResult {
    check_command_with(command, "--version")
}

/// Check that a model file is present.
fn check_model_file(path: &Path) -> CheckResult {
    if !path.exists() {
        CheckResult::NotFound
    } else if path.is_dir() {
        CheckResult::Warning(format!("{} is a directory", path.display()))
    } else {
        CheckResult::Ok
    }
}

fn print_result(label: &str, result: CheckResult, install_hint: &[&str]) -> bool {
    print!("{}: ", label);
    match result {
        CheckResult::Ok => {
            println!("✓ OK");
            true
        }
        CheckResult::NotFound => {
            println!("✗ NOT FOUND");
            for line in install_hint {
                println!("  {}", line);
            }
            false
        }
        CheckResult::Warning(msg) => {
            println!("⚠ WARNING: {}", msg);
            false
        }
    }
}

/// Run all dependency checks and print results.
pub fn check_dependencies(config: &Config) {
    println!("persona-forge {}", crate::version_string());
    println!("Checking pipeline dependencies...\n");

    let downloader_ok = print_result(
        &format!("{} (audio download)", config.transcribe.downloader),
        check_command(&config.transcribe.downloader),
        &["Install: pipx install yt-dlp  (or your package manager)"],
    );
    let ffmpeg_ok = print_result(
        "ffmpeg (audio extraction)",
        check_command_with("ffmpeg", "-version"),
        &[
            "Install: sudo apt install ffmpeg  (Debian/Ubuntu)",
            "         sudo pacman -S ffmpeg    (Arch)",
        ],
    );
    let trainer_ok = print_result(
        &format!("{} (trainer)", config.train.trainer_command),
        check_command(&config.train.trainer_command),
        &["Set [train] trainer_command or PERSONA_FORGE_TRAINER"],
    );
    let inference_ok = print_result(
        &format!("{} (inference)", config.eval.inference_command),
        check_command(&config.eval.inference_command),
        &["Set [eval] inference_command or PERSONA_FORGE_INFERENCE"],
    );

    println!();
    println!("Speech recognition:");
    if cfg!(feature = "whisper") {
        println!("  whisper: ✓ compiled in ({})", defaults::gpu_backend());
    } else {
        println!("  whisper: - not compiled (rebuild with --features whisper)");
    }
    let model_ok = print_result(
        &format!("  model {}", config.transcribe.model_path.display()),
        check_model_file(&config.transcribe.model_path),
        &["Download a ggml model from https://huggingface.co/ggerganov/whisper.cpp"],
    );

    println!();
    println!("Harvesting:");
    if cfg!(feature = "browser") {
        println!("  browser: ✓ compiled in (needs Chrome or Chromium on PATH)");
    } else {
        println!("  browser: - not compiled (rebuild with --features browser)");
    }

    println!();
    if downloader_ok && ffmpeg_ok && model_ok && cfg!(feature = "whisper") {
        println!("✓ Ready to transcribe.");
    } else {
        println!("⚠ transcribe will not work until the items above are fixed.");
    }
    if trainer_ok && inference_ok {
        println!("✓ Ready to train and evaluate.");
    }
}
