#![cfg(feature = "whisper")]

use persona_forge::defaults;
use persona_forge::stt::{Transcriber, WhisperConfig, WhisperTranscriber};
use std::path::PathBuf;

fn find_model() -> Option<PathBuf> {
    let path = std::env::var_os("PERSONA_FORGE_WHISPER_MODEL")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(defaults::WHISPER_MODEL));
    if path.exists() {
        Some(path)
    } else {
        eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
        eprintln!("║  NO WHISPER MODEL FOUND: SKIPPING BACKEND TESTS             ║");
        eprintln!("║                                                              ║");
        eprintln!("║  Point PERSONA_FORGE_WHISPER_MODEL at a ggml model file      ║");
        eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
        None
    }
}

#[test]
fn test_missing_model_is_reported() {
    let config = WhisperConfig {
        model_path: PathBuf::from("/nonexistent/ggml-missing.bin"),
        ..WhisperConfig::default()
    };
    assert!(WhisperTranscriber::new(config).is_err());
}

#[test]
fn test_silence_yields_no_meaningful_segments() {
    let Some(model_path) = find_model() else {
        return;
    };

    let transcriber = match WhisperTranscriber::new(WhisperConfig {
        model_path,
        language: "ja".to_string(),
        threads: Some(4),
    }) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to create transcriber: {e}, skipping");
            return;
        }
    };

    eprintln!(
        "Backend: {}, Model: {}",
        defaults::gpu_backend(),
        transcriber.model_name()
    );

    let silence = vec![0i16; defaults::SAMPLE_RATE as usize * 2];
    let segments = transcriber
        .transcribe(&silence)
        .expect("transcription of silence failed");
    let text: String = segments.concat();
    assert!(
        text.trim().chars().count() < 20,
        "Expected little or no text from silence, got: {}",
        text
    );
}
