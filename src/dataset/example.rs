//! Training example record and the flat JSON files it lives in.

use crate::error::{ForgeError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One supervised example: system instruction, prompt and target response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingExample {
    pub instruction: String,
    pub input: String,
    pub output: String,
}

impl TrainingExample {
    pub fn new(
        instruction: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Load a JSON array of training examples.
pub fn load_examples(path: &Path) -> Result<Vec<TrainingExample>> {
    read_json(path)
}

/// Write training examples as a pretty-printed JSON array.
///
/// Non-ASCII text is written as-is, not escaped.
pub fn save_examples(path: &Path, examples: &[TrainingExample]) -> Result<()> {
    write_json(path, examples)
}

/// Load a JSON array of scraped post strings.
pub fn load_posts(path: &Path) -> Result<Vec<String>> {
    read_json(path)
}

pub fn save_posts(path: &Path, posts: &[String]) -> Result<()> {
    write_json(path, posts)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| ForgeError::DatasetParse {
        path: path.display().to_string(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
