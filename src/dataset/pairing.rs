//! Transcript pairing: adjacent transcript lines become (input, output) turns.

use crate::dataset::example::TrainingExample;
use crate::error::{ForgeError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Trimmed lines longer than `min_chars` characters, in file order.
pub fn qualifying_lines(text: &str, min_chars: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > min_chars)
        .map(str::to_string)
        .collect()
}

/// Sliding window of size 2 over `lines`.
///
/// N lines yield N-1 examples; line i is the input and line i+1 the output.
pub fn pair_lines(lines: &[String], instruction: &str) -> Vec<TrainingExample> {
    lines
        .windows(2)
        .map(|pair| TrainingExample::new(instruction, pair[0].clone(), pair[1].clone()))
        .collect()
}

/// Examples produced from a transcript directory.
#[derive(Debug, Default)]
pub struct TranscriptPairs {
    pub examples: Vec<TrainingExample>,
    /// Transcript files read successfully.
    pub files_read: usize,
    /// Files that could not be read, with the error.
    pub skipped: Vec<(PathBuf, ForgeError)>,
}

/// List `*.txt` files in `dir`, sorted by path.
pub fn transcript_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pair every transcript file in `dir` independently.
///
/// A file that fails to read (missing permissions, invalid UTF-8) is recorded
/// in `skipped` and the rest are still processed. Lines never pair across
/// files.
pub fn pair_transcripts(
    dir: &Path,
    instruction: &str,
    min_chars: usize,
) -> Result<TranscriptPairs> {
    let mut result = TranscriptPairs::default();

    for path in transcript_files(dir)? {
        match fs::read_to_string(&path) {
            Ok(text) => {
                let lines = qualifying_lines(&text, min_chars);
                result.examples.extend(pair_lines(&lines, instruction));
                result.files_read += 1;
            }
            Err(e) => result.skipped.push((path, e.into())),
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pairs_adjacent_lines() {
        let pairs = pair_lines(&lines(&["a", "b", "c", "d"]), "sys");
        let as_tuples: Vec<(&str, &str)> = pairs
            .iter()
            .map(|e| (e.input.as_str(), e.output.as_str()))
            .collect();
        assert_eq!(as_tuples, vec![("a", "b"), ("b", "c"), ("c", "d")]);
        assert!(pairs.iter().all(|e| e.instruction == "sys"));
    }

    #[test]
    fn n_lines_yield_n_minus_one_pairs() {
        for n in 0usize..8 {
            let input: Vec<String> = (0..n).map(|i| format!("line {}", i)).collect();
            let pairs = pair_lines(&input, "sys");
            assert_eq!(pairs.len(), n.saturating_sub(1));
            for (i, pair) in pairs.iter().enumerate() {
                assert_eq!(pair.input, input[i]);
                assert_eq!(pair.output, input[i + 1]);
            }
        }
    }

    #[test]
    fn qualifying_lines_trims_and_drops_short_lines() {
        let text = "  こんにちは皆さん  \nうん\n\n今日はゲームするよ\r\nhey";
        assert_eq!(
            qualifying_lines(text, 4),
            lines(&["こんにちは皆さん", "今日はゲームするよ"])
        );
    }

    #[test]
    fn qualifying_lines_threshold_is_exclusive() {
        assert_eq!(qualifying_lines("abcd\nabcde", 4), lines(&["abcde"]));
    }

    #[test]
    fn pair_transcripts_never_crosses_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "first line one\nfirst line two\n").unwrap();
        fs::write(dir.path().join("b.txt"), "second line one\nsecond line two\n").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored line one\nignored line two\n").unwrap();

        let result = pair_transcripts(dir.path(), "sys", 4).unwrap();

        assert_eq!(result.files_read, 2);
        assert_eq!(result.examples.len(), 2);
        assert_eq!(result.examples[0].input, "first line one");
        assert_eq!(result.examples[0].output, "first line two");
        assert_eq!(result.examples[1].input, "second line one");
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn pair_transcripts_skips_unreadable_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.txt"), [0xff, 0xfe, 0x00, 0x41]).unwrap();
        fs::write(dir.path().join("good.txt"), "line number one\nline number two\n").unwrap();

        let result = pair_transcripts(dir.path(), "sys", 4).unwrap();

        assert_eq!(result.files_read, 1);
        assert_eq!(result.examples.len(), 1);
        assert_eq!(result.skipped.len(), 1);
        assert!(result.skipped[0].0.ends_with("bad.txt"));
    }

    #[test]
    fn transcript_files_are_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["c.txt", "a.txt", "b.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let names: Vec<String> = transcript_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }
}
