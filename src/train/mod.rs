//! Training preparation and hand-off to the external trainer.
//!
//! The examples are rendered into ChatML text, written as JSONL next to a
//! `plan.json` describing the run, and the configured trainer command is
//! started with the plan path as its last argument.

pub mod plan;

pub use plan::{LoraParams, TrainingPlan, steps_per_epoch};

use crate::chat;
use crate::config::TrainConfig;
use crate::dataset::TrainingExample;
use crate::error::Result;
use crate::exec::CommandExecutor;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const TRAIN_TEXT_FILE: &str = "train_text.jsonl";
pub const PLAN_FILE: &str = "plan.json";

#[derive(Serialize)]
struct TextRecord<'a> {
    text: &'a str,
}

/// Write one `{"text": ...}` line per example. Returns the number of lines.
pub fn write_training_text(examples: &[TrainingExample], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    for example in examples {
        let text = chat::render_example(example);
        serde_json::to_writer(&mut writer, &TextRecord { text: &text })?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(examples.len())
}

/// Files produced by [`prepare`].
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub plan: TrainingPlan,
    pub plan_path: PathBuf,
    pub text_path: PathBuf,
}

/// Render the training text and plan into `work_dir`.
pub fn prepare(
    examples: &[TrainingExample],
    config: &TrainConfig,
    work_dir: &Path,
    adapter_dir: &Path,
) -> Result<PreparedRun> {
    fs::create_dir_all(work_dir)?;
    let text_path = work_dir.join(TRAIN_TEXT_FILE);
    let count = write_training_text(examples, &text_path)?;

    let plan = TrainingPlan::new(config, text_path.clone(), adapter_dir.to_path_buf(), count);
    let plan_path = work_dir.join(PLAN_FILE);
    fs::write(&plan_path, serde_json::to_string_pretty(&plan)?)?;

    Ok(PreparedRun {
        plan,
        plan_path,
        text_path,
    })
}

/// Run the trainer attached to the terminal. A non-zero exit is an error.
pub fn launch(executor: &dyn CommandExecutor, config: &TrainConfig, plan_path: &Path) -> Result<()> {
    let plan_arg = plan_path.display().to_string();
    let mut args: Vec<&str> = config.trainer_args.iter().map(String::as_str).collect();
    args.push(&plan_arg);
    executor.run_attached(&config.trainer_command, &args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForgeError;
    use crate::exec::MockCommandExecutor;
    use tempfile::TempDir;

    fn examples() -> Vec<TrainingExample> {
        vec![
            TrainingExample::new("sys", "早安", "ん... おはよ"),
            TrainingExample::new("sys", "line \"quoted\"", "next\nline"),
        ]
    }

    #[test]
    fn training_text_is_one_json_record_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/train.jsonl");

        let count = write_training_text(&examples(), &path).unwrap();

        assert_eq!(count, 2);
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let record: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(
            record["text"],
            chat::render_example(&examples()[1]).as_str()
        );
    }

    #[test]
    fn prepare_writes_plan_and_text() {
        let dir = TempDir::new().unwrap();
        let adapters = dir.path().join("adapters");

        let run = prepare(&examples(), &TrainConfig::default(), dir.path(), &adapters).unwrap();

        assert!(run.text_path.exists());
        assert_eq!(run.plan.num_examples, 2);
        assert_eq!(run.plan.steps_per_epoch, 0);
        let saved: TrainingPlan =
            serde_json::from_str(&fs::read_to_string(&run.plan_path).unwrap()).unwrap();
        assert_eq!(saved, run.plan);
        assert_eq!(saved.output_dir, adapters);
    }

    #[test]
    fn launch_appends_plan_path_to_trainer_args() {
        let executor = MockCommandExecutor::new();
        let config = TrainConfig {
            trainer_command: "python".to_string(),
            trainer_args: vec!["train.py".to_string()],
            ..TrainConfig::default()
        };

        launch(&executor, &config, Path::new("outputs/plan.json")).unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command, "python");
        assert_eq!(calls[0].args, vec!["train.py", "outputs/plan.json"]);
    }

    #[test]
    fn trainer_failure_propagates() {
        let executor = MockCommandExecutor::new().failing_on("persona-trainer");
        let result = launch(&executor, &TrainConfig::default(), Path::new("plan.json"));
        assert!(matches!(result, Err(ForgeError::ToolFailed { .. })));
    }
}
