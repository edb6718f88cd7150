//! Scripted evaluation run and its plain-text report.

use super::backend::{GenerationParams, InferenceBackend};
use super::questions::strip_language_tag;
use crate::chat;
use crate::error::Result;

/// One answered question. `question` keeps its language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalEntry {
    pub question: String,
    pub answer: String,
}

impl EvalEntry {
    fn render(&self) -> String {
        format!("Q: {}\nA: {}\n", self.question, self.answer)
    }
}

/// Render entries as `Q: ...\nA: ...\n` blocks separated by blank lines.
pub fn render_report(entries: &[EvalEntry]) -> String {
    entries
        .iter()
        .map(EvalEntry::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs the question battery against an inference backend.
pub struct Evaluator<'a> {
    backend: &'a dyn InferenceBackend,
    system_prompt: &'a str,
    params: GenerationParams,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        backend: &'a dyn InferenceBackend,
        system_prompt: &'a str,
        params: GenerationParams,
    ) -> Self {
        Self {
            backend,
            system_prompt,
            params,
        }
    }

    /// Ask one question. The language tag is stripped from the prompt only.
    pub fn ask(&self, question: &str) -> Result<EvalEntry> {
        let prompt = chat::render_prompt(self.system_prompt, strip_language_tag(question));
        let answer = self.backend.generate(&prompt, &self.params)?;
        Ok(EvalEntry {
            question: question.to_string(),
            answer,
        })
    }

    /// Ask every question in order, calling `on_entry` after each answer.
    ///
    /// The first backend error aborts the run.
    pub fn run<F>(&self, questions: &[String], mut on_entry: F) -> Result<Vec<EvalEntry>>
    where
        F: FnMut(usize, &EvalEntry),
    {
        let mut entries = Vec::with_capacity(questions.len());
        for (index, question) in questions.iter().enumerate() {
            let entry = self.ask(question)?;
            on_entry(index, &entry);
            entries.push(entry);
        }
        Ok(entries)
    }
}
