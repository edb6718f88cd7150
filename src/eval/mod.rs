//! Multilingual evaluation of a trained adapter.

pub mod backend;
pub mod questions;
pub mod report;

pub use backend::{CommandBackend, GenerationParams, InferenceBackend, MockInferenceBackend};
pub use questions::{default_questions, strip_language_tag};
pub use report::{EvalEntry, Evaluator, render_report};
