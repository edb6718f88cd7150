//! Dataset synthesis: combine sources, weight the vaccine rules, shuffle, cap.

use crate::dataset::example::TrainingExample;
use crate::error::{ForgeError, Result};
use crate::persona::Persona;
use rand::Rng;
use rand::seq::SliceRandom;

/// Per-source counts of one synthesis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    pub transcript_pairs: usize,
    pub post_pairs: usize,
    pub rule_pairs: usize,
    /// Size before truncation.
    pub total: usize,
    /// Size after truncation.
    pub kept: usize,
}

impl SynthesisReport {
    pub fn truncated(&self) -> bool {
        self.kept < self.total
    }
}

/// Builds the final training set for one persona.
#[derive(Debug, Clone)]
pub struct Synthesizer<'a> {
    persona: &'a Persona,
    max_examples: usize,
}

impl<'a> Synthesizer<'a> {
    pub fn new(persona: &'a Persona, max_examples: usize) -> Self {
        Self {
            persona,
            max_examples,
        }
    }

    /// Pair each post with a uniformly random canned prompt.
    pub fn post_pairs<R: Rng + ?Sized>(
        &self,
        posts: &[String],
        rng: &mut R,
    ) -> Result<Vec<TrainingExample>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }
        let prompts = &self.persona.canned_prompts;
        if prompts.is_empty() {
            return Err(ForgeError::ConfigInvalidValue {
                key: "persona.canned_prompts".to_string(),
                message: "at least one canned prompt is needed to pair posts".to_string(),
            });
        }

        Ok(posts
            .iter()
            .map(|post| {
                let prompt = &prompts[rng.gen_range(0..prompts.len())];
                TrainingExample::new(&self.persona.system_prompt, prompt.clone(), post.clone())
            })
            .collect())
    }

    /// The full rule set repeated `rule_weight` times.
    pub fn rule_pairs(&self) -> Vec<TrainingExample> {
        let mut pairs = Vec::with_capacity(self.persona.rules.len() * self.persona.rule_weight);
        for _ in 0..self.persona.rule_weight {
            for rule in &self.persona.rules {
                pairs.push(TrainingExample::new(
                    &self.persona.system_prompt,
                    rule.question.clone(),
                    rule.answer.clone(),
                ));
            }
        }
        pairs
    }

    /// Concatenate all sources without shuffling or truncating.
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        transcript_pairs: Vec<TrainingExample>,
        posts: &[String],
        rng: &mut R,
    ) -> Result<(Vec<TrainingExample>, SynthesisReport)> {
        let post_pairs = self.post_pairs(posts, rng)?;
        let rule_pairs = self.rule_pairs();

        let report = SynthesisReport {
            transcript_pairs: transcript_pairs.len(),
            post_pairs: post_pairs.len(),
            rule_pairs: rule_pairs.len(),
            total: transcript_pairs.len() + post_pairs.len() + rule_pairs.len(),
            kept: 0,
        };

        let mut dataset = transcript_pairs;
        dataset.extend(post_pairs);
        dataset.extend(rule_pairs);
        Ok((dataset, report))
    }

    /// Shuffle uniformly, then keep the first `max_examples`.
    ///
    /// Shuffling first makes the truncation a uniform random sample.
    pub fn finalize<R: Rng + ?Sized>(
        &self,
        mut dataset: Vec<TrainingExample>,
        rng: &mut R,
    ) -> Vec<TrainingExample> {
        dataset.shuffle(rng);
        dataset.truncate(self.max_examples);
        dataset
    }

    /// Assemble, shuffle and truncate in one go.
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        transcript_pairs: Vec<TrainingExample>,
        posts: &[String],
        rng: &mut R,
    ) -> Result<(Vec<TrainingExample>, SynthesisReport)> {
        let (dataset, mut report) = self.assemble(transcript_pairs, posts, rng)?;
        let dataset = self.finalize(dataset, rng);
        report.kept = dataset.len();
        Ok((dataset, report))
    }
}
