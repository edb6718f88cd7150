//! Keyword-blacklist cleaning filter.
//!
//! An example is dropped when its output contains any blacklisted substring
//! or is shorter than the minimum response length. Only the output field is
//! inspected; instruction and input are never checked.

use crate::dataset::example::TrainingExample;
use crate::defaults;

/// Why an example was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Output contains this blacklisted keyword.
    Keyword(String),
    /// Output has only this many characters.
    TooShort(usize),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword(keyword) => write!(f, "contains \"{}\"", keyword),
            Self::TooShort(chars) => write!(f, "too short ({} chars)", chars),
        }
    }
}

/// Static substring blacklist plus a minimum output length.
#[derive(Debug, Clone)]
pub struct Blacklist {
    keywords: Vec<String>,
    min_response_chars: usize,
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::new(
            defaults::BLACKLIST.iter().map(|k| k.to_string()).collect(),
            defaults::MIN_RESPONSE_CHARS,
        )
    }
}

impl Blacklist {
    pub fn new(keywords: Vec<String>, min_response_chars: usize) -> Self {
        // An empty keyword would match every output.
        let keywords = keywords.into_iter().filter(|k| !k.is_empty()).collect();
        Self {
            keywords,
            min_response_chars,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Check a response; `None` means it is kept.
    ///
    /// Keywords are checked first, so a short output that also contains a
    /// keyword is reported as a keyword hit.
    pub fn check(&self, output: &str) -> Option<Rejection> {
        if let Some(keyword) = self.keywords.iter().find(|k| output.contains(k.as_str())) {
            return Some(Rejection::Keyword(keyword.clone()));
        }
        let chars = output.chars().count();
        if chars < self.min_response_chars {
            return Some(Rejection::TooShort(chars));
        }
        None
    }
}

/// Counts reported after a cleaning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanReport {
    pub original: usize,
    pub kept: usize,
    pub removed: usize,
}

/// Result of a cleaning pass.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    /// Surviving examples, in their original order.
    pub kept: Vec<TrainingExample>,
    /// Removed examples with the reason for each.
    pub removed: Vec<(TrainingExample, Rejection)>,
}

impl CleanOutcome {
    pub fn report(&self) -> CleanReport {
        CleanReport {
            original: self.kept.len() + self.removed.len(),
            kept: self.kept.len(),
            removed: self.removed.len(),
        }
    }
}

/// Split examples into kept and removed according to the blacklist.
pub fn clean(examples: Vec<TrainingExample>, blacklist: &Blacklist) -> CleanOutcome {
    let mut kept = Vec::with_capacity(examples.len());
    let mut removed = Vec::new();

    for example in examples {
        match blacklist.check(&example.output) {
            Some(reason) => removed.push((example, reason)),
            None => kept.push(example),
        }
    }

    CleanOutcome { kept, removed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(output: &str) -> TrainingExample {
        TrainingExample::new("sys", "q", output)
    }

    #[test]
    fn keeps_clean_outputs() {
        let blacklist = Blacklist::default();
        assert_eq!(blacklist.check("今日は眠いからもう寝る"), None);
    }

    #[test]
    fn rejects_currency_symbol() {
        let blacklist = Blacklist::default();
        assert_eq!(
            blacklist.check("500¥ありがとう"),
            Some(Rejection::Keyword("¥".to_string()))
        );
    }

    #[test]
    fn rejects_short_output_by_characters() {
        let blacklist = Blacklist::default();
        // One character but three UTF-8 bytes
        assert_eq!(blacklist.check("ん"), Some(Rejection::TooShort(1)));
        assert_eq!(blacklist.check(""), Some(Rejection::TooShort(0)));
        assert_eq!(blacklist.check("はい"), None);
    }

    #[test]
    fn keyword_takes_precedence_over_length() {
        let blacklist = Blacklist::new(vec!["x".to_string()], 5);
        assert_eq!(
            blacklist.check("x"),
            Some(Rejection::Keyword("x".to_string()))
        );
    }

    #[test]
    fn input_field_is_not_inspected() {
        let blacklist = Blacklist::default();
        let outcome = clean(
            vec![TrainingExample::new("sys", "スパチャ読み", "普通の返事だよ")],
            &blacklist,
        );
        assert_eq!(outcome.kept.len(), 1);
    }

    #[test]
    fn empty_keywords_are_ignored() {
        let blacklist = Blacklist::new(vec![String::new(), "bad".to_string()], 2);
        assert_eq!(blacklist.keywords(), &["bad".to_string()]);
        assert_eq!(blacklist.check("fine output"), None);
    }

    #[test]
    fn clean_reports_counts_and_preserves_order() {
        let blacklist = Blacklist::default();
        let outcome = clean(
            vec![
                example("first ok"),
                example("スーパーチャットありがとう"),
                example("!"),
                example("second ok"),
                example("概要欄見てね"),
            ],
            &blacklist,
        );

        assert_eq!(
            outcome.report(),
            CleanReport {
                original: 5,
                kept: 2,
                removed: 3
            }
        );
        let outputs: Vec<&str> = outcome.kept.iter().map(|e| e.output.as_str()).collect();
        assert_eq!(outputs, vec!["first ok", "second ok"]);
    }

    #[test]
    fn no_survivor_contains_blacklisted_keyword() {
        let blacklist = Blacklist::default();
        let mut examples = Vec::new();
        for keyword in defaults::BLACKLIST {
            examples.push(example(&format!("prefix {} suffix", keyword)));
            examples.push(example(keyword));
        }
        examples.push(example("ok"));
        examples.push(example("a"));

        let outcome = clean(examples, &blacklist);

        for kept in &outcome.kept {
            assert!(kept.output.chars().count() >= 2);
            for keyword in defaults::BLACKLIST {
                assert!(!kept.output.contains(keyword));
            }
        }
        assert_eq!(outcome.kept.len(), 1);
    }

    #[test]
    fn rejection_display() {
        assert_eq!(
            Rejection::Keyword("配信".to_string()).to_string(),
            "contains \"配信\""
        );
        assert_eq!(Rejection::TooShort(1).to_string(), "too short (1 chars)");
    }
}
