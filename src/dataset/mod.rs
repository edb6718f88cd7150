//! Training dataset: example records, cleaning, transcript pairing and synthesis.

pub mod clean;
pub mod example;
pub mod pairing;
pub mod synthesis;

pub use clean::{Blacklist, CleanOutcome, CleanReport, Rejection, clean};
pub use example::{TrainingExample, load_examples, load_posts, save_examples, save_posts};
pub use pairing::{TranscriptPairs, pair_lines, pair_transcripts, qualifying_lines};
pub use synthesis::{SynthesisReport, Synthesizer};
