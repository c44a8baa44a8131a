//! # Spectrum Matching
//!
//! Similarity scoring of a measured spectrum against stored captures and
//! reference emission lines. Both sides are divided by their own peak before
//! scoring, so an identical pair scores 1 (100 %) with every method. Scores
//! are not bounded: poor matches under the squared methods go negative.
//!
//! Scoring runs on a background task owned by [`MatchEngine`]. Submitting a
//! new request cancels and joins the previous one, so at most one task is
//! ever active and stale results are never reported after a newer run
//! started.

mod engine;
mod error;
mod method;


pub use engine::{MatchEngine, MatchOutcome, MatchRequest, MatchTarget};
pub use error::MatchError;
pub use method::{score, score_percent, MatchMethod};
