use serde::{Deserialize, Serialize};

/// Per-candidate quality signals and their weighted combination.
///
/// `relevance` and `grounding` are normalized probability ratios in
/// [0, 1]; `utility` is a weighted expectation in [-1, 1]; `final_score`
/// is the configured combination and is not bounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub relevance: f64,
    pub grounding: f64,
    pub utility: f64,
    /// Length-normalized sequence prior, `exp(cum_logprob / len)`.
    pub sequence: f64,
    pub final_score: f64,
}
