use serde::{Deserialize, Serialize};

use super::defaults;
use crate::task::TaskKind;

/// When document retrieval precedes generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetrievalMode {
    /// Probe the model's first-position token distribution per prompt.
    #[serde(rename = "adaptive_retrieval")]
    Adaptive,
    #[serde(rename = "always_retrieve")]
    Always,
    #[serde(rename = "no_retrieval")]
    Never,
}

/// Weights for the composite candidate score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub relevance: f64,
    pub grounding: f64,
    pub utility: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            relevance: defaults::DEFAULT_WEIGHT_RELEVANCE,
            grounding: defaults::DEFAULT_WEIGHT_GROUNDING,
            utility: defaults::DEFAULT_WEIGHT_UTILITY,
        }
    }
}

/// Self-reflective controller configuration: gate mode, tree-search
/// bounds, scoring weights and signal toggles, answer-selection policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfRagConfig {
    pub mode: RetrievalMode,
    /// Gate threshold. `None` falls back to a literal marker check on the
    /// probe text.
    pub threshold: Option<f64>,
    pub max_depth: usize,
    pub beam_width: usize,
    pub weights: ScoreWeights,
    pub use_grounding: bool,
    pub use_utility: bool,
    /// Add the length-normalized sequence prior into the composite score.
    pub use_seqscore: bool,
    /// Drop contradiction-marked segments from assembled answers.
    pub ignore_contradictions: bool,
    pub task: TaskKind,
}

impl Default for SelfRagConfig {
    fn default() -> Self {
        Self {
            mode: RetrievalMode::Adaptive,
            threshold: Some(defaults::DEFAULT_THRESHOLD),
            max_depth: defaults::DEFAULT_MAX_DEPTH,
            beam_width: defaults::DEFAULT_BEAM_WIDTH,
            weights: ScoreWeights::default(),
            use_grounding: true,
            use_utility: true,
            use_seqscore: true,
            ignore_contradictions: true,
            task: TaskKind::default(),
        }
    }
}
