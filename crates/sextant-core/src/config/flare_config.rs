use serde::{Deserialize, Serialize};

use super::defaults;

/// Lookahead (FLARE) pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlareConfig {
    /// Per-token probability below which a lookahead sentence is
    /// considered uncertain.
    pub threshold: f64,
    /// Tokens generated per lookahead probe.
    pub lookahead_tokens: usize,
    /// Total generated-token budget for one answer.
    pub generation_budget: usize,
    pub max_rounds: usize,
}

impl Default for FlareConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::DEFAULT_FLARE_THRESHOLD,
            lookahead_tokens: defaults::DEFAULT_LOOKAHEAD_TOKENS,
            generation_budget: defaults::DEFAULT_GENERATION_BUDGET,
            max_rounds: defaults::DEFAULT_FLARE_ROUNDS,
        }
    }
}
