use serde::{Deserialize, Serialize};

use super::defaults;

/// Self-ask dialogue pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfAskConfig {
    pub max_rounds: usize,
    /// Scripted "are follow up questions needed" switch: `true` answers
    /// "No." (single-hop), `false` answers "Yes." (multi-hop).
    pub single_hop: bool,
}

impl Default for SelfAskConfig {
    fn default() -> Self {
        Self {
            max_rounds: defaults::DEFAULT_SELF_ASK_ROUNDS,
            single_hop: true,
        }
    }
}
