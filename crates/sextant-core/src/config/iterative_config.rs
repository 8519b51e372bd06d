use serde::{Deserialize, Serialize};

use super::defaults;

/// Fixed-round iterative pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IterativeConfig {
    pub rounds: usize,
}

impl Default for IterativeConfig {
    fn default() -> Self {
        Self {
            rounds: defaults::DEFAULT_ITERATIVE_ROUNDS,
        }
    }
}
