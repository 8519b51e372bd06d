pub mod defaults;
pub mod flare_config;
pub mod iterative_config;
pub mod selfask_config;
pub mod selfrag_config;

pub use flare_config::FlareConfig;
pub use iterative_config::IterativeConfig;
pub use selfask_config::SelfAskConfig;
pub use selfrag_config::{RetrievalMode, ScoreWeights, SelfRagConfig};

use serde::{Deserialize, Serialize};

use crate::errors::{SextantError, SextantResult};

/// Umbrella configuration for the whole workspace. Every section has full
/// defaults; a TOML file only needs to name what it overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SextantConfig {
    pub selfrag: SelfRagConfig,
    pub flare: FlareConfig,
    pub iterative: IterativeConfig,
    pub selfask: SelfAskConfig,
}

impl SextantConfig {
    pub fn from_toml_str(toml_str: &str) -> SextantResult<Self> {
        toml::from_str(toml_str).map_err(|e| SextantError::InvalidConfig {
            reason: e.to_string(),
        })
    }
}
