use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// Vocabulary token identifier.
pub type TokenId = u32;

/// Raw result of one generation call for a single prompt.
///
/// `logprobs[i]` is the top-K log-probability view at position `i`, keyed
/// by token id. The view is sparse: a token id absent from a position is a
/// floor probability, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub text: String,
    pub token_ids: Vec<TokenId>,
    pub logprobs: Vec<HashMap<TokenId, f64>>,
    pub cumulative_logprob: f64,
}

impl GenerationOutcome {
    /// Check the position-alignment invariant between emitted tokens and
    /// their log-probability rows. A mismatch is an upstream contract
    /// breach in the generation service and must be surfaced.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.token_ids.len() != self.logprobs.len() {
            return Err(GenerationError::MalformedOutcome {
                token_count: self.token_ids.len(),
                logprob_count: self.logprobs.len(),
            });
        }
        Ok(())
    }
}

/// Options for a generation-service call.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    /// Width of the per-position top-K log-probability view to request.
    /// `None` means the service's default (or no log-probs for `complete`).
    pub logprob_top_k: Option<usize>,
    /// Stop sequences; generation halts before emitting any of these.
    pub stop: Vec<String>,
    /// Cap on newly generated tokens.
    pub max_new_tokens: Option<usize>,
}

impl GenerationOptions {
    pub fn with_logprobs(top_k: usize) -> Self {
        Self {
            logprob_top_k: Some(top_k),
            ..Self::default()
        }
    }
}
