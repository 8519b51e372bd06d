//! Retrieval decision gate: decides per prompt whether document retrieval
//! should precede generation.

use std::collections::HashMap;

use sextant_core::config::defaults::GATE_LOGPROB_TOP_K;
use sextant_core::config::RetrievalMode;
use sextant_core::errors::SextantResult;
use sextant_core::models::{GenerationOptions, TokenId};
use sextant_core::traits::IGenerator;
use tracing::debug;

use super::critic::prob_at;
use super::tokens::{ControlTokenRegistry, RETRIEVAL};

/// Probabilistic gate over the model's first-position token distribution.
/// Callers must tolerate false positives and negatives; the decision is
/// derived from model uncertainty, not a hard rule.
pub struct RetrievalDecisionGate<'a> {
    generator: &'a dyn IGenerator,
    registry: &'a ControlTokenRegistry,
    mode: RetrievalMode,
    threshold: Option<f64>,
}

impl<'a> RetrievalDecisionGate<'a> {
    pub fn new(
        generator: &'a dyn IGenerator,
        registry: &'a ControlTokenRegistry,
        mode: RetrievalMode,
        threshold: Option<f64>,
    ) -> Self {
        Self {
            generator,
            registry,
            mode,
            threshold,
        }
    }

    /// One decision per prompt. `Always` and `Never` answer without a
    /// generation call; `Adaptive` issues one batched probe over all
    /// prompts requesting a vocabulary-wide log-probability view.
    pub fn decide(&self, prompts: &[String]) -> SextantResult<Vec<bool>> {
        let flags = match self.mode {
            RetrievalMode::Always => vec![true; prompts.len()],
            RetrievalMode::Never => vec![false; prompts.len()],
            RetrievalMode::Adaptive => {
                let opts = GenerationOptions::with_logprobs(GATE_LOGPROB_TOP_K);
                let outcomes = self.generator.generate(prompts, &opts)?;
                outcomes
                    .iter()
                    .map(|outcome| match self.threshold {
                        Some(threshold) => {
                            let empty = HashMap::new();
                            let first = outcome.logprobs.first().unwrap_or(&empty);
                            self.ratio(first) > threshold
                        }
                        // No threshold: literal marker check on the probe text.
                        None => outcome.text.contains(RETRIEVAL),
                    })
                    .collect()
            }
        };
        debug!(
            mode = ?self.mode,
            prompts = prompts.len(),
            retrieving = flags.iter().filter(|f| **f).count(),
            "gate decided"
        );
        Ok(flags)
    }

    /// `P(retrieve) / (P(retrieve) + P(skip))` at the first generated
    /// position. Absent ids are floor probability, so an empty view
    /// yields 0.5 rather than an error.
    fn ratio(&self, first_position: &HashMap<TokenId, f64>) -> f64 {
        let p_retrieval = prob_at(first_position, self.registry.retrieval.retrieval);
        let p_no_retrieval = prob_at(first_position, self.registry.retrieval.no_retrieval);
        p_retrieval / (p_retrieval + p_no_retrieval)
    }
}
