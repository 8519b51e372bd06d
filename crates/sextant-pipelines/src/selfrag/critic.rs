//! Candidate scorer: converts a raw generation outcome and its per-token
//! log-probabilities into a composite quality score, and remaps mid-answer
//! retrieval markers for the long-form search.

use std::collections::HashMap;

use sextant_core::config::defaults::LOGPROB_FLOOR;
use sextant_core::config::ScoreWeights;
use sextant_core::errors::SextantResult;
use sextant_core::models::{GenerationOutcome, ScoreBreakdown, TokenId};
use tracing::trace;

use super::tokens::{ControlTokenRegistry, NO_RETRIEVAL, RETRIEVAL};

/// Utility-level weights for `[Utility:1]` .. `[Utility:5]`.
const UTILITY_WEIGHTS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];

/// Probability of `id` at one sparse top-K position. Absent ids take the
/// floor log-probability, never an error.
pub(crate) fn prob_at(row: &HashMap<TokenId, f64>, id: TokenId) -> f64 {
    row.get(&id).copied().unwrap_or(LOGPROB_FLOOR).exp()
}

/// Pure scoring function over one outcome plus the registry and weights.
pub struct CandidateScorer<'a> {
    registry: &'a ControlTokenRegistry,
    weights: ScoreWeights,
    use_seqscore: bool,
    /// Threshold for mid-answer retrieval-marker remapping. `None` skips
    /// remapping entirely.
    threshold: Option<f64>,
}

impl<'a> CandidateScorer<'a> {
    pub fn new(
        registry: &'a ControlTokenRegistry,
        weights: ScoreWeights,
        use_seqscore: bool,
        threshold: Option<f64>,
    ) -> Self {
        Self {
            registry,
            weights,
            use_seqscore,
            threshold,
        }
    }

    /// Score one candidate continuation.
    ///
    /// Relevance reads position 0; grounding reads the FIRST position
    /// emitting a grounding token; utility reads the LAST position
    /// emitting a utility token. The first/last asymmetry is observed
    /// reference behavior and is preserved deliberately.
    pub fn score(&self, outcome: &GenerationOutcome) -> SextantResult<ScoreBreakdown> {
        outcome.validate()?;

        let sequence = (outcome.cumulative_logprob / outcome.token_ids.len().max(1) as f64).exp();

        let empty = HashMap::new();
        let first_position = outcome.logprobs.first().unwrap_or(&empty);
        let p_relevant = prob_at(first_position, self.registry.relevance.relevant);
        let p_irrelevant = prob_at(first_position, self.registry.relevance.irrelevant);
        let relevance = p_relevant / (p_relevant + p_irrelevant);

        let grounding = self.grounding_score(outcome);
        let utility = self.utility_score(outcome);

        let weighted = self.weights.relevance * relevance
            + self.weights.grounding * grounding
            + self.weights.utility * utility;
        let final_score = if self.use_seqscore {
            sequence + weighted
        } else {
            weighted
        };

        trace!(relevance, grounding, utility, sequence, final_score, "scored candidate");

        Ok(ScoreBreakdown {
            relevance,
            grounding,
            utility,
            sequence,
            final_score,
        })
    }

    /// `P(fully) + 0.5 * P(partially)`, normalized over the three
    /// grounding tokens at the first position that emitted one. No
    /// grounding token in the sequence scores 0.
    fn grounding_score(&self, outcome: &GenerationOutcome) -> f64 {
        let Some(tokens) = self.registry.grounding.tokens() else {
            return 0.0;
        };
        let Some(position) = outcome
            .token_ids
            .iter()
            .position(|id| tokens.contains(*id))
        else {
            return 0.0;
        };
        let row = &outcome.logprobs[position];
        let p_fully = prob_at(row, tokens.fully);
        let p_partially = prob_at(row, tokens.partially);
        let p_no_support = prob_at(row, tokens.no_support);
        let sum = p_fully + p_partially + p_no_support;
        p_fully / sum + 0.5 * (p_partially / sum)
    }

    /// Expected utility over the five normalized level probabilities at
    /// the LAST position that emitted a utility token.
    fn utility_score(&self, outcome: &GenerationOutcome) -> f64 {
        let Some(tokens) = self.registry.utility.tokens() else {
            return 0.0;
        };
        let Some(position) = outcome
            .token_ids
            .iter()
            .rposition(|id| tokens.contains(*id))
        else {
            return 0.0;
        };
        let row = &outcome.logprobs[position];
        let probs: Vec<f64> = tokens.levels.iter().map(|id| prob_at(row, *id)).collect();
        let sum: f64 = probs.iter().sum();
        probs
            .iter()
            .zip(UTILITY_WEIGHTS)
            .map(|(p, w)| w * (p / sum))
            .sum()
    }

    /// Re-examine every `[No Retrieval]` marker in the text: when
    /// `(P(retrieve) + P(continue)) / (P(retrieve) + P(skip))` at that
    /// token's position exceeds the threshold, rewrite the marker to
    /// `[Retrieval]`, forcing another retrieval round at the next depth.
    /// Long-form only; without a threshold the text passes through.
    pub fn remap_retrieval_markers(&self, outcome: &GenerationOutcome) -> String {
        let Some(threshold) = self.threshold else {
            return outcome.text.clone();
        };
        if !outcome.text.contains(NO_RETRIEVAL) {
            return outcome.text.clone();
        }

        let ids = &self.registry.retrieval;
        let marker_positions: Vec<usize> = outcome
            .token_ids
            .iter()
            .enumerate()
            .filter(|(_, id)| **id == ids.no_retrieval)
            .map(|(i, _)| i)
            .collect();

        let parts: Vec<&str> = outcome.text.split(NO_RETRIEVAL).collect();
        let mut remapped = String::from(parts[0]);
        for (order, part) in parts[1..].iter().enumerate() {
            // Markers beyond the tokenized view keep their original form.
            let rewrite = marker_positions
                .get(order)
                .map(|&position| {
                    let row = &outcome.logprobs[position];
                    let p_retrieval = prob_at(row, ids.retrieval);
                    let p_continue = prob_at(row, ids.continue_evidence);
                    let p_no_retrieval = prob_at(row, ids.no_retrieval);
                    (p_retrieval + p_continue) / (p_retrieval + p_no_retrieval) > threshold
                })
                .unwrap_or(false);
            remapped.push_str(if rewrite { RETRIEVAL } else { NO_RETRIEVAL });
            remapped.push_str(part);
        }
        remapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sextant_core::traits::IVocabulary;

    struct SeqVocab;

    impl IVocabulary for SeqVocab {
        fn token_id(&self, token: &str) -> Option<TokenId> {
            use super::super::tokens::*;
            let all = [
                RETRIEVAL,
                NO_RETRIEVAL,
                CONTINUE_EVIDENCE,
                RELEVANT,
                IRRELEVANT,
                FULLY_SUPPORTED,
                PARTIALLY_SUPPORTED,
                NO_SUPPORT,
                "[Utility:1]",
                "[Utility:2]",
                "[Utility:3]",
                "[Utility:4]",
                "[Utility:5]",
            ];
            all.iter().position(|t| *t == token).map(|i| i as TokenId + 1)
        }
        fn encode(&self, _text: &str) -> Vec<TokenId> {
            Vec::new()
        }
        fn decode(&self, _ids: &[TokenId]) -> String {
            String::new()
        }
    }

    fn registry() -> ControlTokenRegistry {
        ControlTokenRegistry::resolve(&SeqVocab, true, true).unwrap()
    }

    fn scorer_over(registry: &ControlTokenRegistry) -> CandidateScorer<'_> {
        CandidateScorer::new(registry, ScoreWeights::default(), false, Some(0.2))
    }

    #[test]
    fn absent_ids_take_the_floor() {
        let row: HashMap<TokenId, f64> = [(7, -0.5)].into_iter().collect();
        assert!((prob_at(&row, 7) - (-0.5f64).exp()).abs() < 1e-12);
        assert!((prob_at(&row, 8) - LOGPROB_FLOOR.exp()).abs() < 1e-120);
    }

    #[test]
    fn relevance_normalizes_position_zero() {
        let registry = registry();
        let relevant = registry.relevance.relevant;
        let irrelevant = registry.relevance.irrelevant;
        // P(rel)=0.8, P(irr)=0.2 at position 0.
        let outcome = GenerationOutcome {
            text: "answer".into(),
            token_ids: vec![relevant],
            logprobs: vec![[(relevant, 0.8f64.ln()), (irrelevant, 0.2f64.ln())]
                .into_iter()
                .collect()],
            cumulative_logprob: 0.0,
        };
        let breakdown = scorer_over(&registry).score(&outcome).unwrap();
        assert!((breakdown.relevance - 0.8).abs() < 1e-9);
    }

    #[test]
    fn grounding_reads_first_match_utility_reads_last() {
        let registry = registry();
        let grounding = *registry.grounding.tokens().unwrap();
        let utility = *registry.utility.tokens().unwrap();

        // Grounding token at positions 1 and 3 with different rows; the
        // first one (fully supported dominant) must win.
        // Utility token at positions 2 and 4; the last one (level 5
        // dominant) must win.
        let strong_fully = [(grounding.fully, 0.0), (grounding.partially, -5.0)];
        let strong_partial = [(grounding.fully, -5.0), (grounding.partially, 0.0)];
        let low_utility = [(utility.levels[0], 0.0)];
        let high_utility = [(utility.levels[4], 0.0)];

        let outcome = GenerationOutcome {
            text: "t".into(),
            token_ids: vec![
                registry.relevance.relevant,
                grounding.fully,
                utility.levels[0],
                grounding.partially,
                utility.levels[4],
            ],
            logprobs: vec![
                HashMap::new(),
                strong_fully.into_iter().collect(),
                low_utility.into_iter().collect(),
                strong_partial.into_iter().collect(),
                high_utility.into_iter().collect(),
            ],
            cumulative_logprob: 0.0,
        };
        let breakdown = scorer_over(&registry).score(&outcome).unwrap();
        assert!(breakdown.grounding > 0.9, "first grounding row is fully-supported");
        assert!(breakdown.utility > 0.9, "last utility row is level 5");
    }

    #[test]
    fn missing_signal_tokens_score_zero() {
        let registry = registry();
        let outcome = GenerationOutcome {
            text: "no markers".into(),
            token_ids: vec![999, 998],
            logprobs: vec![HashMap::new(), HashMap::new()],
            cumulative_logprob: -2.0,
        };
        let breakdown = scorer_over(&registry).score(&outcome).unwrap();
        assert_eq!(breakdown.grounding, 0.0);
        assert_eq!(breakdown.utility, 0.0);
    }

    #[test]
    fn length_mismatch_is_surfaced() {
        let registry = registry();
        let outcome = GenerationOutcome {
            text: "bad".into(),
            token_ids: vec![1, 2, 3],
            logprobs: vec![HashMap::new()],
            cumulative_logprob: 0.0,
        };
        assert!(scorer_over(&registry).score(&outcome).is_err());
    }

    #[test]
    fn remap_rewrites_confident_markers_only() {
        let registry = registry();
        let ids = registry.retrieval;
        // Two markers: the first confident (retrieval mass high), the
        // second not.
        let confident = [(ids.retrieval, 0.0), (ids.no_retrieval, 0.0)];
        let unconfident = [(ids.retrieval, -20.0), (ids.continue_evidence, -20.0), (ids.no_retrieval, 0.0)];
        let outcome = GenerationOutcome {
            text: format!("a{NO_RETRIEVAL}b{NO_RETRIEVAL}c"),
            token_ids: vec![ids.no_retrieval, ids.no_retrieval],
            logprobs: vec![
                confident.into_iter().collect(),
                unconfident.into_iter().collect(),
            ],
            cumulative_logprob: 0.0,
        };
        let remapped = scorer_over(&registry).remap_retrieval_markers(&outcome);
        assert_eq!(remapped, format!("a{RETRIEVAL}b{NO_RETRIEVAL}c"));
    }

    #[test]
    fn remap_without_threshold_is_identity() {
        let registry = registry();
        let scorer = CandidateScorer::new(&registry, ScoreWeights::default(), false, None);
        let outcome = GenerationOutcome {
            text: format!("a{NO_RETRIEVAL}b"),
            token_ids: vec![],
            logprobs: vec![],
            cumulative_logprob: 0.0,
        };
        assert_eq!(scorer.remap_retrieval_markers(&outcome), outcome.text);
    }
}
