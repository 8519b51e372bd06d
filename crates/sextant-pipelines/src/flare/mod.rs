//! Forward-looking active retrieval (FLARE): generate a bounded
//! lookahead, accept its first sentence when every token is confident,
//! otherwise retrieve on the masked (confident-only) tokens and
//! regenerate before accepting.

pub mod confidence;

use sextant_core::config::FlareConfig;
use sextant_core::errors::SextantResult;
use sextant_core::models::{GenerationOptions, ItemReport, Prediction};
use sextant_core::traits::{IGenerator, IRetriever, IVocabulary};
use tracing::debug;

use crate::prompt::reference_prompt;
use confidence::{first_sentence, is_confident, masked_query};

pub struct FlarePipeline<'a> {
    generator: &'a dyn IGenerator,
    retriever: &'a dyn IRetriever,
    vocabulary: &'a dyn IVocabulary,
    config: FlareConfig,
}

impl<'a> FlarePipeline<'a> {
    pub fn new(
        generator: &'a dyn IGenerator,
        retriever: &'a dyn IRetriever,
        vocabulary: &'a dyn IVocabulary,
        config: FlareConfig,
    ) -> Self {
        Self {
            generator,
            retriever,
            vocabulary,
            config,
        }
    }

    fn lookahead_opts(&self) -> GenerationOptions {
        GenerationOptions {
            logprob_top_k: Some(1),
            stop: Vec::new(),
            max_new_tokens: Some(self.config.lookahead_tokens),
        }
    }

    /// One item: loop until the generated length reaches the budget or
    /// the round cap.
    pub fn run_item(&self, question: &str) -> SextantResult<String> {
        let mut answer = String::new();
        let mut generated = 0usize;
        let mut round = 0usize;

        while generated < self.config.generation_budget && round < self.config.max_rounds {
            let prompt = reference_prompt(question, &[], &answer);
            let outcomes = self.generator.generate(&[prompt], &self.lookahead_opts())?;
            let Some(outcome) = outcomes.first() else {
                break;
            };
            let Some((sentence, scores)) = first_sentence(outcome, self.vocabulary) else {
                break;
            };

            let accepted = if is_confident(&scores, self.config.threshold) {
                sentence
            } else {
                // Uncertain sentence: retrieve on the confident tokens
                // only, then regenerate over the references.
                let query = masked_query(&sentence, &scores, self.config.threshold, self.vocabulary);
                let query = if query.is_empty() { question } else { &query };
                let documents = self.retriever.search(query)?;
                debug!(round, query, docs = documents.len(), "lookahead retrieval");

                let prompt = reference_prompt(question, &documents, &answer);
                let outcomes = self.generator.generate(&[prompt], &self.lookahead_opts())?;
                match outcomes.first().and_then(|o| first_sentence(o, self.vocabulary)) {
                    Some((regenerated, _)) => regenerated,
                    None => break,
                }
            };

            if !answer.is_empty() {
                answer.push(' ');
            }
            answer.push_str(&accepted);
            generated += scores.len().max(1);
            round += 1;
        }

        Ok(answer)
    }

    /// Per-item isolation: one item's failure fills its report without
    /// aborting siblings.
    pub fn run(&self, questions: &[String]) -> Vec<ItemReport> {
        questions
            .iter()
            .map(|question| ItemReport {
                question: question.clone(),
                result: self.run_item(question).map(Prediction::plain),
            })
            .collect()
    }
}
