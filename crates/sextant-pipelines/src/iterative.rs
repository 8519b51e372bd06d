//! Fixed-round generation-augmented retrieval: each round queries with
//! the question plus the previous round's answer, retrieves, and
//! regenerates over the fresh references.

use sextant_core::config::IterativeConfig;
use sextant_core::errors::SextantResult;
use sextant_core::models::GenerationOptions;
use sextant_core::traits::{IGenerator, IRetriever};
use tracing::debug;

use crate::prompt::reference_prompt;

/// Intermediate outputs of one round, retained for inspection.
#[derive(Debug, Clone)]
pub struct RoundOutput {
    pub queries: Vec<String>,
    pub answers: Vec<String>,
}

/// Full run result: per-round intermediates plus the final answers (the
/// last round's generations).
#[derive(Debug, Clone)]
pub struct IterativeRun {
    pub rounds: Vec<RoundOutput>,
    pub answers: Vec<String>,
}

pub struct IterativePipeline<'a> {
    generator: &'a dyn IGenerator,
    retriever: &'a dyn IRetriever,
    config: IterativeConfig,
}

impl<'a> IterativePipeline<'a> {
    pub fn new(
        generator: &'a dyn IGenerator,
        retriever: &'a dyn IRetriever,
        config: IterativeConfig,
    ) -> Self {
        Self {
            generator,
            retriever,
            config,
        }
    }

    pub fn run(&self, questions: &[String]) -> SextantResult<IterativeRun> {
        let mut rounds = Vec::with_capacity(self.config.rounds);
        let mut previous: Vec<String> = Vec::new();

        for round in 0..self.config.rounds {
            // Round 0 queries with the bare questions; later rounds fold
            // in the previous answers.
            let queries: Vec<String> = if round == 0 {
                questions.to_vec()
            } else {
                questions
                    .iter()
                    .zip(&previous)
                    .map(|(q, a)| format!("{q} {a}"))
                    .collect()
            };

            let documents = self.retriever.batch_search(&queries)?;
            let prompts: Vec<String> = questions
                .iter()
                .zip(&documents)
                .map(|(q, docs)| reference_prompt(q, docs, ""))
                .collect();
            previous = self
                .generator
                .complete(&prompts, &GenerationOptions::default())?;
            debug!(round, items = questions.len(), "iterative round complete");

            rounds.push(RoundOutput {
                queries,
                answers: previous.clone(),
            });
        }

        Ok(IterativeRun {
            answers: previous,
            rounds,
        })
    }
}
