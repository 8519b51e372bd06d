//! Self-reflective RAG controller: retrieval decision gate, candidate
//! scoring, beam-pruned tree search, and answer assembly.

pub mod assemble;
pub mod beam;
pub mod critic;
pub mod gate;
pub mod tokens;

pub use assemble::{AnswerAssembler, LongFormAnswer, ScoredAnswer};
pub use beam::{BeamTreeSearch, GenerationNode, SearchTree};
pub use critic::CandidateScorer;
pub use gate::RetrievalDecisionGate;
pub use tokens::ControlTokenRegistry;

use rayon::prelude::*;
use sextant_core::config::defaults::SCORING_LOGPROB_TOP_K;
use sextant_core::config::SelfRagConfig;
use sextant_core::errors::{GenerationError, SextantResult};
use sextant_core::models::{
    Document, GenerationOptions, GenerationOutcome, ItemReport, Prediction, SearchTrace,
};
use sextant_core::traits::{IGenerator, IRetriever, IVocabulary};
use tracing::{debug, info};

use crate::prompt::{instruction_prompt, wrap_paragraph};
use tokens::{NO_RETRIEVAL, RETRIEVAL};

/// The full controller. Holds read-only configuration and the resolved
/// token registry; every item owns its own tree, so items are independent.
pub struct SelfRagPipeline<'a> {
    generator: &'a dyn IGenerator,
    retriever: &'a dyn IRetriever,
    registry: ControlTokenRegistry,
    config: SelfRagConfig,
}

impl<'a> SelfRagPipeline<'a> {
    /// Resolves the control-token registry up front; a missing control
    /// token fails the whole run here, before any item is touched.
    pub fn new(
        generator: &'a dyn IGenerator,
        retriever: &'a dyn IRetriever,
        vocabulary: &dyn IVocabulary,
        config: SelfRagConfig,
    ) -> SextantResult<Self> {
        let registry =
            ControlTokenRegistry::resolve(vocabulary, config.use_grounding, config.use_utility)?;
        Ok(Self {
            generator,
            retriever,
            registry,
            config,
        })
    }

    fn scorer(&self) -> CandidateScorer<'_> {
        CandidateScorer::new(
            &self.registry,
            self.config.weights,
            self.config.use_seqscore,
            self.config.threshold,
        )
    }

    fn gate(&self) -> RetrievalDecisionGate<'_> {
        RetrievalDecisionGate::new(
            self.generator,
            &self.registry,
            self.config.mode,
            self.config.threshold,
        )
    }

    fn assembler(&self) -> AnswerAssembler {
        AnswerAssembler::new(self.config.ignore_contradictions, self.config.task)
    }

    /// Short-form run: flat best-of-N over parallel per-document
    /// generations, a degenerate depth-1 search. All candidates across
    /// all items go out as one batched generation call.
    pub fn run_batch(&self, questions: &[String]) -> SextantResult<Vec<ItemReport>> {
        let documents = self.retriever.batch_search(questions)?;
        let prompts: Vec<String> = questions
            .iter()
            .map(|q| instruction_prompt(self.config.task, q))
            .collect();
        let flags = self.gate().decide(&prompts)?;

        // One prompt per document for gated items (or a single fallback
        // when no documents came back); one no-retrieval prompt otherwise.
        let mut batch: Vec<String> = Vec::new();
        let mut spans: Vec<usize> = Vec::new();
        for ((prompt, flag), docs) in prompts.iter().zip(&flags).zip(&documents) {
            if *flag {
                if docs.is_empty() {
                    batch.push(prompt.clone());
                    spans.push(1);
                } else {
                    batch.extend(
                        docs.iter()
                            .map(|d| format!("{prompt}{RETRIEVAL}{}", wrap_paragraph(&d.contents))),
                    );
                    spans.push(docs.len());
                }
            } else {
                batch.push(format!("{prompt}{NO_RETRIEVAL}"));
                spans.push(1);
            }
        }

        let opts = GenerationOptions::with_logprobs(SCORING_LOGPROB_TOP_K);
        let outcomes = self.generator.generate(&batch, &opts)?;
        if outcomes.len() != batch.len() {
            return Err(GenerationError::Backend {
                reason: format!(
                    "batch of {} prompts returned {} outcomes",
                    batch.len(),
                    outcomes.len()
                ),
            }
            .into());
        }
        info!(items = questions.len(), candidates = batch.len(), "short-form batch generated");

        let scorer = self.scorer();
        let assembler = self.assembler();
        let mut reports = Vec::with_capacity(questions.len());
        let mut cursor = 0usize;
        for (((question, flag), span), docs) in
            questions.iter().zip(&flags).zip(&spans).zip(&documents)
        {
            let slice = &outcomes[cursor..cursor + span];
            cursor += span;
            let result = if *flag {
                self.select_flat(&scorer, &assembler, slice, docs)
            } else {
                Ok(Prediction::plain(assemble::sanitize(&slice[0].text)))
            };
            reports.push(ItemReport {
                question: question.clone(),
                result,
            });
        }
        Ok(reports)
    }

    /// Score each per-document candidate and pick the best answer under
    /// the task's policy. A failure here is this item's failure only.
    fn select_flat(
        &self,
        scorer: &CandidateScorer<'_>,
        assembler: &AnswerAssembler,
        outcomes: &[GenerationOutcome],
        docs: &[Document],
    ) -> SextantResult<Prediction> {
        let mut candidates = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            let breakdown = scorer.score(outcome)?;
            candidates.push(ScoredAnswer {
                text: outcome.text.clone(),
                score: breakdown.final_score,
            });
        }
        let answer = assembler.select_best(&candidates)?;
        Ok(Prediction {
            answer: assemble::sanitize(&answer),
            documents: docs.to_vec(),
            trace: None,
        })
    }

    /// Long-form run: gated items run the beam search and assemble a
    /// cited (or plainly sanitized) answer; ungated items take one plain
    /// text-only generation. Items are independent and run in parallel;
    /// one item's failure lands in its report without aborting siblings.
    pub fn run_long_form(&self, questions: &[String]) -> SextantResult<Vec<ItemReport>> {
        let documents = self.retriever.batch_search(questions)?;
        let prompts: Vec<String> = questions
            .iter()
            .map(|q| instruction_prompt(self.config.task, q))
            .collect();
        let flags = self.gate().decide(&prompts)?;

        let items: Vec<(&String, &String, bool, &Vec<Document>)> = questions
            .iter()
            .zip(&prompts)
            .zip(&flags)
            .zip(&documents)
            .map(|(((q, p), f), d)| (q, p, *f, d))
            .collect();

        let reports: Vec<ItemReport> = items
            .into_par_iter()
            .map(|(question, prompt, flag, docs)| ItemReport {
                question: question.clone(),
                result: self.run_long_form_item(prompt, flag, docs),
            })
            .collect();
        Ok(reports)
    }

    fn run_long_form_item(
        &self,
        prompt: &str,
        retrieve: bool,
        docs: &[Document],
    ) -> SextantResult<Prediction> {
        if !retrieve {
            let prompt = format!("{prompt}{NO_RETRIEVAL}");
            let texts = self
                .generator
                .complete(&[prompt], &GenerationOptions::default())?;
            let text = texts.into_iter().next().ok_or(GenerationError::EmptyBatch)?;
            return Ok(Prediction::plain(text));
        }

        let search = BeamTreeSearch::new(self.generator, self.scorer(), &self.config);
        let tree = search.run(prompt, docs)?;
        let assembler = self.assembler();
        let paths = assembler.extract_paths(&tree);
        debug!(nodes = tree.len(), paths = paths.len(), "beam search complete");

        let (answer, cited) = if self.config.task.cites_sources() {
            let assembled = assembler.assemble_long_form(&paths);
            (assembled.text, assembled.documents)
        } else {
            let text = paths.first().map(|p| p.text.as_str()).unwrap_or("");
            (assemble::sanitize(text), Vec::new())
        };

        Ok(Prediction {
            answer,
            documents: cited,
            trace: Some(SearchTrace {
                nodes: tree.trace_nodes(),
                paths,
            }),
        })
    }
}
