//! Scripted service mocks for Sextant tests and benchmarks.
//!
//! `ScriptedGenerator` replays a FIFO queue of canned batches, one per
//! `generate` call; `FnGenerator` answers from a closure (needed when
//! items run in parallel and call order is not deterministic);
//! `StaticRetriever` and `StaticVocabulary` are plain lookup tables.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use sextant_core::errors::{GenerationError, SextantResult};
use sextant_core::models::{Document, GenerationOptions, GenerationOutcome, TokenId};
use sextant_core::traits::{IGenerator, IRetriever, IVocabulary};

// ---------------------------------------------------------------------------
// Outcome builders
// ---------------------------------------------------------------------------

/// Text-only outcome with no token or log-probability detail.
pub fn outcome(text: &str) -> GenerationOutcome {
    GenerationOutcome {
        text: text.to_string(),
        ..GenerationOutcome::default()
    }
}

/// Incremental builder for outcomes with per-position log-probability rows.
#[derive(Debug, Default)]
pub struct OutcomeBuilder {
    text: String,
    token_ids: Vec<TokenId>,
    logprobs: Vec<HashMap<TokenId, f64>>,
    cumulative_logprob: f64,
}

impl OutcomeBuilder {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    /// Append one emitted token and its top-K log-probability row.
    pub fn token(mut self, id: TokenId, row: &[(TokenId, f64)]) -> Self {
        self.token_ids.push(id);
        self.logprobs.push(row.iter().copied().collect());
        self
    }

    pub fn cumulative_logprob(mut self, lp: f64) -> Self {
        self.cumulative_logprob = lp;
        self
    }

    pub fn build(self) -> GenerationOutcome {
        GenerationOutcome {
            text: self.text,
            token_ids: self.token_ids,
            logprobs: self.logprobs,
            cumulative_logprob: self.cumulative_logprob,
        }
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Replays scripted batches in FIFO order, one batch per `generate` call.
/// A call beyond the script yields a `Backend` error.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Vec<GenerationOutcome>>>,
    /// Prompts seen, one entry per call, for assertions.
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedGenerator {
    pub fn new(batches: Vec<Vec<GenerationOutcome>>) -> Self {
        Self {
            script: Mutex::new(batches.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

impl IGenerator for ScriptedGenerator {
    fn generate(
        &self,
        prompts: &[String],
        _opts: &GenerationOptions,
    ) -> SextantResult<Vec<GenerationOutcome>> {
        self.calls.lock().unwrap().push(prompts.to_vec());
        let batch = self.script.lock().unwrap().pop_front().ok_or_else(|| {
            GenerationError::Backend {
                reason: "scripted generator exhausted".to_string(),
            }
        })?;
        Ok(batch)
    }
}

/// Answers every call from a closure over the prompt batch. Use this when
/// call order is nondeterministic (parallel items).
pub struct FnGenerator<F>
where
    F: Fn(&[String]) -> Vec<GenerationOutcome> + Send + Sync,
{
    respond: F,
}

impl<F> FnGenerator<F>
where
    F: Fn(&[String]) -> Vec<GenerationOutcome> + Send + Sync,
{
    pub fn new(respond: F) -> Self {
        Self { respond }
    }
}

impl<F> IGenerator for FnGenerator<F>
where
    F: Fn(&[String]) -> Vec<GenerationOutcome> + Send + Sync,
{
    fn generate(
        &self,
        prompts: &[String],
        _opts: &GenerationOptions,
    ) -> SextantResult<Vec<GenerationOutcome>> {
        Ok((self.respond)(prompts))
    }
}

// ---------------------------------------------------------------------------
// Retriever
// ---------------------------------------------------------------------------

pub fn doc(id: &str, contents: &str) -> Document {
    Document::new(id, contents)
}

/// Returns the same document list for every query.
pub struct StaticRetriever {
    docs: Vec<Document>,
}

impl StaticRetriever {
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs }
    }

    pub fn empty() -> Self {
        Self { docs: Vec::new() }
    }
}

impl IRetriever for StaticRetriever {
    fn search(&self, _query: &str) -> SextantResult<Vec<Document>> {
        Ok(self.docs.clone())
    }
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Fixed word-level vocabulary. Ids are assigned in registration order;
/// `encode` splits on whitespace and drops unknown words, `decode` joins
/// with single spaces. Enough fidelity for controller tests.
pub struct StaticVocabulary {
    by_token: HashMap<String, TokenId>,
    by_id: HashMap<TokenId, String>,
}

impl StaticVocabulary {
    pub fn new(tokens: &[&str]) -> Self {
        let mut by_token = HashMap::new();
        let mut by_id = HashMap::new();
        for (i, token) in tokens.iter().enumerate() {
            let id = i as TokenId + 1;
            by_token.insert(token.to_string(), id);
            by_id.insert(id, token.to_string());
        }
        Self { by_token, by_id }
    }

    /// All fourteen control tokens at fixed ids, plus any extra words.
    pub fn with_control_tokens(extra: &[&str]) -> Self {
        let mut tokens: Vec<&str> = vec![
            "[Retrieval]",
            "[No Retrieval]",
            "[Continue to Use Evidence]",
            "[Relevant]",
            "[Irrelevant]",
            "[Fully supported]",
            "[Partially supported]",
            "[No support / Contradictory]",
            "[Utility:1]",
            "[Utility:2]",
            "[Utility:3]",
            "[Utility:4]",
            "[Utility:5]",
            "</s>",
        ];
        tokens.extend_from_slice(extra);
        Self::new(&tokens)
    }
}

impl IVocabulary for StaticVocabulary {
    fn token_id(&self, token: &str) -> Option<TokenId> {
        self.by_token.get(token).copied()
    }

    fn encode(&self, text: &str) -> Vec<TokenId> {
        text.split_whitespace()
            .filter_map(|w| self.by_token.get(w).copied())
            .collect()
    }

    fn decode(&self, ids: &[TokenId]) -> String {
        ids.iter()
            .filter_map(|id| self.by_id.get(id).map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
