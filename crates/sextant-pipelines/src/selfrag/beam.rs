//! Beam-pruned tree search over retrieval-augmented continuations.
//!
//! The tree is an arena of nodes addressed by index with parent-id
//! back-references: pruning a node keeps its ancestors reachable from
//! other survivors, and the arena doubles as the audit trail.

use sextant_core::config::defaults::SCORING_LOGPROB_TOP_K;
use sextant_core::config::SelfRagConfig;
use sextant_core::errors::SextantResult;
use sextant_core::models::{Document, GenerationOptions, NodeTrace, ScoreBreakdown};
use sextant_core::traits::IGenerator;
use tracing::debug;

use super::critic::CandidateScorer;
use super::tokens::{END_OF_SEQUENCE, RETRIEVAL};
use crate::prompt::wrap_paragraph;

/// One unit of the search tree. Created during expansion and never
/// mutated afterwards; `processed_text` is derived from `raw_text` at
/// creation time.
#[derive(Debug, Clone)]
pub struct GenerationNode {
    pub id: usize,
    /// Accumulated prompt this node was generated from.
    pub prompt_prefix: String,
    pub raw_text: String,
    /// Raw text truncated at the first retrieval marker, if any.
    pub processed_text: String,
    /// Chained score; `None` only for the sentinel root.
    pub score: Option<f64>,
    pub breakdown: Option<ScoreBreakdown>,
    /// Document this candidate was conditioned on, if any.
    pub context: Option<Document>,
    pub parent: Option<usize>,
}

/// Arena of nodes plus per-depth levels. `levels[0]` always holds exactly
/// the sentinel root; deeper levels hold at most `beam_width` survivors.
/// Pruned nodes stay in the arena but drop out of their level.
#[derive(Debug)]
pub struct SearchTree {
    nodes: Vec<GenerationNode>,
    levels: Vec<Vec<usize>>,
}

impl SearchTree {
    /// Fresh tree: the root is a sentinel marking "retrieval pending".
    pub fn new(prompt: &str) -> Self {
        let root = GenerationNode {
            id: 0,
            prompt_prefix: prompt.to_string(),
            raw_text: RETRIEVAL.to_string(),
            processed_text: String::new(),
            score: None,
            breakdown: None,
            context: None,
            parent: None,
        };
        Self {
            nodes: vec![root],
            levels: vec![vec![0]],
        }
    }

    pub fn node(&self, id: usize) -> &GenerationNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn levels(&self) -> &[Vec<usize>] {
        &self.levels
    }

    /// Deepest level that kept at least one survivor.
    pub fn deepest_level(&self) -> &[usize] {
        self.levels
            .iter()
            .rev()
            .find(|level| !level.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Root-to-leaf node ids, following parent pointers backward. The
    /// walk terminates at the root because every parent id strictly
    /// precedes its child.
    pub fn path_to_root(&self, leaf: usize) -> Vec<usize> {
        let mut path = vec![leaf];
        let mut current = leaf;
        while let Some(parent) = self.nodes[current].parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Serializable snapshot of the whole arena, pruned nodes included.
    pub fn trace_nodes(&self) -> Vec<NodeTrace> {
        self.nodes
            .iter()
            .map(|n| NodeTrace {
                id: n.id,
                raw_text: n.raw_text.clone(),
                processed_text: n.processed_text.clone(),
                score: n.score,
                parent: n.parent,
                document_id: n.context.as_ref().map(|d| d.id.clone()),
            })
            .collect()
    }

    fn push(&mut self, node: GenerationNode) -> usize {
        let id = self.nodes.len();
        debug_assert_eq!(node.id, id);
        self.nodes.push(node);
        id
    }
}

/// Drives the multi-depth expansion: every surviving node at depth `d-1`
/// expands into one child per candidate continuation, scored by the
/// critic, then the depth is pruned to `beam_width` by score.
pub struct BeamTreeSearch<'a> {
    generator: &'a dyn IGenerator,
    scorer: CandidateScorer<'a>,
    config: &'a SelfRagConfig,
}

impl<'a> BeamTreeSearch<'a> {
    pub fn new(
        generator: &'a dyn IGenerator,
        scorer: CandidateScorer<'a>,
        config: &'a SelfRagConfig,
    ) -> Self {
        Self {
            generator,
            scorer,
            config,
        }
    }

    /// Run one item's search. Depths are strictly sequential; candidates
    /// within a depth are dispatched as one batched generation call per
    /// expanding node.
    pub fn run(&self, prompt: &str, documents: &[Document]) -> SextantResult<SearchTree> {
        let mut tree = SearchTree::new(prompt);
        let opts = GenerationOptions::with_logprobs(SCORING_LOGPROB_TOP_K);

        for depth in 1..self.config.max_depth {
            let live: Vec<usize> = tree.levels[depth - 1].clone();
            let mut created: Vec<usize> = Vec::new();

            for node_id in live {
                let node = tree.node(node_id).clone();
                // A terminal end-of-sequence halts this branch for the
                // rest of the pass.
                if node.raw_text == END_OF_SEQUENCE {
                    continue;
                }
                // Only nodes still asking for retrieval expand further.
                if !node.raw_text.contains(RETRIEVAL) {
                    continue;
                }

                let prefix = format!("{}{}", node.prompt_prefix, node.processed_text);
                // One candidate per document; with no documents available,
                // a single un-augmented fallback candidate.
                let (prompts, contexts): (Vec<String>, Vec<Option<Document>>) =
                    if documents.is_empty() {
                        (vec![prefix.clone()], vec![None])
                    } else {
                        documents
                            .iter()
                            .map(|d| {
                                (
                                    format!("{prefix}{RETRIEVAL}{}", wrap_paragraph(&d.contents)),
                                    Some(d.clone()),
                                )
                            })
                            .unzip()
                    };

                let outcomes = self.generator.generate(&prompts, &opts)?;
                for (outcome, context) in outcomes.iter().zip(contexts) {
                    let breakdown = self.scorer.score(outcome)?;
                    let raw_text = self.scorer.remap_retrieval_markers(outcome);
                    // Chain multiplicatively down the path; the root
                    // counts as 1.
                    let score = breakdown.final_score * node.score.unwrap_or(1.0);
                    let processed_text = match raw_text.find(RETRIEVAL) {
                        Some(at) => raw_text[..at].to_string(),
                        None => raw_text.clone(),
                    };
                    let id = tree.push(GenerationNode {
                        id: tree.len(),
                        prompt_prefix: prefix.clone(),
                        raw_text,
                        processed_text,
                        score: Some(score),
                        breakdown: Some(breakdown),
                        context,
                        parent: Some(node_id),
                    });
                    created.push(id);
                }
            }

            // Every live branch terminal or leaf: the search halts early.
            if created.is_empty() {
                break;
            }

            // Prune by score descending; the sort is stable, so ties keep
            // their enumeration order.
            let mut ranked = created;
            ranked.sort_by(|a, b| {
                let sa = tree.node(*a).score.unwrap_or(0.0);
                let sb = tree.node(*b).score.unwrap_or(0.0);
                sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
            });
            let total = ranked.len();
            ranked.truncate(self.config.beam_width);
            debug!(depth, candidates = total, kept = ranked.len(), "pruned level");
            tree.levels.push(ranked);
        }

        Ok(tree)
    }
}
