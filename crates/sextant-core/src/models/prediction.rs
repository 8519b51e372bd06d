use serde::{Deserialize, Serialize};

use crate::errors::SextantResult;
use crate::models::Document;

/// Final per-item output of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub answer: String,
    /// Context documents that contributed to the answer (post-filtering).
    pub documents: Vec<Document>,
    /// Audit trail of the tree search, present for long-form runs.
    pub trace: Option<SearchTrace>,
}

impl Prediction {
    pub fn plain(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            documents: Vec::new(),
            trace: None,
        }
    }
}

/// One item's result. A failed item carries its error here; sibling items
/// in the same batch are never aborted by it.
#[derive(Debug)]
pub struct ItemReport {
    pub question: String,
    pub result: SextantResult<Prediction>,
}

/// Audit trail of one item's beam search: every node the search created
/// (pruned ones included) plus the surviving root-to-leaf paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTrace {
    pub nodes: Vec<NodeTrace>,
    pub paths: Vec<PathTrace>,
}

/// Snapshot of one search-tree node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTrace {
    pub id: usize,
    pub raw_text: String,
    pub processed_text: String,
    pub score: Option<f64>,
    pub parent: Option<usize>,
    pub document_id: Option<String>,
}

/// One reconstructed root-to-leaf path. Segment, raw-segment, and document
/// lists are positionally aligned; contradiction-filtered nodes are absent
/// from all three but remain visible in [`SearchTrace::nodes`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathTrace {
    pub node_ids: Vec<usize>,
    /// Space-joined processed segments.
    pub text: String,
    pub segments: Vec<String>,
    pub raw_segments: Vec<String>,
    pub documents: Vec<Option<Document>>,
    /// Score of the leaf node (chained multiplicatively down the path).
    pub score: f64,
}
