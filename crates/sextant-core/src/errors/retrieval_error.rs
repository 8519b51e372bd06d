/// Retrieval-service errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("search failed: {reason}")]
    SearchFailed { reason: String },

    #[error("retrieval backend error: {reason}")]
    Backend { reason: String },
}
