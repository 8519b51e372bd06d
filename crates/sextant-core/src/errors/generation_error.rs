/// Generation-service errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Token-id count and log-probability-row count disagree. An upstream
    /// contract breach; continuing would silently corrupt scores.
    #[error("malformed outcome: {token_count} token ids but {logprob_count} logprob rows")]
    MalformedOutcome {
        token_count: usize,
        logprob_count: usize,
    },

    #[error("generation backend error: {reason}")]
    Backend { reason: String },

    #[error("generation call returned an empty batch")]
    EmptyBatch,
}
