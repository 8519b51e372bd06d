pub mod generation_error;
pub mod retrieval_error;

pub use generation_error::GenerationError;
pub use retrieval_error::RetrievalError;

/// Top-level error type for the Sextant workspace.
#[derive(Debug, thiserror::Error)]
pub enum SextantError {
    /// A required control token is absent from the vocabulary. Fatal at
    /// startup; scoring cannot run without the full token groups.
    #[error("control token missing from vocabulary: {token}")]
    MissingControlToken { token: String },

    /// Closed-form answer selection was asked to pick from zero candidates.
    #[error("no candidate answers to select from")]
    NoCandidates,

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),
}

pub type SextantResult<T> = Result<T, SextantError>;
