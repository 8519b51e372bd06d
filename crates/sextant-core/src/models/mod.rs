pub mod document;
pub mod generation;
pub mod prediction;
pub mod score;

pub use document::Document;
pub use generation::{GenerationOptions, GenerationOutcome, TokenId};
pub use prediction::{ItemReport, NodeTrace, PathTrace, Prediction, SearchTrace};
pub use score::ScoreBreakdown;
