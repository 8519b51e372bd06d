//! # sextant-core
//!
//! Foundation crate for the Sextant adaptive retrieval-augmented generation
//! system. Defines the data model, service traits, errors, config, and the
//! task taxonomy. Every other crate in the workspace depends on this.

pub mod config;
pub mod errors;
pub mod models;
pub mod task;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::SextantConfig;
pub use errors::{SextantError, SextantResult};
pub use models::{Document, GenerationOptions, GenerationOutcome, ScoreBreakdown, TokenId};
pub use task::TaskKind;
