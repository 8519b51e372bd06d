//! # sextant-pipelines
//!
//! The four adaptive retrieval-augmented generation pipelines. The
//! self-reflective controller is the heavy one; the other three call the
//! generator and retriever in a fixed sequence.
//!
//! ```text
//! selfrag/              self-reflective controller
//!   tokens.rs           control-token registry (4 signal groups)
//!   gate.rs             retrieval decision gate (adaptive / always / never)
//!   critic.rs           candidate scorer (relevance, grounding, utility)
//!   beam.rs             beam-pruned tree search over continuations
//!   assemble.rs         path reconstruction, sanitization, best-answer pick
//!   mod.rs              SelfRagPipeline (flat best-of-N + long-form runs)
//! iterative.rs          fixed-round retrieve-then-generate loop
//! flare/                forward-looking active retrieval
//!   confidence.rs       sentence split + chosen-token confidence
//!   mod.rs              FlarePipeline lookahead loop
//! selfask.rs            scripted self-ask dialogue loop
//! prompt.rs             instruction prompts and reference blocks
//! ```

pub mod flare;
pub mod iterative;
pub mod prompt;
pub mod selfask;
pub mod selfrag;

pub use flare::FlarePipeline;
pub use iterative::IterativePipeline;
pub use selfask::SelfAskPipeline;
pub use selfrag::SelfRagPipeline;
