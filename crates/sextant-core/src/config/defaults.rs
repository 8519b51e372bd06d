//! Default configuration values. Single source of truth for every
//! `Default` impl in the config module.

/// Retrieval-decision gate threshold on P(retrieve) / (P(retrieve) + P(skip)).
pub const DEFAULT_THRESHOLD: f64 = 0.2;

/// Maximum tree-search depth (depth 0 is the sentinel root).
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Survivors kept per depth after pruning.
pub const DEFAULT_BEAM_WIDTH: usize = 2;

/// Weights for the composite candidate score.
pub const DEFAULT_WEIGHT_RELEVANCE: f64 = 1.0;
pub const DEFAULT_WEIGHT_GROUNDING: f64 = 1.0;
pub const DEFAULT_WEIGHT_UTILITY: f64 = 1.0;

/// Rounds of the fixed-iteration retrieve-then-generate loop.
pub const DEFAULT_ITERATIVE_ROUNDS: usize = 3;

/// Lookahead pipeline: tokens generated per probe, total generation
/// budget, round cap, and per-token confidence threshold.
pub const DEFAULT_LOOKAHEAD_TOKENS: usize = 64;
pub const DEFAULT_GENERATION_BUDGET: usize = 256;
pub const DEFAULT_FLARE_ROUNDS: usize = 5;
pub const DEFAULT_FLARE_THRESHOLD: f64 = 0.2;

/// Self-ask dialogue round cap.
pub const DEFAULT_SELF_ASK_ROUNDS: usize = 5;

/// Top-K log-probability view widths. The gate needs the whole vocabulary
/// so the two decision tokens are always visible; candidate scoring gets
/// by with a narrower view.
pub const GATE_LOGPROB_TOP_K: usize = 32_000;
pub const SCORING_LOGPROB_TOP_K: usize = 5_000;

/// Log-probability assigned to a token id absent from a sparse top-K row.
pub const LOGPROB_FLOOR: f64 = -100.0;
