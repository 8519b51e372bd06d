//! Control-token vocabulary: sentinel strings, resolved id groups, and the
//! registry handed to the gate, the scorer, and the sanitizer.

use sextant_core::errors::{SextantError, SextantResult};
use sextant_core::models::TokenId;
use sextant_core::traits::IVocabulary;

pub const RETRIEVAL: &str = "[Retrieval]";
pub const NO_RETRIEVAL: &str = "[No Retrieval]";
pub const CONTINUE_EVIDENCE: &str = "[Continue to Use Evidence]";

pub const RELEVANT: &str = "[Relevant]";
pub const IRRELEVANT: &str = "[Irrelevant]";

pub const FULLY_SUPPORTED: &str = "[Fully supported]";
pub const PARTIALLY_SUPPORTED: &str = "[Partially supported]";
pub const NO_SUPPORT: &str = "[No support / Contradictory]";

pub const UTILITY: [&str; 5] = [
    "[Utility:1]",
    "[Utility:2]",
    "[Utility:3]",
    "[Utility:4]",
    "[Utility:5]",
];

pub const PARAGRAPH_OPEN: &str = "<paragraph>";
pub const PARAGRAPH_CLOSE: &str = "</paragraph>";
pub const END_OF_SEQUENCE: &str = "</s>";
pub const END_OF_TEXT: &str = "<|endoftext|>";

/// Every in-band marker stripped by sanitization.
pub const CONTROL_TOKENS: [&str; 16] = [
    FULLY_SUPPORTED,
    PARTIALLY_SUPPORTED,
    NO_SUPPORT,
    NO_RETRIEVAL,
    RETRIEVAL,
    CONTINUE_EVIDENCE,
    IRRELEVANT,
    RELEVANT,
    PARAGRAPH_OPEN,
    PARAGRAPH_CLOSE,
    "[Utility:1]",
    "[Utility:2]",
    "[Utility:3]",
    "[Utility:4]",
    "[Utility:5]",
    END_OF_SEQUENCE,
];

#[derive(Debug, Clone, Copy)]
pub struct RetrievalTokens {
    pub retrieval: TokenId,
    pub no_retrieval: TokenId,
    pub continue_evidence: TokenId,
}

#[derive(Debug, Clone, Copy)]
pub struct RelevanceTokens {
    pub relevant: TokenId,
    pub irrelevant: TokenId,
}

#[derive(Debug, Clone, Copy)]
pub struct GroundingTokens {
    pub fully: TokenId,
    pub partially: TokenId,
    pub no_support: TokenId,
}

impl GroundingTokens {
    pub fn contains(&self, id: TokenId) -> bool {
        id == self.fully || id == self.partially || id == self.no_support
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UtilityTokens {
    /// Ids for `[Utility:1]` .. `[Utility:5]` in level order.
    pub levels: [TokenId; 5],
}

impl UtilityTokens {
    pub fn contains(&self, id: TokenId) -> bool {
        self.levels.contains(&id)
    }
}

/// A signal group that may be disabled at configuration time. Disabled
/// groups statically contribute zero to the composite score; no token
/// lookup is attempted for them.
#[derive(Debug, Clone, Copy)]
pub enum GroundingSignal {
    Disabled,
    Enabled(GroundingTokens),
}

impl GroundingSignal {
    pub fn tokens(&self) -> Option<&GroundingTokens> {
        match self {
            GroundingSignal::Disabled => None,
            GroundingSignal::Enabled(tokens) => Some(tokens),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum UtilitySignal {
    Disabled,
    Enabled(UtilityTokens),
}

impl UtilitySignal {
    pub fn tokens(&self) -> Option<&UtilityTokens> {
        match self {
            UtilitySignal::Disabled => None,
            UtilitySignal::Enabled(tokens) => Some(tokens),
        }
    }
}

/// Resolved ids for all four control-token groups. Built once at startup;
/// read-only for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct ControlTokenRegistry {
    pub retrieval: RetrievalTokens,
    pub relevance: RelevanceTokens,
    pub grounding: GroundingSignal,
    pub utility: UtilitySignal,
}

impl ControlTokenRegistry {
    /// Resolve every enabled group against the vocabulary. A missing
    /// control token is fatal: scores computed without it would be
    /// silently wrong.
    pub fn resolve(
        vocabulary: &dyn IVocabulary,
        use_grounding: bool,
        use_utility: bool,
    ) -> SextantResult<Self> {
        let retrieval = RetrievalTokens {
            retrieval: require(vocabulary, RETRIEVAL)?,
            no_retrieval: require(vocabulary, NO_RETRIEVAL)?,
            continue_evidence: require(vocabulary, CONTINUE_EVIDENCE)?,
        };
        let relevance = RelevanceTokens {
            relevant: require(vocabulary, RELEVANT)?,
            irrelevant: require(vocabulary, IRRELEVANT)?,
        };
        let grounding = if use_grounding {
            GroundingSignal::Enabled(GroundingTokens {
                fully: require(vocabulary, FULLY_SUPPORTED)?,
                partially: require(vocabulary, PARTIALLY_SUPPORTED)?,
                no_support: require(vocabulary, NO_SUPPORT)?,
            })
        } else {
            GroundingSignal::Disabled
        };
        let utility = if use_utility {
            let mut levels = [0; 5];
            for (slot, token) in levels.iter_mut().zip(UTILITY) {
                *slot = require(vocabulary, token)?;
            }
            UtilitySignal::Enabled(UtilityTokens { levels })
        } else {
            UtilitySignal::Disabled
        };
        Ok(Self {
            retrieval,
            relevance,
            grounding,
            utility,
        })
    }
}

fn require(vocabulary: &dyn IVocabulary, token: &str) -> SextantResult<TokenId> {
    vocabulary
        .token_id(token)
        .ok_or_else(|| SextantError::MissingControlToken {
            token: token.to_string(),
        })
}
