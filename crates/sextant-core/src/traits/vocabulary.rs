use crate::models::TokenId;

/// Tokenizer vocabulary seam: control-token lookup plus plain encode and
/// decode (the lookahead pipeline masks and re-decodes token sequences).
pub trait IVocabulary: Send + Sync {
    /// Id of a single vocabulary entry, `None` when absent.
    fn token_id(&self, token: &str) -> Option<TokenId>;

    fn encode(&self, text: &str) -> Vec<TokenId>;

    fn decode(&self, ids: &[TokenId]) -> String;
}
