use crate::errors::SextantResult;
use crate::models::{GenerationOptions, GenerationOutcome};

/// Text-generation service seam.
///
/// `generate` returns the raw per-prompt outcome with token ids and
/// log-probability detail; `complete` returns text only, for branches that
/// never score. Batching is a throughput optimization: issuing prompts one
/// at a time must give identical results.
pub trait IGenerator: Send + Sync {
    fn generate(
        &self,
        prompts: &[String],
        opts: &GenerationOptions,
    ) -> SextantResult<Vec<GenerationOutcome>>;

    fn complete(&self, prompts: &[String], opts: &GenerationOptions) -> SextantResult<Vec<String>> {
        Ok(self
            .generate(prompts, opts)?
            .into_iter()
            .map(|outcome| outcome.text)
            .collect())
    }
}
