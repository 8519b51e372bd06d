use crate::errors::SextantResult;
use crate::models::Document;

/// Document-retrieval service seam. Returns documents ordered by relevance.
pub trait IRetriever: Send + Sync {
    fn search(&self, query: &str) -> SextantResult<Vec<Document>>;

    /// Batched form. The default issues queries sequentially; implementors
    /// may batch for throughput, with identical results.
    fn batch_search(&self, queries: &[String]) -> SextantResult<Vec<Vec<Document>>> {
        queries.iter().map(|q| self.search(q)).collect()
    }
}
