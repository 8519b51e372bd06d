pub mod generator;
pub mod retriever;
pub mod vocabulary;

pub use generator::IGenerator;
pub use retriever::IRetriever;
pub use vocabulary::IVocabulary;
