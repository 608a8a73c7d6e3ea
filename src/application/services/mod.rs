pub mod answer_service;
pub mod chunker;
pub mod embedding_backfill;
pub mod ingestion_service;
pub mod retriever;

#[cfg(test)]
pub(crate) mod test_support;

pub use answer_service::{AnswerError, AnswerService};
pub use chunker::{ChunkerError, TokenChunker};
pub use embedding_backfill::{BackfillError, BackfillOutcome, EmbeddingBackfill};
pub use ingestion_service::{IngestOutcome, IngestionError, IngestionService};
pub use retriever::{RetrieveError, Retriever, RetrieverConfig};
