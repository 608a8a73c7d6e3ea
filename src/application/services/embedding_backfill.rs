use std::sync::Arc;

use crate::application::ports::EmbeddingProvider;
use crate::domain::repositories::PageRepository;

/// Conservative batch size to stay under upstream request limits.
pub const EMBEDDING_BATCH_SIZE: usize = 100;

#[derive(Debug)]
pub enum BackfillError {
    StoreError(String),
    ProviderError(String),
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for BackfillError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackfillError::StoreError(msg) => write!(f, "Store error: {}", msg),
            BackfillError::ProviderError(msg) => write!(f, "Embedding provider error: {}", msg),
            BackfillError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "Embedding dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for BackfillError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillOutcome {
    pub updated: usize,
}

/// Finds stored chunks lacking an embedding and fills them in via batched
/// provider calls. The provider returns vectors in submission order, and the
/// chunk ordering is never touched between request construction and response
/// application, so each vector is written back to the chunk it came from.
pub struct EmbeddingBackfill {
    repository: Arc<dyn PageRepository>,
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl EmbeddingBackfill {
    pub fn new(repository: Arc<dyn PageRepository>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            repository,
            provider,
            batch_size: EMBEDDING_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// A failed provider call leaves that batch untouched and propagates;
    /// batches already applied stay applied. No global rollback.
    pub async fn backfill(&self, project: &str) -> Result<BackfillOutcome, BackfillError> {
        let pending = self
            .repository
            .get_without_embedding(project)
            .await
            .map_err(|e| BackfillError::StoreError(e.to_string()))?;

        if pending.is_empty() {
            tracing::info!(project, "no chunks awaiting embeddings");
            return Ok(BackfillOutcome { updated: 0 });
        }

        tracing::info!(project, count = pending.len(), "generating embeddings");

        let mut updated = 0;

        for batch in pending.chunks(self.batch_size) {
            // OpenAI-style embedding endpoints behave better without newlines.
            let inputs: Vec<String> = batch
                .iter()
                .map(|chunk| chunk.content().replace('\n', " "))
                .collect();

            let vectors = self
                .provider
                .embed_batch(&inputs)
                .await
                .map_err(|e| BackfillError::ProviderError(e.to_string()))?;

            // Reject the whole batch before any row is written; a stored
            // vector of the wrong length would be invisible to retrieval.
            let expected = self.provider.embedding_dimension();
            if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
                return Err(BackfillError::DimensionMismatch {
                    expected,
                    actual: bad.len(),
                });
            }

            for (chunk, vector) in batch.iter().zip(vectors) {
                self.repository
                    .set_embedding(chunk.id(), vector)
                    .await
                    .map_err(|e| BackfillError::StoreError(e.to_string()))?;
                updated += 1;
            }
        }

        tracing::info!(project, updated, "embedding backfill complete");

        Ok(BackfillOutcome { updated })
    }
}
