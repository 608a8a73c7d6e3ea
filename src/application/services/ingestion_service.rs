use std::sync::Arc;

use crate::application::services::chunker::TokenChunker;
use crate::domain::entities::PageChunk;
use crate::domain::repositories::PageRepository;
use crate::domain::value_objects::DocumentChecksum;

/// Chunk budget matching the embedding model's input window.
pub const MAX_TOKENS_PER_CHUNK: usize = 8191;

#[derive(Debug)]
pub enum IngestionError {
    StoreError(String),
    ChunkerError(String),
}

impl std::fmt::Display for IngestionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestionError::StoreError(msg) => write!(f, "Store error: {}", msg),
            IngestionError::ChunkerError(msg) => write!(f, "Chunker error: {}", msg),
        }
    }
}

impl std::error::Error for IngestionError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Fresh chunk set written for this document.
    Ingested { chunks: usize },
    /// Stored checksum matched; nothing was touched.
    Unchanged,
}

/// Decides whether a page needs (re)chunking by comparing the whole-document
/// checksum against what is stored, and replaces the chunk set when it does.
/// Concurrent ingestions of the same `(project, path)` are not serialized;
/// interleaved delete/insert pairs can leave duplicate chunk sets.
pub struct IngestionService {
    repository: Arc<dyn PageRepository>,
    chunker: Arc<TokenChunker>,
    max_tokens_per_chunk: usize,
}

impl IngestionService {
    pub fn new(repository: Arc<dyn PageRepository>, chunker: Arc<TokenChunker>) -> Self {
        Self {
            repository,
            chunker,
            max_tokens_per_chunk: MAX_TOKENS_PER_CHUNK,
        }
    }

    pub fn with_max_tokens_per_chunk(mut self, max_tokens_per_chunk: usize) -> Self {
        self.max_tokens_per_chunk = max_tokens_per_chunk;
        self
    }

    pub async fn ingest(
        &self,
        project: &str,
        path: &str,
        title: &str,
        content: &str,
    ) -> Result<IngestOutcome, IngestionError> {
        let checksum = DocumentChecksum::from_content(content);

        let existing = self
            .repository
            .get_by_path(project, path)
            .await
            .map_err(|e| IngestionError::StoreError(e.to_string()))?;

        if let Some(first) = existing.first() {
            if checksum.matches(first.checksum()) {
                tracing::info!(project, path, "content unchanged, skipping re-ingestion");
                return Ok(IngestOutcome::Unchanged);
            }

            self.repository
                .delete_by_path(project, path)
                .await
                .map_err(|e| IngestionError::StoreError(e.to_string()))?;
        }

        let pieces = self
            .chunker
            .chunk(content, self.max_tokens_per_chunk)
            .map_err(|e| IngestionError::ChunkerError(e.to_string()))?;

        for (index, piece) in pieces.iter().enumerate() {
            let chunk = PageChunk::new(
                project.to_string(),
                path.to_string(),
                title.to_string(),
                piece.clone(),
                checksum.as_str().to_string(),
                index as i32,
            );

            self.repository
                .upsert(&chunk)
                .await
                .map_err(|e| IngestionError::StoreError(e.to_string()))?;
        }

        tracing::info!(project, path, chunks = pieces.len(), "page ingested");

        Ok(IngestOutcome::Ingested {
            chunks: pieces.len(),
        })
    }

    /// Remove one document's chunks without re-ingesting.
    pub async fn delete_page(&self, project: &str, path: &str) -> Result<usize, IngestionError> {
        self.repository
            .delete_by_path(project, path)
            .await
            .map_err(|e| IngestionError::StoreError(e.to_string()))
    }

    /// Remove every chunk stored for a project.
    pub async fn clean_project(&self, project: &str) -> Result<usize, IngestionError> {
        self.repository
            .delete_by_project(project)
            .await
            .map_err(|e| IngestionError::StoreError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::InMemoryPageRepository;

    fn service(repository: Arc<InMemoryPageRepository>) -> IngestionService {
        IngestionService::new(repository, Arc::new(TokenChunker::new().unwrap()))
    }

    #[tokio::test]
    async fn test_single_small_document_is_one_chunk() {
        let repository = Arc::new(InMemoryPageRepository::new());
        let ingestion = service(repository.clone());

        let outcome = ingestion
            .ingest("p", "/a", "Title", "# Title\nHello world")
            .await
            .unwrap();

        assert_eq!(outcome, IngestOutcome::Ingested { chunks: 1 });

        let stored = repository.get_by_path("p", "/a").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].chunk_index(), 0);
        assert_eq!(stored[0].title(), "Title");
        assert_eq!(stored[0].content(), "# Title\nHello world");
        assert!(!stored[0].has_embedding());
    }

    #[tokio::test]
    async fn test_reingesting_unchanged_content_is_a_noop() {
        let repository = Arc::new(InMemoryPageRepository::new());
        let ingestion = service(repository.clone());

        ingestion
            .ingest("p", "/a", "Title", "stable content")
            .await
            .unwrap();
        let before = repository.get_by_path("p", "/a").await.unwrap();

        let outcome = ingestion
            .ingest("p", "/a", "Title", "stable content")
            .await
            .unwrap();

        assert_eq!(outcome, IngestOutcome::Unchanged);
        let after = repository.get_by_path("p", "/a").await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_changed_content_replaces_old_chunks() {
        let repository = Arc::new(InMemoryPageRepository::new());
        let ingestion = service(repository.clone());

        ingestion
            .ingest("p", "/a", "Title", "the first version of this page")
            .await
            .unwrap();
        ingestion
            .ingest("p", "/a", "Title", "a different second version")
            .await
            .unwrap();

        let stored = repository.get_by_path("p", "/a").await.unwrap();
        let combined: String = stored.iter().map(|c| c.content()).collect();
        assert_eq!(combined, "a different second version");

        let expected = DocumentChecksum::from_content("a different second version");
        for chunk in &stored {
            assert!(expected.matches(chunk.checksum()));
        }
    }

    #[tokio::test]
    async fn test_all_chunks_share_checksum_and_fresh_indexes() {
        let repository = Arc::new(InMemoryPageRepository::new());
        let ingestion =
            service(repository.clone()).with_max_tokens_per_chunk(4);

        let content = "one two three four five six seven eight nine ten";
        ingestion.ingest("p", "/long", "Long", content).await.unwrap();

        let stored = repository.get_by_path("p", "/long").await.unwrap();
        assert!(stored.len() > 1);

        let checksum = DocumentChecksum::from_content(content);
        for (i, chunk) in stored.iter().enumerate() {
            assert_eq!(chunk.chunk_index(), i as i32);
            assert!(checksum.matches(chunk.checksum()));
            assert_eq!(chunk.title(), "Long");
        }
    }

    #[tokio::test]
    async fn test_deleting_missing_page_returns_zero() {
        let repository = Arc::new(InMemoryPageRepository::new());
        let ingestion = service(repository);

        let deleted = ingestion.delete_page("p", "/a").await.unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn test_clean_project_removes_all_paths() {
        let repository = Arc::new(InMemoryPageRepository::new());
        let ingestion = service(repository.clone());

        ingestion.ingest("p", "/a", "A", "alpha").await.unwrap();
        ingestion.ingest("p", "/b", "B", "beta").await.unwrap();
        ingestion.ingest("q", "/c", "C", "gamma").await.unwrap();

        let deleted = ingestion.clean_project("p").await.unwrap();
        assert_eq!(deleted, 2);

        assert!(repository.get_by_project("p").await.unwrap().is_empty());
        assert_eq!(repository.get_by_project("q").await.unwrap().len(), 1);
    }
}
