use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::PageChunk;

#[derive(Debug)]
pub enum PageRepositoryError {
    DatabaseError(String),
    NotFound(Uuid),
}

impl std::fmt::Display for PageRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageRepositoryError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            PageRepositoryError::NotFound(id) => write!(f, "Page chunk not found: {}", id),
        }
    }
}

impl std::error::Error for PageRepositoryError {}

/// Keyed store over [`PageChunk`] rows. The uniqueness key is
/// `(project, path, chunk_index)`; no multi-row transactional guarantee is
/// provided across calls.
#[async_trait]
pub trait PageRepository: Send + Sync {
    /// Insert or replace by the `(project, path, chunk_index)` key.
    async fn upsert(&self, chunk: &PageChunk) -> Result<(), PageRepositoryError>;

    /// All chunks of a project, ordered by path then chunk_index.
    async fn get_by_project(&self, project: &str) -> Result<Vec<PageChunk>, PageRepositoryError>;

    /// All chunks of one document, ordered by chunk_index.
    async fn get_by_path(
        &self,
        project: &str,
        path: &str,
    ) -> Result<Vec<PageChunk>, PageRepositoryError>;

    /// Remove every chunk of a project, returning the deleted row count.
    async fn delete_by_project(&self, project: &str) -> Result<usize, PageRepositoryError>;

    /// Remove every chunk of one document, returning the deleted row count.
    async fn delete_by_path(
        &self,
        project: &str,
        path: &str,
    ) -> Result<usize, PageRepositoryError>;

    /// Chunks still awaiting an embedding, ordered by path then chunk_index.
    async fn get_without_embedding(
        &self,
        project: &str,
    ) -> Result<Vec<PageChunk>, PageRepositoryError>;

    /// Write a vector back to one chunk and bump its `updated_at`.
    async fn set_embedding(
        &self,
        chunk_id: Uuid,
        embedding: Vec<f32>,
    ) -> Result<(), PageRepositoryError>;
}
