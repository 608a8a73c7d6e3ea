use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Dimensionality every stored embedding must have. Vectors of any other
/// length are treated as malformed and skipped at retrieval time.
pub const EMBEDDING_DIMENSION: usize = 1536;

/// One token-bounded slice of an ingested document. The logical key is
/// `(project, path, chunk_index)`; `id` exists so embeddings can be written
/// back to a specific row after a batch provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageChunk {
    id: Uuid,
    project: String,
    path: String,
    title: String,
    content: String,
    checksum: String,
    chunk_index: i32,
    embedding: Option<Vec<f32>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PageChunk {
    pub fn new(
        project: String,
        path: String,
        title: String,
        content: String,
        checksum: String,
        chunk_index: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            project,
            path,
            title,
            content,
            checksum,
            chunk_index,
            embedding: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a chunk from storage, keeping its persisted identity.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        project: String,
        path: String,
        title: String,
        content: String,
        checksum: String,
        chunk_index: i32,
        embedding: Option<Vec<f32>>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project,
            path,
            title,
            content,
            checksum,
            chunk_index,
            embedding,
            created_at,
            updated_at,
        }
    }

    // Getters
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn chunk_index(&self) -> i32 {
        self.chunk_index
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }

    /// True when the stored vector exists and has the expected length.
    pub fn has_well_formed_embedding(&self) -> bool {
        self.embedding
            .as_ref()
            .is_some_and(|v| v.len() == EMBEDDING_DIMENSION)
    }

    pub fn set_embedding(&mut self, embedding: Vec<f32>) {
        self.embedding = Some(embedding);
        self.updated_at = Utc::now();
    }
}
