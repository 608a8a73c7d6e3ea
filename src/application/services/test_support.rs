use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::{
    ChatMessage, CompletionProvider, CompletionProviderError, CompletionSource, EmbeddingProvider,
    EmbeddingProviderError, ModerationProvider, ModerationProviderError, ModerationVerdict,
};
use crate::domain::entities::{EMBEDDING_DIMENSION, PageChunk};
use crate::domain::repositories::{PageRepository, PageRepositoryError};

/// Vec-backed stand-in for the Postgres repository, preserving its ordering
/// semantics so service tests exercise the same contracts.
pub struct InMemoryPageRepository {
    rows: Mutex<Vec<PageChunk>>,
}

impl InMemoryPageRepository {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn insert_directly(&self, chunk: PageChunk) {
        self.rows.lock().unwrap().push(chunk);
    }

    fn sorted_by_path_then_index(mut rows: Vec<PageChunk>) -> Vec<PageChunk> {
        rows.sort_by(|a, b| {
            a.path()
                .cmp(b.path())
                .then(a.chunk_index().cmp(&b.chunk_index()))
        });
        rows
    }
}

#[async_trait]
impl PageRepository for InMemoryPageRepository {
    async fn upsert(&self, chunk: &PageChunk) -> Result<(), PageRepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|row| {
            !(row.project() == chunk.project()
                && row.path() == chunk.path()
                && row.chunk_index() == chunk.chunk_index())
        });
        rows.push(chunk.clone());
        Ok(())
    }

    async fn get_by_project(&self, project: &str) -> Result<Vec<PageChunk>, PageRepositoryError> {
        let rows = self.rows.lock().unwrap();
        let matching = rows
            .iter()
            .filter(|row| row.project() == project)
            .cloned()
            .collect();
        Ok(Self::sorted_by_path_then_index(matching))
    }

    async fn get_by_path(
        &self,
        project: &str,
        path: &str,
    ) -> Result<Vec<PageChunk>, PageRepositoryError> {
        let rows = self.rows.lock().unwrap();
        let mut matching: Vec<PageChunk> = rows
            .iter()
            .filter(|row| row.project() == project && row.path() == path)
            .cloned()
            .collect();
        matching.sort_by_key(|row| row.chunk_index());
        Ok(matching)
    }

    async fn delete_by_project(&self, project: &str) -> Result<usize, PageRepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.project() != project);
        Ok(before - rows.len())
    }

    async fn delete_by_path(
        &self,
        project: &str,
        path: &str,
    ) -> Result<usize, PageRepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| !(row.project() == project && row.path() == path));
        Ok(before - rows.len())
    }

    async fn get_without_embedding(
        &self,
        project: &str,
    ) -> Result<Vec<PageChunk>, PageRepositoryError> {
        let rows = self.rows.lock().unwrap();
        let matching = rows
            .iter()
            .filter(|row| row.project() == project && !row.has_embedding())
            .cloned()
            .collect();
        Ok(Self::sorted_by_path_then_index(matching))
    }

    async fn set_embedding(
        &self,
        chunk_id: Uuid,
        embedding: Vec<f32>,
    ) -> Result<(), PageRepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.id() == chunk_id) {
            Some(row) => {
                row.set_embedding(embedding);
                Ok(())
            }
            None => Err(PageRepositoryError::NotFound(chunk_id)),
        }
    }
}

/// Deterministic embedding provider: vector values encode the input length
/// so tests can verify request/response order was preserved. The dimension
/// of returned vectors can be overridden to simulate a misconfigured model.
pub struct MockEmbeddingProvider {
    pub calls: AtomicUsize,
    pub fail: bool,
    pub returned_dimension: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
            returned_dimension: EMBEDDING_DIMENSION,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_returned_dimension(returned_dimension: usize) -> Self {
        Self {
            returned_dimension,
            ..Self::new()
        }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.returned_dimension];
        if let Some(first) = vector.first_mut() {
            *first = text.len() as f32;
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingProviderError::ApiError {
                status: 500,
                message: "mock failure".to_string(),
            });
        }
        Ok(self.vector_for(text))
    }

    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbeddingProviderError::ApiError {
                status: 500,
                message: "mock failure".to_string(),
            });
        }
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn embedding_dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}

pub struct MockModerationProvider {
    pub flagged: bool,
}

#[async_trait]
impl ModerationProvider for MockModerationProvider {
    async fn moderate(&self, _text: &str) -> Result<ModerationVerdict, ModerationProviderError> {
        Ok(ModerationVerdict {
            flagged: self.flagged,
            categories: if self.flagged {
                vec!["violence".to_string()]
            } else {
                Vec::new()
            },
        })
    }
}

/// Echoes the system prompt back so tests can inspect what the orchestrator
/// actually sent to the model.
pub struct MockCompletionProvider {
    pub last_messages: Mutex<Vec<ChatMessage>>,
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self {
            last_messages: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _stream: bool,
    ) -> Result<CompletionSource, CompletionProviderError> {
        let system_prompt = messages
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        *self.last_messages.lock().unwrap() = messages;
        Ok(CompletionSource::Buffered(system_prompt))
    }
}
