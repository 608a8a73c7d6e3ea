use async_trait::async_trait;

#[derive(Debug)]
pub enum EmbeddingProviderError {
    NetworkError(String),
    ApiError { status: u16, message: String },
    InvalidResponse(String),
}

impl std::fmt::Display for EmbeddingProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProviderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            EmbeddingProviderError::ApiError { status, message } => {
                write!(f, "Embedding API error ({}): {}", status, message)
            }
            EmbeddingProviderError::InvalidResponse(msg) => {
                write!(f, "Invalid embedding response: {}", msg)
            }
        }
    }
}

impl std::error::Error for EmbeddingProviderError {}

/// External embedding service. Batch responses must come back in the same
/// order the inputs were submitted; the backfill relies on that.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError>;

    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError>;

    fn embedding_dimension(&self) -> usize;
}
