use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::Stream;

#[derive(Debug)]
pub enum CompletionProviderError {
    NetworkError(String),
    ApiError { status: u16, message: String },
    InvalidResponse(String),
}

impl std::fmt::Display for CompletionProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionProviderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            CompletionProviderError::ApiError { status, message } => {
                write!(f, "Completion API error ({}): {}", status, message)
            }
            CompletionProviderError::InvalidResponse(msg) => {
                write!(f, "Invalid completion response: {}", msg)
            }
        }
    }
}

impl std::error::Error for CompletionProviderError {}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: String) -> Self {
        Self {
            role: "system".to_string(),
            content,
        }
    }

    pub fn user(content: String) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

/// Lazy, finite, non-restartable sequence of completion content deltas.
/// The stream ends on the provider's terminal sentinel; a provider-side
/// failure surfaces as one terminal `Err` item.
pub struct CompletionStream {
    inner: Pin<Box<dyn Stream<Item = Result<String, CompletionProviderError>> + Send>>,
}

impl CompletionStream {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<String, CompletionProviderError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for CompletionStream {
    type Item = Result<String, CompletionProviderError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Unifies the provider's streamed and buffered response shapes so the
/// answer orchestrator stays variant-agnostic.
pub enum CompletionSource {
    Streamed(CompletionStream),
    Buffered(String),
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        stream: bool,
    ) -> Result<CompletionSource, CompletionProviderError>;
}
