use async_trait::async_trait;

#[derive(Debug)]
pub enum ModerationProviderError {
    NetworkError(String),
    ApiError { status: u16, message: String },
    InvalidResponse(String),
}

impl std::fmt::Display for ModerationProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModerationProviderError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ModerationProviderError::ApiError { status, message } => {
                write!(f, "Moderation API error ({}): {}", status, message)
            }
            ModerationProviderError::InvalidResponse(msg) => {
                write!(f, "Invalid moderation response: {}", msg)
            }
        }
    }
}

impl std::error::Error for ModerationProviderError {}

#[derive(Debug, Clone)]
pub struct ModerationVerdict {
    pub flagged: bool,
    pub categories: Vec<String>,
}

#[async_trait]
pub trait ModerationProvider: Send + Sync {
    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, ModerationProviderError>;
}
