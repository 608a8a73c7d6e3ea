pub mod completion_provider;
pub mod embedding_provider;
pub mod moderation_provider;

pub use completion_provider::{
    ChatMessage, CompletionProvider, CompletionProviderError, CompletionSource, CompletionStream,
};
pub use embedding_provider::{EmbeddingProvider, EmbeddingProviderError};
pub use moderation_provider::{ModerationProvider, ModerationProviderError, ModerationVerdict};
