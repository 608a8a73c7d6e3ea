use std::sync::Arc;

use crate::application::ports::{
    ChatMessage, CompletionProvider, CompletionSource, EmbeddingProvider, ModerationProvider,
};
use crate::application::services::retriever::{RetrieveError, Retriever};

/// Substituted when retrieval produces no context at all, so the model still
/// receives a grounded (if minimal) system prompt.
const FALLBACK_CONTEXT: &str =
    "The documentation for this project has no sections matching the question yet.";

const PROMPT_TEMPLATE: &str = "You are a documentation assistant for a personal portfolio site. \
Answer questions using only the documentation provided in the context sections below. \
Use a friendly, concise tone and format answers in markdown. \
If the context does not contain the answer, say that the documentation does not cover it \
and suggest a related topic from the context instead of guessing. \
Never invent details that are not in the context sections.\n\n\
Context sections:\n";

#[derive(Debug)]
pub enum AnswerError {
    /// Moderation flagged the question; a user-facing rejection, not a
    /// server fault.
    PolicyRejection,
    ProviderError(String),
    StoreError(String),
    NoDocumentation(String),
}

impl std::fmt::Display for AnswerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerError::PolicyRejection => {
                write!(f, "Question input didn't meet the moderation criteria.")
            }
            AnswerError::ProviderError(msg) => write!(f, "Provider error: {}", msg),
            AnswerError::StoreError(msg) => write!(f, "Store error: {}", msg),
            AnswerError::NoDocumentation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AnswerError {}

/// Turns a natural-language question into a grounded completion: moderate,
/// embed, retrieve, fill the prompt template, ask the model.
pub struct AnswerService {
    moderation: Arc<dyn ModerationProvider>,
    embeddings: Arc<dyn EmbeddingProvider>,
    completions: Arc<dyn CompletionProvider>,
    retriever: Arc<Retriever>,
}

impl AnswerService {
    pub fn new(
        moderation: Arc<dyn ModerationProvider>,
        embeddings: Arc<dyn EmbeddingProvider>,
        completions: Arc<dyn CompletionProvider>,
        retriever: Arc<Retriever>,
    ) -> Self {
        Self {
            moderation,
            embeddings,
            completions,
            retriever,
        }
    }

    pub async fn ask(
        &self,
        question: &str,
        project: &str,
        stream: bool,
    ) -> Result<CompletionSource, AnswerError> {
        let question = question.trim();

        let verdict = self
            .moderation
            .moderate(question)
            .await
            .map_err(|e| AnswerError::ProviderError(e.to_string()))?;

        if verdict.flagged {
            tracing::warn!(
                categories = ?verdict.categories,
                "question rejected by moderation"
            );
            return Err(AnswerError::PolicyRejection);
        }

        let query_embedding = self
            .embeddings
            .embed(&question.replace('\n', " "))
            .await
            .map_err(|e| AnswerError::ProviderError(e.to_string()))?;

        let context_sections = match self.retriever.retrieve(project, &query_embedding).await {
            Ok(context) => context,
            Err(RetrieveError::NoDocumentation) => {
                return Err(AnswerError::NoDocumentation(
                    RetrieveError::NoDocumentation.to_string(),
                ));
            }
            Err(e) => return Err(AnswerError::StoreError(e.to_string())),
        };

        let context_sections = if context_sections.trim().is_empty() {
            FALLBACK_CONTEXT.to_string()
        } else {
            context_sections
        };

        let prompt = format!("{}{}", PROMPT_TEMPLATE, context_sections);

        let messages = vec![
            ChatMessage::system(prompt),
            ChatMessage::user(question.to_string()),
        ];

        self.completions
            .complete(messages, stream)
            .await
            .map_err(|e| AnswerError::ProviderError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::chunker::TokenChunker;
    use crate::application::services::test_support::{
        InMemoryPageRepository, MockCompletionProvider, MockEmbeddingProvider,
        MockModerationProvider,
    };
    use crate::domain::entities::{EMBEDDING_DIMENSION, PageChunk};

    fn embedded_chunk(content: &str) -> PageChunk {
        let mut chunk = PageChunk::new(
            "portfolio".to_string(),
            "/a".to_string(),
            "Title".to_string(),
            content.to_string(),
            "checksum".to_string(),
            0,
        );
        // Matches MockEmbeddingProvider::vector_for for any question text,
        // direction-wise: only the first component is non-zero.
        let mut vector = vec![0.0; EMBEDDING_DIMENSION];
        vector[0] = 1.0;
        chunk.set_embedding(vector);
        chunk
    }

    fn answer_service(
        repository: Arc<InMemoryPageRepository>,
        flagged: bool,
        completions: Arc<MockCompletionProvider>,
    ) -> AnswerService {
        let retriever = Arc::new(Retriever::new(
            repository,
            Arc::new(TokenChunker::new().unwrap()),
        ));
        AnswerService::new(
            Arc::new(MockModerationProvider { flagged }),
            Arc::new(MockEmbeddingProvider::new()),
            completions,
            retriever,
        )
    }

    #[tokio::test]
    async fn test_context_reaches_the_prompt() {
        let repository = Arc::new(InMemoryPageRepository::new());
        repository.insert_directly(embedded_chunk("Phil built a self-hosted RAG backend."));

        let completions = Arc::new(MockCompletionProvider::new());
        let service = answer_service(repository, false, completions);

        let source = service
            .ask("What did Phil build?", "portfolio", false)
            .await
            .unwrap();

        match source {
            CompletionSource::Buffered(prompt) => {
                assert!(prompt.contains("Phil built a self-hosted RAG backend."));
            }
            CompletionSource::Streamed(_) => panic!("expected buffered completion"),
        }
    }

    #[tokio::test]
    async fn test_flagged_question_is_policy_rejection() {
        let repository = Arc::new(InMemoryPageRepository::new());
        repository.insert_directly(embedded_chunk("anything"));

        let completions = Arc::new(MockCompletionProvider::new());
        let service = answer_service(repository, true, completions.clone());

        let result = service.ask("bad question", "portfolio", false).await;
        assert!(matches!(result, Err(AnswerError::PolicyRejection)));
        assert!(completions.last_messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_context_substitutes_fallback() {
        let repository = Arc::new(InMemoryPageRepository::new());
        // A chunk with no embedding: retrieval succeeds with empty context.
        repository.insert_directly(PageChunk::new(
            "portfolio".to_string(),
            "/a".to_string(),
            "Title".to_string(),
            "not embedded yet".to_string(),
            "checksum".to_string(),
            0,
        ));

        let completions = Arc::new(MockCompletionProvider::new());
        let service = answer_service(repository, false, completions);

        let source = service.ask("anything?", "portfolio", false).await.unwrap();
        match source {
            CompletionSource::Buffered(prompt) => {
                assert!(prompt.contains(FALLBACK_CONTEXT));
            }
            CompletionSource::Streamed(_) => panic!("expected buffered completion"),
        }
    }

    #[tokio::test]
    async fn test_empty_store_is_a_descriptive_error() {
        let repository = Arc::new(InMemoryPageRepository::new());
        let completions = Arc::new(MockCompletionProvider::new());
        let service = answer_service(repository, false, completions);

        let result = service.ask("anything?", "portfolio", false).await;
        match result {
            Err(AnswerError::NoDocumentation(msg)) => {
                assert!(msg.contains("No documentation found"));
            }
            other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
        }
    }
}
