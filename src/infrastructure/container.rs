use std::sync::Arc;

use crate::{
    application::{
        ports::{CompletionProvider, EmbeddingProvider, ModerationProvider},
        services::{
            AnswerService, EmbeddingBackfill, IngestionService, Retriever, TokenChunker,
        },
    },
    domain::repositories::PageRepository,
    infrastructure::{
        database::{create_connection_pool, get_connection_from_pool, run_migrations},
        external_services::{OpenAiClient, XaiClient},
        repositories::PostgresPageRepository,
    },
    presentation::http::handlers::{AskHandler, UploadHandler},
};

/// Builds the full object graph: pool and migrations, repository, provider
/// clients, services, and HTTP handlers. Every component receives its store
/// handle explicitly; nothing reaches for a global connection.
pub struct AppContainer {
    pub page_repository: Arc<dyn PageRepository>,

    pub embedding_provider: Arc<dyn EmbeddingProvider>,
    pub moderation_provider: Arc<dyn ModerationProvider>,
    pub completion_provider: Arc<dyn CompletionProvider>,

    pub ingestion_service: Arc<IngestionService>,
    pub embedding_backfill: Arc<EmbeddingBackfill>,
    pub retriever: Arc<Retriever>,
    pub answer_service: Arc<AnswerService>,

    pub ask_handler: Arc<AskHandler>,
    pub upload_handler: Arc<UploadHandler>,
}

impl AppContainer {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let db_pool = create_connection_pool()?;
        let mut conn = get_connection_from_pool(&db_pool)?;
        run_migrations(&mut conn)?;

        let page_repository: Arc<dyn PageRepository> =
            Arc::new(PostgresPageRepository::new(db_pool));

        let openai = Arc::new(OpenAiClient::from_env()?);
        let embedding_provider: Arc<dyn EmbeddingProvider> = openai.clone();
        let moderation_provider: Arc<dyn ModerationProvider> = openai;
        let completion_provider: Arc<dyn CompletionProvider> = Arc::new(XaiClient::from_env()?);

        let chunker = Arc::new(TokenChunker::new()?);

        let ingestion_service = Arc::new(IngestionService::new(
            page_repository.clone(),
            chunker.clone(),
        ));

        let embedding_backfill = Arc::new(EmbeddingBackfill::new(
            page_repository.clone(),
            embedding_provider.clone(),
        ));

        let retriever = Arc::new(Retriever::new(page_repository.clone(), chunker));

        let answer_service = Arc::new(AnswerService::new(
            moderation_provider.clone(),
            embedding_provider.clone(),
            completion_provider.clone(),
            retriever.clone(),
        ));

        let ask_handler = Arc::new(AskHandler::new(answer_service.clone()));
        let upload_handler = Arc::new(UploadHandler::new(
            ingestion_service.clone(),
            embedding_backfill.clone(),
        ));

        Ok(Self {
            page_repository,
            embedding_provider,
            moderation_provider,
            completion_provider,
            ingestion_service,
            embedding_backfill,
            retriever,
            answer_service,
            ask_handler,
            upload_handler,
        })
    }
}
