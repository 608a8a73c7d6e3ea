use std::sync::Arc;

use axum::{Json, extract::State};

use crate::application::services::{EmbeddingBackfill, IngestionService};
use crate::presentation::http::dto::{UploadRequestDto, UploadResponseDto};
use crate::presentation::http::errors::ApiError;

const DEFAULT_PROJECT: &str = "default";

pub struct UploadHandler {
    ingestion_service: Arc<IngestionService>,
    embedding_backfill: Arc<EmbeddingBackfill>,
}

impl UploadHandler {
    pub fn new(
        ingestion_service: Arc<IngestionService>,
        embedding_backfill: Arc<EmbeddingBackfill>,
    ) -> Self {
        Self {
            ingestion_service,
            embedding_backfill,
        }
    }

    /// `POST /upload` — `add`, `delete`, `clean`, and `generate` operations
    /// over the page store. Everything else is rejected as unsupported.
    pub async fn upload(
        State(handler): State<Arc<UploadHandler>>,
        Json(request): Json<UploadRequestDto>,
    ) -> Result<Json<UploadResponseDto>, ApiError> {
        let operation = request.operation.as_deref().unwrap_or_default();
        let project = request.project.as_deref().unwrap_or(DEFAULT_PROJECT);

        match operation {
            "clean" => {
                let deleted = handler.ingestion_service.clean_project(project).await?;
                tracing::info!(project, deleted, "project cleaned");
            }
            "generate" => {
                handler.embedding_backfill.backfill(project).await?;
            }
            "add" | "delete" => {
                let path = request
                    .path
                    .as_deref()
                    .ok_or_else(|| ApiError::BadRequest("Missing param `path`".to_string()))?;

                tracing::info!(operation, project, path, "upload operation");

                if operation == "delete" {
                    handler.ingestion_service.delete_page(project, path).await?;
                } else {
                    let title = request.title.as_deref().unwrap_or_default();
                    let content = request.content.as_deref().unwrap_or_default();
                    handler
                        .ingestion_service
                        .ingest(project, path, title, content)
                        .await?;
                }
            }
            unsupported => {
                return Err(ApiError::BadRequest(format!(
                    "Operation {} is not supported",
                    unsupported
                )));
            }
        }

        Ok(Json(UploadResponseDto::success()))
    }
}
