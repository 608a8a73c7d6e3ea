use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use futures::StreamExt;

use crate::application::ports::CompletionSource;
use crate::application::services::AnswerService;
use crate::presentation::http::dto::AskRequestDto;
use crate::presentation::http::errors::ApiError;

const DEFAULT_PROJECT: &str = "portfolio";

pub struct AskHandler {
    answer_service: Arc<AnswerService>,
}

impl AskHandler {
    pub fn new(answer_service: Arc<AnswerService>) -> Self {
        Self { answer_service }
    }

    /// `POST /ask` — plain-text answer, chunked when the provider streams.
    /// A provider error mid-stream terminates the body as a stream error;
    /// output is never silently truncated into a clean close.
    pub async fn ask(
        State(handler): State<Arc<AskHandler>>,
        Json(request): Json<AskRequestDto>,
    ) -> Result<Response, ApiError> {
        let question = request
            .question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing param `question`".to_string()))?;

        let project = request.project.as_deref().unwrap_or(DEFAULT_PROJECT);
        let stream = request.stream.unwrap_or(false);

        tracing::info!(project, stream, "question received");

        let source = handler
            .answer_service
            .ask(question, project, stream)
            .await?;

        let response = match source {
            CompletionSource::Buffered(text) => (
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                text,
            )
                .into_response(),
            CompletionSource::Streamed(deltas) => {
                let body = Body::from_stream(deltas.map(|item| item.map(bytes::Bytes::from)));
                (
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    body,
                )
                    .into_response()
            }
        };

        Ok(response)
    }
}
