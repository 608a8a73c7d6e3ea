use std::collections::HashMap;
use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    EmbeddingProvider, EmbeddingProviderError, ModerationProvider, ModerationProviderError,
    ModerationVerdict,
};
use crate::domain::entities::EMBEDDING_DIMENSION;

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_base: String,
    pub embedding_model: String,
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| "Missing environment variable OPENAI_API_KEY".to_string())?;

        let api_base = env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        Ok(Self {
            api_key,
            api_base,
            embedding_model: "text-embedding-ada-002".to_string(),
            timeout_secs: 30,
        })
    }
}

#[derive(Serialize)]
struct EmbeddingsApiRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsApiResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ModerationsApiRequest<'a> {
    input: &'a str,
}

#[derive(Deserialize)]
struct ModerationsApiResponse {
    results: Vec<ModerationResult>,
}

#[derive(Deserialize)]
struct ModerationResult {
    flagged: bool,
    #[serde(default)]
    categories: HashMap<String, bool>,
}

/// OpenAI-compatible HTTP client covering the embeddings and moderations
/// endpoints. Upstream failures carry the HTTP status and body; nothing is
/// retried here.
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, String> {
        let config = OpenAiConfig::from_env()?;
        Self::new(config).map_err(|e| e.to_string())
    }

    async fn request_embeddings(
        &self,
        input: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        let request = EmbeddingsApiRequest {
            model: &self.config.embedding_model,
            input,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed = response
            .json::<EmbeddingsApiResponse>()
            .await
            .map_err(|e| EmbeddingProviderError::InvalidResponse(e.to_string()))?;

        if parsed.data.len() != input.len() {
            return Err(EmbeddingProviderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                input.len(),
                parsed.data.len()
            )));
        }

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingProviderError> {
        let input = vec![text.to_string()];
        let mut vectors = self.request_embeddings(&input).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingProviderError::InvalidResponse("no embeddings returned".into()))
    }

    async fn embed_batch(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingProviderError> {
        self.request_embeddings(texts).await
    }

    fn embedding_dimension(&self) -> usize {
        EMBEDDING_DIMENSION
    }
}

#[async_trait]
impl ModerationProvider for OpenAiClient {
    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, ModerationProviderError> {
        let request = ModerationsApiRequest { input: text };

        let response = self
            .client
            .post(format!("{}/moderations", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModerationProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModerationProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed = response
            .json::<ModerationsApiResponse>()
            .await
            .map_err(|e| ModerationProviderError::InvalidResponse(e.to_string()))?;

        let result = parsed.results.into_iter().next().ok_or_else(|| {
            ModerationProviderError::InvalidResponse("empty moderation results".into())
        })?;

        let categories = result
            .categories
            .into_iter()
            .filter_map(|(name, flagged)| flagged.then_some(name))
            .collect();

        Ok(ModerationVerdict {
            flagged: result.flagged,
            categories,
        })
    }
}
