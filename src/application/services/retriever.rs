use std::sync::Arc;

use crate::application::services::chunker::TokenChunker;
use crate::domain::repositories::PageRepository;

#[derive(Debug)]
pub enum RetrieveError {
    StoreError(String),
    /// The project has no ingested chunks at all.
    NoDocumentation,
}

impl std::fmt::Display for RetrieveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetrieveError::StoreError(msg) => write!(f, "Store error: {}", msg),
            RetrieveError::NoDocumentation => {
                write!(
                    f,
                    "No documentation found. Please upload some documentation first."
                )
            }
        }
    }
}

impl std::error::Error for RetrieveError {}

#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    pub similarity_floor: f32,
    pub max_hits: usize,
    pub max_context_tokens: usize,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            similarity_floor: 0.3,
            max_hits: 10,
            max_context_tokens: 1500,
        }
    }
}

/// Brute-force similarity search over one project's embedded chunks. The
/// index is rebuilt from a full project scan on every request; no shared
/// mutable search state survives between calls.
pub struct Retriever {
    repository: Arc<dyn PageRepository>,
    chunker: Arc<TokenChunker>,
    config: RetrieverConfig,
}

impl Retriever {
    pub fn new(repository: Arc<dyn PageRepository>, chunker: Arc<TokenChunker>) -> Self {
        Self {
            repository,
            chunker,
            config: RetrieverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RetrieverConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the assembled context string. Chunks with missing or
    /// malformed embeddings are filtered out, not errored; zero chunks
    /// passing the similarity floor yields an empty string and the caller
    /// is expected to substitute its fallback text.
    pub async fn retrieve(
        &self,
        project: &str,
        query_embedding: &[f32],
    ) -> Result<String, RetrieveError> {
        let pages = self
            .repository
            .get_by_project(project)
            .await
            .map_err(|e| RetrieveError::StoreError(e.to_string()))?;

        if pages.is_empty() {
            return Err(RetrieveError::NoDocumentation);
        }

        let embedded: Vec<_> = pages
            .iter()
            .filter(|page| page.has_well_formed_embedding())
            .collect();

        tracing::debug!(
            project,
            total = pages.len(),
            embedded = embedded.len(),
            "built ephemeral similarity index"
        );

        let mut hits: Vec<(f32, &str)> = embedded
            .iter()
            .filter_map(|page| {
                let embedding = page.embedding()?;
                let score = cosine_similarity(query_embedding, embedding);
                (score >= self.config.similarity_floor).then_some((score, page.content()))
            })
            .collect();

        // Stable sort keeps store order for equal scores.
        hits.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(self.config.max_hits);

        tracing::debug!(project, hits = hits.len(), "relevant hits above floor");

        Ok(self.assemble_context(&hits))
    }

    /// Token-budgeted concatenation of ranked hits. The running count is
    /// accumulated before the stop check, and the check also requires the
    /// context to be non-empty, so a first hit larger than the whole budget
    /// still lands in the output. Callers can rely on a non-empty result
    /// whenever at least one hit passed the floor.
    fn assemble_context(&self, hits: &[(f32, &str)]) -> String {
        let mut token_count = 0;
        let mut context_sections = String::new();

        for (_, content) in hits {
            token_count += self.chunker.count_tokens(content);

            if token_count >= self.config.max_context_tokens && !context_sections.is_empty() {
                break;
            }

            context_sections.push_str(content.trim());
            context_sections.push_str("\n---\n");
        }

        context_sections
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x64 = f64::from(x);
        let y64 = f64::from(y);
        dot += x64 * y64;
        norm_a += x64 * x64;
        norm_b += y64 * y64;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return 0.0;
    }

    (dot / denom) as f32
}
