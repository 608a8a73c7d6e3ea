use std::collections::VecDeque;
use std::env;
use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt, stream};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    ChatMessage, CompletionProvider, CompletionProviderError, CompletionSource, CompletionStream,
};

const BUFFERED_EMPTY_FALLBACK: &str = "Sorry, I couldn't generate a response at this time.";

#[derive(Debug, Clone)]
pub struct XaiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl XaiConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("XAI_API_KEY")
            .map_err(|_| "Missing environment variable XAI_API_KEY".to_string())?;

        let api_base =
            env::var("XAI_API_BASE").unwrap_or_else(|_| "https://api.x.ai/v1".to_string());

        Ok(Self {
            api_key,
            api_base,
            model: "grok-3-mini".to_string(),
            max_tokens: 512,
            temperature: 0.4,
        })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamFrame {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, PartialEq)]
enum SseLine {
    Delta(String),
    Done,
    Ignore,
}

/// One line of an SSE chat-completion stream. Unparseable data lines are
/// skipped, not errored.
fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.trim().strip_prefix("data: ") else {
        return SseLine::Ignore;
    };

    if data == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<StreamFrame>(data) {
        Ok(frame) => frame
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .map(SseLine::Delta)
            .unwrap_or(SseLine::Ignore),
        Err(_) => SseLine::Ignore,
    }
}

struct SseStreamState {
    bytes: Pin<Box<dyn Stream<Item = reqwest::Result<bytes::Bytes>> + Send>>,
    buffer: String,
    pending: VecDeque<String>,
    finished: bool,
}

/// Turns the provider's raw byte stream into a stream of content deltas,
/// ending at the `[DONE]` sentinel or the end of the body. A transport error
/// mid-stream surfaces as one terminal `Err` item.
fn delta_stream(
    response: reqwest::Response,
) -> impl Stream<Item = Result<String, CompletionProviderError>> + Send {
    let state = SseStreamState {
        bytes: Box::pin(response.bytes_stream()),
        buffer: String::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(delta) = state.pending.pop_front() {
                return Some((Ok(delta), state));
            }

            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.push_str(&String::from_utf8_lossy(&chunk));

                    while let Some(newline) = state.buffer.find('\n') {
                        let line: String = state.buffer.drain(..=newline).collect();
                        match parse_sse_line(&line) {
                            SseLine::Delta(content) => state.pending.push_back(content),
                            SseLine::Done => {
                                state.finished = true;
                                break;
                            }
                            SseLine::Ignore => {}
                        }
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    state.pending.clear();
                    return Some((
                        Err(CompletionProviderError::NetworkError(e.to_string())),
                        state,
                    ));
                }
                None => {
                    state.finished = true;
                }
            }
        }
    })
}

/// xAI chat-completion client. Streamed mode forwards provider deltas as
/// they arrive; buffered mode returns the whole completion text.
pub struct XaiClient {
    client: Client,
    config: XaiConfig,
}

impl XaiClient {
    pub fn new(config: XaiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, String> {
        let config = XaiConfig::from_env()?;
        Self::new(config).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl CompletionProvider for XaiClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        stream: bool,
    ) -> Result<CompletionSource, CompletionProviderError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: &messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            stream,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        if stream {
            return Ok(CompletionSource::Streamed(CompletionStream::new(
                delta_stream(response),
            )));
        }

        let parsed = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| CompletionProviderError::InvalidResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                CompletionProviderError::InvalidResponse("no choices in completion".into())
            })?
            .message
            .content
            .unwrap_or_else(|| BUFFERED_EMPTY_FALLBACK.to_string());

        Ok(CompletionSource::Buffered(content))
    }
}
