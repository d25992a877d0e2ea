//! Google Gemini client implementation
//!
//! Generation goes through the `streamGenerateContent` endpoint in SSE mode.
//! [`AiClient::send_prompt`] drains that stream completely before returning,
//! so callers never see partial text.

use crate::middleware::ensure_success;
use crate::sse::sse_stream;
use crate::{AiClient, ApiErrorType, ClientConfig, ClientError, StreamChunk};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client for Google Gemini models
pub struct Gemini {
    /// Reqwest HTTP client used for requests
    http: Client,
    /// API key for Gemini access
    key: String,
    /// Model identifier such as `"gemini-2.5-flash-preview-05-20"`
    model: String,
    base_url: String,
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(http: Client, key: String, model: String, config: &ClientConfig) -> Self {
        Self {
            http,
            key,
            model,
            base_url: config.gemini_base_url.clone(),
        }
    }

    fn stream_url(&self) -> String {
        let model = self.model.strip_prefix("models/").unwrap_or(&self.model);
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, model
        )
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandContent {
    #[serde(default)]
    parts: Vec<CandPart>,
}

#[derive(Deserialize)]
struct CandPart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<u16>,
    message: Option<String>,
}

/// One decoded stream event
#[derive(Debug, Default, PartialEq, Eq)]
struct Chunk {
    /// Concatenated part texts; `None` when the event carried no text
    text: Option<String>,
    finish_reason: Option<String>,
}

/// Decode one SSE `data` payload
fn parse_chunk(data: &str) -> Result<Chunk, ClientError> {
    let resp: StreamResponse = serde_json::from_str(data)?;

    if let Some(error) = resp.error {
        let message = error
            .message
            .unwrap_or_else(|| "stream reported an error".to_string());
        return Err(match error.code {
            Some(code) => ClientError::from_status(code, message),
            None => ClientError::Api {
                message,
                status: None,
                error_type: ApiErrorType::Other,
            },
        });
    }

    let Some(candidate) = resp.candidates.into_iter().next() else {
        if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ClientError::Api {
                message: format!("prompt blocked: {reason}"),
                status: None,
                error_type: ApiErrorType::ContentFilter,
            });
        }
        return Ok(Chunk::default());
    };

    let text = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .filter(|text| !text.is_empty());

    Ok(Chunk {
        text,
        finish_reason: candidate.finish_reason,
    })
}

fn no_text(finish_reason: Option<&str>) -> ClientError {
    match finish_reason {
        Some(reason) => ClientError::missing_field(format!(
            "response contained no text (finishReason: {reason})"
        )),
        None => ClientError::missing_field("response contained no text"),
    }
}

impl Gemini {
    async fn open_stream(
        &self,
        prompt: &str,
    ) -> Result<BoxStream<'_, Result<Chunk, ClientError>>, ClientError> {
        let body = Request {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "text/plain",
            },
        };

        let url = self.stream_url();
        debug!(%url, model = %self.model, "opening generation stream");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let chunks = sse_stream(response).map(|event| event.and_then(|e| parse_chunk(&e.data)));
        Ok(chunks.boxed())
    }
}

#[async_trait]
impl AiClient for Gemini {
    /// Drains the whole stream before returning. The first error discards
    /// any text received so far, and a stream without text is an error.
    async fn send_prompt(&self, prompt: &str) -> Result<String, ClientError> {
        let mut chunks = self.open_stream(prompt).await?;
        let mut text: Option<String> = None;
        let mut finish_reason = None;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            if let Some(part) = chunk.text {
                text.get_or_insert_with(String::new).push_str(&part);
            }
            if chunk.finish_reason.is_some() {
                finish_reason = chunk.finish_reason;
                break;
            }
        }

        text.ok_or_else(|| no_text(finish_reason.as_deref()))
    }

    async fn stream_prompt(
        &self,
        prompt: &str,
    ) -> Result<BoxStream<'_, Result<StreamChunk, ClientError>>, ClientError> {
        let chunks = self.open_stream(prompt).await?.map(|chunk| {
            chunk.map(|c| StreamChunk {
                content: c.text.unwrap_or_default(),
                finished: c.finish_reason.is_some(),
            })
        });
        Ok(chunks.boxed())
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "Gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
