//! Anthropic Claude client implementation

use crate::middleware::ensure_success;
use crate::{AiClient, ClientConfig, ClientError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for Anthropic's Claude models
pub struct Claude {
    /// Reqwest HTTP client used for requests
    http: Client,
    /// API key for Anthropic
    key: String,
    /// Name of the Claude model to invoke
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl Claude {
    /// Create a new Claude client
    pub fn new(http: Client, key: String, model: String, config: &ClientConfig) -> Self {
        Self {
            http,
            key,
            model,
            base_url: config.anthropic_base_url.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl AiClient for Claude {
    async fn send_prompt(&self, prompt: &str) -> Result<String, ClientError> {
        #[derive(Serialize)]
        struct ClaudeMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            max_tokens: u32,
            messages: Vec<ClaudeMessage<'a>>,
        }

        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            kind: String,
            text: Option<String>,
        }

        let body = Request {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![ClaudeMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/v1/messages", self.base_url);
        debug!(%url, model = %self.model, "sending message");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let resp: Response = ensure_success(response).await?.json().await?;
        let block = resp
            .content
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::missing_field("response contained no content blocks"))?;

        block.text.ok_or_else(|| {
            ClientError::missing_field(format!(
                "first content block is of type '{}' and has no text",
                block.kind
            ))
        })
    }

    fn name(&self) -> &str {
        "Claude"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
