//! OpenAI ChatGPT client implementation

use crate::middleware::ensure_success;
use crate::{AiClient, ClientConfig, ClientError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Client for OpenAI's chat completion models
pub struct ChatGpt {
    /// Reqwest HTTP client used for requests
    http: Client,
    /// API key for authenticating with OpenAI
    key: String,
    /// Model name to call, e.g. `"gpt-4o-mini"`
    model: String,
    /// Endpoint root, `https://api.openai.com/v1` unless overridden
    base_url: String,
    max_tokens: u32,
    temperature: Option<f32>,
}

impl ChatGpt {
    /// Create a new ChatGPT client
    pub fn new(http: Client, key: String, model: String, config: &ClientConfig) -> Self {
        Self {
            http,
            key,
            model,
            base_url: config.openai_base_url.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl AiClient for ChatGpt {
    async fn send_prompt(&self, prompt: &str) -> Result<String, ClientError> {
        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Request<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            max_tokens: u32,
            #[serde(skip_serializing_if = "Option::is_none")]
            temperature: Option<f32>,
        }

        #[derive(Deserialize)]
        struct Response {
            #[serde(default)]
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: RespMessage,
        }

        #[derive(Deserialize)]
        struct RespMessage {
            content: Option<String>,
        }

        let body = Request {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %self.model, "sending chat completion");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.key)
            .json(&body)
            .send()
            .await?;

        let resp: Response = ensure_success(response).await?.json().await?;
        resp.choices
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::missing_field("response contained no choices"))?
            .message
            .content
            .ok_or_else(|| ClientError::missing_field("first choice has no message content"))
    }

    fn name(&self) -> &str {
        "ChatGPT"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(server: &mockito::ServerGuard) -> ChatGpt {
        let config = ClientConfig::builder()
            .openai_base_url(format!("{}/v1", server.url()))
            .build();
        ChatGpt::new(Client::new(), "k".into(), "gpt-4o-mini".into(), &config)
    }

    #[tokio::test]
    async fn test_send_prompt_posts_fixed_parameters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer k")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "hi"}],
                "max_tokens": 1000,
                "temperature": 0.7
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"  A greeting.\n"}}]}"#)
            .create_async()
            .await;

        let text = client(&server).send_prompt("hi").await.unwrap();
        assert_eq!(text, "  A greeting.\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_carries_vendor_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Incorrect API key provided: k.","code":"invalid_api_key"}}"#)
            .create_async()
            .await;

        let err = client(&server).send_prompt("hi").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Authentication error: Incorrect API key provided: k."
        );
    }

    #[tokio::test]
    async fn test_empty_choices_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = client(&server).send_prompt("hi").await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }
}
