//! # AI Processor
//!
//! A single-shot adapter between an orchestrating process and three AI text
//! generation APIs (OpenAI, Anthropic Claude, Google Gemini). One JSON request
//! is read from standard input, routed to the provider it names, and the
//! generated text (or a readable error) is written to standard output.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ai_processor::{router, ClientConfig, HttpClientFactory};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let factory = HttpClientFactory::new(ClientConfig::from_env());
//!     let input = br#"{"provider":"openai","api_key":"sk-...","prompt":"Summarize:","content":"Hello world"}"#;
//!
//!     let outcome = router::run(input, &factory).await;
//!     println!("{}", outcome.output);
//! }
//! ```

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::time::Duration;
use tracing::warn;

pub mod clients;
pub mod error;
pub mod http;
pub mod middleware;
pub mod observability;
pub mod provider;
pub mod request;
pub mod router;
pub mod sse;

pub use clients::*;
pub use error::*;
pub use provider::Provider;
pub use request::Request;
pub use router::{ClientFactory, HttpClientFactory, Outcome};

/// Default endpoint roots, overridable per provider
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration shared by all provider clients
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for the whole HTTP request
    pub timeout: Duration,
    /// Maximum output tokens (OpenAI and Claude)
    pub max_tokens: u32,
    /// Sampling temperature (OpenAI only)
    pub temperature: Option<f32>,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub gemini_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            max_tokens: 1000,
            temperature: Some(0.7),
            openai_base_url: OPENAI_BASE_URL.to_string(),
            anthropic_base_url: ANTHROPIC_BASE_URL.to_string(),
            gemini_base_url: GEMINI_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load overrides through `lookup`, falling back to defaults.
    ///
    /// Recognised keys: `OPENAI_BASE_URL`, `ANTHROPIC_BASE_URL`,
    /// `GEMINI_BASE_URL` and `AI_PROCESSOR_TIMEOUT_SECS`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut builder = Self::builder();

        if let Some(url) = var("OPENAI_BASE_URL") {
            builder = builder.openai_base_url(url);
        }
        if let Some(url) = var("ANTHROPIC_BASE_URL") {
            builder = builder.anthropic_base_url(url);
        }
        if let Some(url) = var("GEMINI_BASE_URL") {
            builder = builder.gemini_base_url(url);
        }
        if let Some(raw) = var("AI_PROCESSOR_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => builder = builder.timeout(Duration::from_secs(secs)),
                _ => warn!(value = %raw, "ignoring invalid AI_PROCESSOR_TIMEOUT_SECS"),
            }
        }

        builder.build()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.openai_base_url = trim_base(url.into());
        self
    }

    pub fn anthropic_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.anthropic_base_url = trim_base(url.into());
        self
    }

    pub fn gemini_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.gemini_base_url = trim_base(url.into());
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

fn trim_base(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// A piece of a streamed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    pub content: String,
    pub finished: bool,
}

/// Common trait implemented by all AI clients
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Sends a prompt and returns the complete textual response
    async fn send_prompt(&self, prompt: &str) -> Result<String, ClientError>;

    /// Streams the response to a prompt.
    ///
    /// Clients without a native streaming endpoint yield the full
    /// [`send_prompt`](AiClient::send_prompt) result as one finished chunk.
    async fn stream_prompt(
        &self,
        prompt: &str,
    ) -> Result<BoxStream<'_, Result<StreamChunk, ClientError>>, ClientError> {
        let content = self.send_prompt(prompt).await?;
        Ok(futures::stream::once(async move {
            Ok(StreamChunk {
                content,
                finished: true,
            })
        })
        .boxed())
    }

    fn supports_streaming(&self) -> bool {
        false
    }

    /// Returns the name/identifier of this AI client
    fn name(&self) -> &str;

    /// Returns the model being used by this client
    fn model(&self) -> &str;
}

/// Create the client for `provider`.
///
/// Fails with [`HandlerError::Unavailable`] when the provider's cargo feature
/// was disabled at build time.
#[cfg_attr(
    not(any(feature = "openai", feature = "claude", feature = "gemini")),
    allow(unused_variables)
)]
pub fn create_client(
    provider: Provider,
    api_key: &str,
    model: &str,
    config: &ClientConfig,
) -> Result<Box<dyn AiClient>, HandlerError> {
    match provider {
        #[cfg(feature = "openai")]
        Provider::OpenAi => Ok(Box::new(ChatGpt::new(
            http_client(provider, config)?,
            api_key.to_string(),
            model.to_string(),
            config,
        ))),
        #[cfg(not(feature = "openai"))]
        Provider::OpenAi => Err(HandlerError::Unavailable { provider }),
        #[cfg(feature = "claude")]
        Provider::Claude => Ok(Box::new(Claude::new(
            http_client(provider, config)?,
            api_key.to_string(),
            model.to_string(),
            config,
        ))),
        #[cfg(not(feature = "claude"))]
        Provider::Claude => Err(HandlerError::Unavailable { provider }),
        #[cfg(feature = "gemini")]
        Provider::Gemini => Ok(Box::new(Gemini::new(
            http_client(provider, config)?,
            api_key.to_string(),
            model.to_string(),
            config,
        ))),
        #[cfg(not(feature = "gemini"))]
        Provider::Gemini => Err(HandlerError::Unavailable { provider }),
    }
}

#[cfg(any(feature = "openai", feature = "claude", feature = "gemini"))]
fn http_client(
    provider: Provider,
    config: &ClientConfig,
) -> Result<reqwest::Client, HandlerError> {
    http::build_client(config).map_err(|e| {
        let err = ClientError::Configuration(format!("Failed to create HTTP client: {e}"));
        HandlerError::call(provider, err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(600));
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_client_config_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_BASE_URL", "http://127.0.0.1:9000/v1/"),
            ("GEMINI_BASE_URL", "  "),
            ("AI_PROCESSOR_TIMEOUT_SECS", "45"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.openai_base_url, "http://127.0.0.1:9000/v1");
        assert_eq!(config.anthropic_base_url, ANTHROPIC_BASE_URL);
        assert_eq!(config.gemini_base_url, GEMINI_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_invalid_timeout_is_ignored() {
        let config = ClientConfig::from_lookup(|key| {
            (key == "AI_PROCESSOR_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert_eq!(config.timeout, Duration::from_secs(600));
    }

    #[cfg(all(feature = "openai", feature = "claude", feature = "gemini"))]
    #[test]
    fn test_create_client_uses_requested_model() {
        let config = ClientConfig::default();
        for provider in Provider::ALL {
            let client = create_client(provider, "key", "some-model", &config).unwrap();
            assert_eq!(client.model(), "some-model");
        }
    }

    #[cfg(not(feature = "gemini"))]
    #[test]
    fn test_create_client_without_gemini_feature() {
        let result = create_client(Provider::Gemini, "key", "some-model", &ClientConfig::default());
        let Err(err) = result else {
            panic!("gemini client built without its feature");
        };
        assert!(matches!(
            err,
            HandlerError::Unavailable {
                provider: Provider::Gemini
            }
        ));
        assert_eq!(
            err.to_string(),
            "Error: Google GenAI library not installed. Run: cargo install ai-processor --features gemini"
        );
    }
}
