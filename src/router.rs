//! Request routing
//!
//! [`run`] turns the raw standard-input bytes into the process outcome: the
//! single line to print and the exit code. Only malformed input is fatal;
//! every failure after a provider has been chosen is reported as text.

use crate::observability::request_span;
use crate::{
    create_client, AiClient, ClientConfig, HandlerError, InputError, Provider, Request,
};
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

/// What the process prints and how it exits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub exit_code: u8,
    pub output: String,
}

impl Outcome {
    fn fatal(err: InputError) -> Self {
        Self {
            exit_code: 1,
            output: err.to_string(),
        }
    }

    fn result(output: String) -> Self {
        Self {
            exit_code: 0,
            output,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.exit_code != 0
    }
}

/// Builds the vendor client for a routed request
pub trait ClientFactory: Send + Sync {
    fn create(
        &self,
        provider: Provider,
        api_key: &str,
        model: &str,
    ) -> Result<Box<dyn AiClient>, HandlerError>;
}

/// Factory for the real HTTP clients
#[derive(Debug, Clone, Default)]
pub struct HttpClientFactory {
    config: ClientConfig,
}

impl HttpClientFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl ClientFactory for HttpClientFactory {
    fn create(
        &self,
        provider: Provider,
        api_key: &str,
        model: &str,
    ) -> Result<Box<dyn AiClient>, HandlerError> {
        create_client(provider, api_key, model, &self.config)
    }
}

/// Process one raw request
pub async fn run(input: &[u8], factory: &dyn ClientFactory) -> Outcome {
    match parse_input(input) {
        Ok(request) => Outcome::result(route(&request, factory).await),
        Err(err) => {
            warn!(error = %err, "rejecting input");
            Outcome::fatal(err)
        }
    }
}

/// Decode and validate standard-input bytes
pub fn parse_input(input: &[u8]) -> Result<Request, InputError> {
    let text = std::str::from_utf8(input)?;
    Request::parse(text)
}

/// Dispatch a validated request and return the text to print
pub async fn route(request: &Request, factory: &dyn ClientFactory) -> String {
    let name = request.provider.to_lowercase();
    let Some(provider) = Provider::from_name(&name) else {
        warn!(provider = %name, "unknown provider");
        return format!("Error: Unknown AI provider: {name}");
    };

    let model = request.model_or(provider.default_model());
    let started = Instant::now();
    let result = handle(provider, model, request, factory)
        .instrument(request_span(provider, model))
        .await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(text) => {
            info!(%provider, elapsed_ms, chars = text.len(), "provider call succeeded");
            text
        }
        Err(err) => {
            warn!(
                %provider,
                elapsed_ms,
                status = ?err.status(),
                error = %err,
                "provider call failed"
            );
            err.to_string()
        }
    }
}

/// Build the user turn, call the provider, and trim its answer
pub async fn handle(
    provider: Provider,
    model: &str,
    request: &Request,
    factory: &dyn ClientFactory,
) -> Result<String, HandlerError> {
    let client = factory.create(provider, &request.api_key, model)?;
    debug!(client = client.name(), model = client.model(), "sending prompt");
    let text = client
        .send_prompt(&request.user_turn())
        .await
        .map_err(|e| HandlerError::call(provider, e))?;
    Ok(text.trim().to_string())
}
