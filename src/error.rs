//! Error types for the AI processor
//!
//! Errors fall into two tiers. [`InputError`] covers a malformed request and
//! ends the process with a non-zero exit code. [`HandlerError`] covers
//! everything that goes wrong once a provider has been selected; it is
//! rendered as the ordinary textual result. [`ClientError`] is the
//! categorised failure of a single vendor HTTP call.

use crate::Provider;
use std::fmt;

/// Errors that can occur while talking to a vendor API
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Network-related errors (timeouts, connection failures, etc.)
    #[error("Network error: {}", .0.message)]
    Network(NetworkError),
    /// API-specific errors (invalid responses, rate limits, etc.)
    #[error("API error{}: {message}", StatusSuffix(.status))]
    Api {
        message: String,
        status: Option<u16>,
        error_type: ApiErrorType,
    },
    /// Authentication errors (invalid API keys, etc.)
    #[error("Authentication error: {message}")]
    Authentication { message: String, status: Option<u16> },
    /// Configuration errors (bad base URL, TLS backend, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Response parsing errors
    #[error("Parse error: {}", .0.message)]
    Parse(ParseError),
    /// Streaming-related errors
    #[error("Stream error: {0}")]
    Stream(String),
}

/// Network-related error details
#[derive(Debug)]
pub struct NetworkError {
    pub message: String,
    pub error_type: NetworkErrorType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorType {
    Timeout,
    ConnectionFailed,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorType {
    RateLimit,
    ContentFilter,
    ServerError,
    BadRequest,
    Other,
}

/// Parse error details
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub error_type: ParseErrorType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorType {
    JsonParsing,
    MissingField,
}

struct StatusSuffix<'a>(&'a Option<u16>);

impl fmt::Display for StatusSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(status) => write!(f, " ({status})"),
            None => Ok(()),
        }
    }
}

impl ClientError {
    /// Build an error from a non-success HTTP status and the vendor's message
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => ClientError::Authentication {
                message,
                status: Some(status),
            },
            429 => ClientError::Api {
                message,
                status: Some(status),
                error_type: ApiErrorType::RateLimit,
            },
            500..=599 => ClientError::Api {
                message,
                status: Some(status),
                error_type: ApiErrorType::ServerError,
            },
            400..=499 => ClientError::Api {
                message,
                status: Some(status),
                error_type: ApiErrorType::BadRequest,
            },
            _ => ClientError::Api {
                message,
                status: Some(status),
                error_type: ApiErrorType::Other,
            },
        }
    }

    /// Create an error for a response that is missing an expected field
    pub fn missing_field(message: impl Into<String>) -> Self {
        Self::Parse(ParseError {
            message: message.into(),
            error_type: ParseErrorType::MissingField,
        })
    }

    /// HTTP status attached to this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } | ClientError::Authentication { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            let url = err.url().map(|u| u.as_str()).unwrap_or("unknown");
            ClientError::Network(NetworkError {
                message: format!("Request timed out after attempting to reach {url}"),
                error_type: NetworkErrorType::Timeout,
            })
        } else if err.is_connect() {
            let host = err
                .url()
                .and_then(|u| u.host_str())
                .unwrap_or("unknown host");
            ClientError::Network(NetworkError {
                message: format!("Failed to connect to {host}"),
                error_type: NetworkErrorType::ConnectionFailed,
            })
        } else if let Some(status) = err.status() {
            ClientError::from_status(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(ParseError {
                message: format!("Failed to decode response body: {err}"),
                error_type: ParseErrorType::JsonParsing,
            })
        } else if err.is_builder() {
            ClientError::Configuration(err.to_string())
        } else {
            ClientError::Network(NetworkError {
                message: err.to_string(),
                error_type: NetworkErrorType::Other,
            })
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(ParseError {
            message: format!("JSON parsing failed: {err}"),
            error_type: ParseErrorType::JsonParsing,
        })
    }
}

/// Failure of a provider handler, rendered as the exit-0 result text
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The provider's client was not compiled into this binary
    #[error(
        "Error: {} library not installed. Run: {}",
        .provider.library_name(),
        .provider.install_hint()
    )]
    Unavailable { provider: Provider },
    /// The vendor call itself failed
    #[error("{} Error: {source}", .provider.error_tag())]
    Call {
        provider: Provider,
        source: ClientError,
    },
}

impl HandlerError {
    pub fn call(provider: Provider, source: ClientError) -> Self {
        Self::Call { provider, source }
    }

    /// HTTP status of the failed vendor call, if it got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            HandlerError::Unavailable { .. } => None,
            HandlerError::Call { source, .. } => source.status(),
        }
    }
}

/// Malformed input; fatal to the process
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Error: No input data received")]
    Empty,
    #[error("Error: Failed to read input: {0}")]
    Read(#[from] std::io::Error),
    #[error("Error: Invalid input encoding: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("Error: Invalid JSON input: {0}")]
    InvalidJson(String),
    #[error("Error: Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Error: Invalid type for field: {0}")]
    InvalidType(&'static str),
}

impl From<serde_json::Error> for InputError {
    fn from(err: serde_json::Error) -> Self {
        InputError::InvalidJson(err.to_string())
    }
}
