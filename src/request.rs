//! Request decoding and validation

use crate::InputError;
use serde_json::{Map, Value};

/// Required fields, in the order they are checked
pub const REQUIRED_FIELDS: [&str; 4] = ["provider", "api_key", "prompt", "content"];

/// A validated generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub provider: String,
    pub api_key: String,
    /// `None` when the payload omitted `model` or left it empty
    pub model: Option<String>,
    pub prompt: String,
    pub content: String,
}

impl Request {
    /// Decode and validate the raw standard-input text.
    ///
    /// Leading and trailing whitespace is ignored. Each required field must
    /// hold a non-empty string; the first one that does not is reported.
    pub fn parse(input: &str) -> Result<Self, InputError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(InputError::Empty);
        }

        let value: Value = serde_json::from_str(input)?;
        let Value::Object(payload) = value else {
            return Err(InputError::InvalidJson("expected a JSON object".to_string()));
        };

        let model = payload
            .get("model")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        // initialisers run top to bottom, which is REQUIRED_FIELDS order
        Ok(Self {
            provider: required_str(&payload, "provider")?.to_string(),
            api_key: required_str(&payload, "api_key")?.to_string(),
            model,
            prompt: required_str(&payload, "prompt")?.to_string(),
            content: required_str(&payload, "content")?.to_string(),
        })
    }

    /// The single user turn sent to every provider
    pub fn user_turn(&self) -> String {
        format!("{}\n\nContent to analyze:\n{}", self.prompt, self.content)
    }

    /// The requested model, or `default` when none was given
    pub fn model_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(default)
    }
}

fn required_str<'a>(
    payload: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, InputError> {
    match payload.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        Some(value) if is_truthy(value) => Err(InputError::InvalidType(field)),
        _ => Err(InputError::MissingField(field)),
    }
}

/// Empty strings, `null`, `false`, zero and empty containers count as absent
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
