//! Response validation shared by the provider clients

use crate::ClientError;
use reqwest::Response;
use serde_json::Value;
use tracing::debug;

/// Pass a successful response through; turn any other status into a
/// [`ClientError`] carrying the vendor's own error message.
pub async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), body = %body, "vendor returned error status");

    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| extract_api_error(&json))
        .unwrap_or_else(|| {
            let body = body.trim();
            if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body.to_string()
            }
        });

    Err(ClientError::from_status(status.as_u16(), message))
}

/// Pull the human-readable message out of a vendor error payload.
///
/// All three vendors nest it as `error.message`; some proxies put it at the
/// top level instead. Gemini wraps the whole payload in a one-element array.
pub fn extract_api_error(json: &Value) -> Option<String> {
    if let Some(first) = json.as_array().and_then(|items| items.first()) {
        return extract_api_error(first);
    }
    json.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .or_else(|| json.get("message").and_then(Value::as_str))
        .map(String::from)
}
