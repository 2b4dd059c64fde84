//! Errors returned by generated clients.

use serde_json::Value;
use thiserror::Error;

/// An error reported by the server or raised while dispatching a request.
///
/// Errors raised on the client side use code `0`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[{code}] {message}")]
pub struct RpcError {
    pub code: u16,
    pub message: String,
    pub data: Option<Value>,
    pub stack: Option<String>,
}

impl RpcError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
            stack: None,
        }
    }

    /// Decodes an error body leniently. Missing or malformed fields fall back
    /// to the HTTP status and the raw body text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<Value>(body).ok();
        let object = parsed.as_ref().and_then(|v| v.as_object());

        let code = object
            .and_then(|o| o.get("code"))
            .and_then(|v| match v {
                Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .unwrap_or(status);
        let message = object
            .and_then(|o| o.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("request failed with status {}", status)
                } else {
                    body.to_string()
                }
            });
        let data = object.and_then(|o| o.get("data")).cloned();
        let stack = object.and_then(|o| o.get("stack")).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Array(lines) => Some(
                lines
                    .iter()
                    .filter_map(|line| line.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => None,
        });

        Self {
            code,
            message,
            data,
            stack,
        }
    }

    pub fn transport_not_allowed(procedure: &str, transport: &str, allowed: &[&str]) -> Self {
        Self::new(
            0,
            format!(
                "procedure '{}' does not support the '{}' transport; allowed: {}",
                procedure,
                transport,
                allowed.join(", ")
            ),
        )
    }

    pub fn unsupported_transport(transport: &str) -> Self {
        Self::new(
            0,
            format!("transport '{}' is not supported by this client; use 'http'", transport),
        )
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        let code = err.status().map(|s| s.as_u16()).unwrap_or(0);
        Self::new(code, err.to_string())
    }
}
