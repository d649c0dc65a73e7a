use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 from the service. During login this is a rejected credential;
    /// during an authenticated call it means the token is no longer valid.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 300;

/// Error body shape used by the service (`detail`), with a `message`
/// fallback for intermediaries that use the other common field name.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    message: Option<String>,
}

impl ApiError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::resolve_message(status, body);
        if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized(message)
        } else {
            ApiError::Service {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Resolve a human-readable message from an error response body,
    /// trying `detail`, then `message`, then a generic status line.
    fn resolve_message(status: StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            match parsed.detail {
                Some(serde_json::Value::String(detail)) if !detail.is_empty() => return detail,
                // Validation errors arrive as structured detail; render as-is
                Some(detail) if !detail.is_null() => return detail.to_string(),
                _ => {}
            }
            if let Some(message) = parsed.message {
                if !message.is_empty() {
                    return message;
                }
            }
        }

        let truncated = Self::truncate_body(body);
        if truncated.is_empty() {
            format!("Request failed with status {}", status)
        } else {
            format!("Status {}: {}", status, truncated)
        }
    }

    /// Truncate a response body to avoid surfacing excessive data
    fn truncate_body(body: &str) -> String {
        let body = body.trim();
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", cut, body.len())
        }
    }
}
