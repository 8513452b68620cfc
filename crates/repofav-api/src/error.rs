use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidArgument(String),

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Error body the backend sends along with non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default, alias = "Message")]
    message: Option<String>,
}

impl ApiError {
    /// Build a server error from a failed response.
    ///
    /// Prefers the payload's `message` field, falls back to the raw body and
    /// finally to the status text.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorPayload>(body)
            .ok()
            .and_then(|payload| payload.message)
            .filter(|m| !m.trim().is_empty())
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        ApiError::Server {
            status: status.as_u16(),
            message,
        }
    }
}
