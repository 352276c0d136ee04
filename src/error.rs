use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failures talking to the job-tracker backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ApiError {
    /// Maps a non-success response to an error, pulling the FastAPI `detail` text when present.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|e| match e.detail {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Status {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Transport failures, rate limits and server errors are worth another attempt on reads.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_message_extracted() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"detail":"Job not found"}"#);
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "Job not found"));
    }

    #[test]
    fn test_unauthorized_mapping() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"detail":"Session expired"}"#);
        assert!(err.is_unauthorized());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_server_errors_are_retryable() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "API error (status 500): boom");

        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"detail":"bad"}"#);
        assert!(!err.is_retryable());
    }
}
