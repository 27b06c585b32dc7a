//! Error handling for the grader module

use serde::Deserialize;
use thiserror::Error;

/// Error body the grading service attaches to 4xx responses.
#[derive(Debug, Deserialize)]
struct RawError {
    error: String,
}

#[derive(Debug, Error)]
pub enum GraderError {
    /// The response body could not be decoded as the expected JSON.
    #[error("decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Reqwest error, typically network issues or request failures.
    #[error("request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },
}

impl GraderError {
    /// Builds an `Http` error from a non-success response, extracting the
    /// reason from a `{"error": "..."}` body when the server sends one.
    pub async fn from_response(response: reqwest::Response) -> GraderError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read response body".to_string());
        let message = match serde_json::from_str::<RawError>(&body) {
            Ok(raw) => raw.error,
            Err(_) => body,
        };
        GraderError::Http { status, message }
    }

    /// True when the server explicitly refused the submission (a client-side
    /// problem reported before any processing began).
    pub fn is_rejection(&self) -> bool {
        matches!(self, GraderError::Http { status, .. } if (400..500).contains(status))
    }
}
