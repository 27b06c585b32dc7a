//! Grading Service Interface
//!
//! A trait abstracting the grading server's two endpoints, so the runtime
//! and poller can be exercised against a mock in tests.

pub mod client;
pub mod error;

pub use client::GraderClient;
pub use error::GraderError;

use crate::submission::Submission;
use async_trait::async_trait;
use serde::Deserialize;

/// Payload returned by the status endpoint. Internally tagged on `status`;
/// any value outside the known set deserializes to `Unknown` and is treated
/// as a transient condition, never a crash.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServerStatus {
    Queued,
    Processing {
        step: Option<u32>,
        total_steps: Option<u32>,
        message: Option<String>,
    },
    Done,
    Error {
        message: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Grader: Send + Sync {
    /// Uploads the submission artifacts. `Ok(())` means the server accepted
    /// the job and processing has begun.
    async fn submit(&self, submission: &Submission) -> Result<(), GraderError>;

    /// Queries the status endpoint once. Safe to call repeatedly; the read
    /// has no side effects server-side.
    async fn progress(&self) -> Result<ServerStatus, GraderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_processing_status() {
        let status: ServerStatus = serde_json::from_str(
            r#"{"status":"processing","step":2,"total_steps":3,"message":"Scoring answers"}"#,
        )
        .unwrap();
        assert_eq!(
            status,
            ServerStatus::Processing {
                step: Some(2),
                total_steps: Some(3),
                message: Some("Scoring answers".to_string()),
            }
        );
    }

    #[test]
    fn processing_counters_may_be_omitted() {
        let status: ServerStatus = serde_json::from_str(r#"{"status":"processing"}"#).unwrap();
        assert_eq!(
            status,
            ServerStatus::Processing {
                step: None,
                total_steps: None,
                message: None,
            }
        );
    }

    #[test]
    fn parses_terminal_statuses() {
        let done: ServerStatus = serde_json::from_str(r#"{"status":"done"}"#).unwrap();
        assert_eq!(done, ServerStatus::Done);

        let error: ServerStatus =
            serde_json::from_str(r#"{"status":"error","message":"bad format"}"#).unwrap();
        assert_eq!(
            error,
            ServerStatus::Error {
                message: Some("bad format".to_string())
            }
        );
    }

    #[test]
    fn unrecognized_status_is_not_an_error() {
        let status: ServerStatus = serde_json::from_str(r#"{"status":"warming_up"}"#).unwrap();
        assert_eq!(status, ServerStatus::Unknown);
    }
}
