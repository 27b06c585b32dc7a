//! Job Submitter
//!
//! Packages the input artifacts into the submission request and resolves the
//! response into exactly one outcome. No fourth, ambiguous outcome exists:
//! every response classifies as Accepted or Rejected before control returns.

use crate::grader::{Grader, GraderError};
use crate::submission::Submission;
use log::{info, warn};

/// Resolution of a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server accepted the job; processing has begun.
    Accepted,
    /// The job will not be processed. Carries the user-facing reason.
    Rejected(String),
}

/// Issues the single submission request and classifies the response.
///
/// Callers must have validated the submission already; this function goes
/// straight to the network.
pub async fn submit_once(grader: &dyn Grader, submission: &Submission) -> SubmitOutcome {
    match grader.submit(submission).await {
        Ok(()) => {
            info!("submission accepted; server-side processing has begun");
            SubmitOutcome::Accepted
        }
        Err(e) => {
            let reason = rejection_reason(&e);
            warn!("submission rejected: {}", reason);
            SubmitOutcome::Rejected(reason)
        }
    }
}

/// Maps a submission-time error to the message shown to the user. Explicit
/// server refusals keep the server's wording; transport-level failures get a
/// generic reason.
fn rejection_reason(error: &GraderError) -> String {
    match error {
        GraderError::Http { message, .. } if error.is_rejection() => message.clone(),
        GraderError::Http { status, .. } => format!("server error ({})", status),
        GraderError::Reqwest(_) => "could not reach the grading server".to_string(),
        GraderError::Decode(_) => "unreadable response from the grading server".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grader::MockGrader;
    use crate::submission::{Artifact, Submission};

    fn submission() -> Submission {
        Submission {
            student_answer: Artifact::new("student.pdf", b"scan".to_vec()),
            model_answer: Artifact::new("model.pdf", b"key".to_vec()),
            question_paper: None,
        }
    }

    #[tokio::test]
    async fn accepted_when_the_server_says_yes() {
        let mut grader = MockGrader::new();
        grader.expect_submit().times(1).returning(|_| Ok(()));

        let outcome = submit_once(&grader, &submission()).await;
        assert_eq!(outcome, SubmitOutcome::Accepted);
    }

    #[tokio::test]
    async fn rejection_keeps_the_server_reason() {
        let mut grader = MockGrader::new();
        grader.expect_submit().times(1).returning(|_| {
            Err(GraderError::Http {
                status: 400,
                message: "missing model answer".to_string(),
            })
        });

        let outcome = submit_once(&grader, &submission()).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected("missing model answer".to_string())
        );
    }

    #[tokio::test]
    async fn server_errors_get_a_generic_reason() {
        let mut grader = MockGrader::new();
        grader.expect_submit().times(1).returning(|_| {
            Err(GraderError::Http {
                status: 503,
                message: "unavailable".to_string(),
            })
        });

        let outcome = submit_once(&grader, &submission()).await;
        assert_eq!(outcome, SubmitOutcome::Rejected("server error (503)".to_string()));
    }

    #[tokio::test]
    async fn unreadable_responses_get_a_generic_reason() {
        let mut grader = MockGrader::new();
        grader.expect_submit().times(1).returning(|_| {
            Err(GraderError::Decode(
                serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
            ))
        });

        let outcome = submit_once(&grader, &submission()).await;
        assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    }
}
