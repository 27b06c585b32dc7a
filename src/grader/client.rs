//! Grading Service Client
//!
//! A reqwest-backed client for the grading server: multipart submission and
//! the idempotent progress read.

use crate::consts::submit::{POLL_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS};
use crate::grader::error::GraderError;
use crate::grader::{Grader, ServerStatus};
use crate::submission::{Artifact, Submission};
use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GraderClient {
    client: Client,
    base_url: String,
}

impl GraderClient {
    /// Create a new client for the grading service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    async fn handle_response_status(response: Response) -> Result<Response, GraderError> {
        if !response.status().is_success() {
            return Err(GraderError::from_response(response).await);
        }
        Ok(response)
    }

    fn file_part(artifact: &Artifact) -> Part {
        Part::bytes(artifact.bytes.clone()).file_name(artifact.file_name.clone())
    }
}

#[async_trait]
impl Grader for GraderClient {
    async fn submit(&self, submission: &Submission) -> Result<(), GraderError> {
        let mut form = Form::new()
            .part("student_file", Self::file_part(&submission.student_answer))
            .part("model_file", Self::file_part(&submission.model_answer));
        if let Some(question) = &submission.question_paper {
            form = form.part("question_file", Self::file_part(question));
        }

        let response = self
            .client
            .post(self.build_url("evaluate"))
            .multipart(form)
            .send()
            .await?;

        debug!("submission response: {}", response.status());
        Self::handle_response_status(response).await?;
        Ok(())
    }

    async fn progress(&self) -> Result<ServerStatus, GraderError> {
        let response = self
            .client
            .get(self.build_url("progress"))
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS))
            .send()
            .await?;

        let response = Self::handle_response_status(response).await?;
        let bytes = response.bytes().await?;
        let status = serde_json::from_slice(&bytes)?;
        Ok(status)
    }
}
