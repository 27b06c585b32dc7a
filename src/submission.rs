//! Input artifacts for one grading submission.

use std::path::Path;
use thiserror::Error;

/// One user-provided file, held in memory for the multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Artifact {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Reads an artifact from disk, naming it after the file.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Artifact { file_name, bytes })
    }
}

/// The full set of artifacts for one submission. The question paper is
/// optional; the grading service can work from the answers alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub student_answer: Artifact,
    pub model_answer: Artifact,
    pub question_paper: Option<Artifact>,
}

/// Raised before any network call is attempted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} file is empty")]
    EmptyArtifact(&'static str),

    #[error("{0} file has no name")]
    MissingFileName(&'static str),
}

impl Submission {
    /// Fails fast on inputs the server would reject anyway. Never touches
    /// the network.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check(&self.student_answer, "student answer")?;
        check(&self.model_answer, "model answer")?;
        if let Some(question) = &self.question_paper {
            check(question, "question paper")?;
        }
        Ok(())
    }
}

fn check(artifact: &Artifact, label: &'static str) -> Result<(), ValidationError> {
    if artifact.file_name.is_empty() {
        return Err(ValidationError::MissingFileName(label));
    }
    if artifact.bytes.is_empty() {
        return Err(ValidationError::EmptyArtifact(label));
    }
    Ok(())
}
