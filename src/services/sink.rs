use crate::models::{format_matches, AllocationOutcome, SubmissionPayload};
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when handing results on
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("File write failed: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Posts final matches to the submission endpoint
pub struct SubmissionClient {
    url: String,
    client: Client,
}

impl SubmissionClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }

    pub async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SinkError::ApiError(format!(
                "Failed to submit matches: {}",
                response.status()
            )));
        }

        tracing::debug!(
            "Submitted {} matches, {} unmatched students, {} unmatched supervisors",
            payload.matches.len(),
            payload.unmatched_students.len(),
            payload.unmatched_supervisors.len()
        );

        Ok(())
    }
}

/// Writes the outcome of a run as JSON files for manual review
pub struct JsonFileWriter {
    dir: PathBuf,
}

impl JsonFileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, SinkError> {
        let path = self.dir.join(name);
        let bytes = serde_json::to_vec(value)?;
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Write the reviewed matches, full matches and both unmatched lists
    pub async fn write_outcome(&self, outcome: &AllocationOutcome) -> Result<Vec<PathBuf>, SinkError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let written = vec![
            self.write_json("afterReviewMatches.json", &format_matches(&outcome.assignments))
                .await?,
            self.write_json("rawMatches.json", &json!({ "matches": outcome.assignments }))
                .await?,
            self.write_json(
                "unmatchedStudents.json",
                &json!({ "unmatchedStudents": outcome.unmatched_candidates }),
            )
            .await?,
            self.write_json(
                "unmatchedSupervisors.json",
                &json!({ "unmatchedSupervisors": outcome.unmatched_slot_holders }),
            )
            .await?,
        ];

        tracing::debug!("Wrote {} result files to {}", written.len(), self.dir.display());

        Ok(written)
    }
}
