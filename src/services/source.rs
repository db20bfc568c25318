use crate::models::{
    RawRecords, StudentResponseRecord, SupervisorAcmRecord, SupervisorResponseRecord, TopicMapRecord,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when fetching record batches
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("No endpoint configured for {0}")]
    NotConfigured(&'static str),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Endpoint per record table
#[derive(Debug, Clone, Default)]
pub struct SourceEndpoints {
    pub acm_records: Option<String>,
    pub student_responses: Option<String>,
    pub topic_maps: Option<String>,
    pub supervisor_acms: Option<String>,
    pub supervisor_responses: Option<String>,
}

// Row shapes as the tables are exposed remotely

#[derive(Debug, Deserialize)]
struct AcmRow {
    #[serde(rename = "team42_acmclassificationcodesid")]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StudentResponseRow {
    #[serde(rename = "team42_studentresponsesid")]
    id: Option<String>,
    #[serde(rename = "_team42_firstchoiceinterest_value")]
    first_choice: Option<String>,
    #[serde(rename = "_team42_secondchoiceinterest_value")]
    second_choice: Option<String>,
    #[serde(rename = "_team42_thirdchoiceinterest_value")]
    third_choice: Option<String>,
    #[serde(rename = "_team42_portalcontact_value")]
    contact: Option<String>,
    #[serde(rename = "team42_available")]
    available: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TopicMapRow {
    #[serde(rename = "team42_topicacmmapid")]
    id: Option<String>,
    #[serde(rename = "_team42_acmkeyword_value")]
    acm_record_id: Option<String>,
    #[serde(rename = "_team42_topic_value")]
    topic_record_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SupervisorAcmRow {
    #[serde(rename = "_team42_supervisorresponseid_value")]
    response_id: Option<String>,
    #[serde(rename = "_team42_acmid_value")]
    acm_record_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SupervisorResponseRow {
    #[serde(rename = "team42_supervisorresponsesv2id")]
    id: Option<String>,
    #[serde(rename = "team42_capacity")]
    capacity: Option<u32>,
    #[serde(rename = "team42_available")]
    available: Option<Value>,
}

/// Interpret a remote availability flag; anything absent or unrecognised is unavailable
pub fn availability_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1"),
        Some(Value::Number(n)) => n.as_i64().map(|n| n != 0).unwrap_or(false),
        _ => false,
    }
}

/// Client for the record-returning endpoints
///
/// Each endpoint answers a plain GET with a JSON array of table rows.
pub struct SourceClient {
    client: Client,
    endpoints: SourceEndpoints,
}

impl SourceClient {
    pub fn new(endpoints: SourceEndpoints, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &'static str,
        url: Option<&str>,
    ) -> Result<Vec<T>, SourceError> {
        let url = url.ok_or(SourceError::NotConfigured(table))?;

        tracing::debug!("Fetching {} records", table);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to fetch {}: {} - {}", table, status, body);
            return Err(SourceError::ApiError(format!(
                "Failed to fetch {}: {}",
                table, status
            )));
        }

        let json: Value = response.json().await?;
        let rows = match json {
            Value::Array(rows) => rows,
            // Some flows wrap the rows as {"value": [...]}
            Value::Object(mut obj) => match obj.remove("value") {
                Some(Value::Array(rows)) => rows,
                _ => {
                    return Err(SourceError::InvalidResponse(format!(
                        "Missing row array for {}",
                        table
                    )))
                }
            },
            _ => {
                return Err(SourceError::InvalidResponse(format!(
                    "Missing row array for {}",
                    table
                )))
            }
        };

        let parsed: Vec<T> = rows
            .into_iter()
            .map(serde_json::from_value::<T>)
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| {
                SourceError::InvalidResponse(format!("Failed to parse {}: {}", table, e))
            })?;

        tracing::debug!("Fetched {} {} records", parsed.len(), table);

        Ok(parsed)
    }

    /// Identifiers of every known ACM keyword
    pub async fn acm_records(&self) -> Result<Vec<String>, SourceError> {
        let rows: Vec<AcmRow> = self
            .fetch_rows("acm records", self.endpoints.acm_records.as_deref())
            .await?;
        Ok(rows.into_iter().filter_map(|r| r.id).collect())
    }

    pub async fn student_responses(&self) -> Result<Vec<StudentResponseRecord>, SourceError> {
        let rows: Vec<StudentResponseRow> = self
            .fetch_rows("student responses", self.endpoints.student_responses.as_deref())
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| StudentResponseRecord {
                available: availability_flag(r.available.as_ref()),
                response_id: r.id,
                choices: [r.first_choice, r.second_choice, r.third_choice],
                contact: r.contact,
            })
            .collect())
    }

    pub async fn topic_maps(&self) -> Result<Vec<TopicMapRecord>, SourceError> {
        let rows: Vec<TopicMapRow> = self
            .fetch_rows("topic maps", self.endpoints.topic_maps.as_deref())
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| TopicMapRecord {
                topic_map_id: r.id,
                topic_record_id: r.topic_record_id,
                acm_record_id: r.acm_record_id,
            })
            .collect())
    }

    pub async fn supervisor_acms(&self) -> Result<Vec<SupervisorAcmRecord>, SourceError> {
        let rows: Vec<SupervisorAcmRow> = self
            .fetch_rows("supervisor acms", self.endpoints.supervisor_acms.as_deref())
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| SupervisorAcmRecord {
                response_id: r.response_id,
                acm_record_id: r.acm_record_id,
            })
            .collect())
    }

    pub async fn supervisor_responses(&self) -> Result<Vec<SupervisorResponseRecord>, SourceError> {
        let rows: Vec<SupervisorResponseRow> = self
            .fetch_rows(
                "supervisor responses",
                self.endpoints.supervisor_responses.as_deref(),
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| SupervisorResponseRecord {
                available: availability_flag(r.available.as_ref()),
                supervisor_id: r.id,
                capacity: r.capacity,
            })
            .collect())
    }

    /// Fetch all five batches concurrently
    pub async fn fetch_all(&self) -> Result<RawRecords, SourceError> {
        let (acm_records, student_responses, topic_maps, supervisor_acms, supervisor_responses) =
            tokio::try_join!(
                self.acm_records(),
                self.student_responses(),
                self.topic_maps(),
                self.supervisor_acms(),
                self.supervisor_responses(),
            )?;

        tracing::info!(
            "Fetched {} acm records, {} student responses, {} topic maps, {} supervisor rows, {} capacity rows",
            acm_records.len(),
            student_responses.len(),
            topic_maps.len(),
            supervisor_acms.len(),
            supervisor_responses.len()
        );

        Ok(RawRecords {
            acm_records,
            student_responses,
            topic_maps,
            supervisor_acms,
            supervisor_responses,
        })
    }
}
