use serde::{Deserialize, Deserializer, Serialize};

use crate::models::domain::CHOICE_ARITY;

/// Student response as delivered by the record source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentResponseRecord {
    #[serde(rename = "responseId", default)]
    pub response_id: Option<String>,
    /// Raw topic identifiers in declared order; `None` marks an unanswered choice
    #[serde(default, deserialize_with = "deserialize_choices")]
    pub choices: [Option<String>; CHOICE_ARITY],
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default = "default_true")]
    pub available: bool,
}

/// Topic (raw choice) to ACM keyword mapping row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicMapRecord {
    #[serde(rename = "topicMapId", default)]
    pub topic_map_id: Option<String>,
    #[serde(rename = "topicRecordId", default)]
    pub topic_record_id: Option<String>,
    #[serde(rename = "acmRecordId", default)]
    pub acm_record_id: Option<String>,
}

/// One (supervisor, keyword) row; a supervisor usually spans several rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupervisorAcmRecord {
    #[serde(rename = "responseId", default)]
    pub response_id: Option<String>,
    #[serde(rename = "acmRecordId", default)]
    pub acm_record_id: Option<String>,
}

/// Supervisor capacity row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupervisorResponseRecord {
    #[serde(rename = "supervisorId", default)]
    pub supervisor_id: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default = "default_true")]
    pub available: bool,
}

/// The five record batches one allocation run consumes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecords {
    /// Universe of valid ACM keyword identifiers
    #[serde(rename = "acmRecords", default)]
    pub acm_records: Vec<String>,
    #[serde(rename = "studentResponses", default)]
    pub student_responses: Vec<StudentResponseRecord>,
    #[serde(rename = "topicMaps", default)]
    pub topic_maps: Vec<TopicMapRecord>,
    #[serde(rename = "supervisorAcms", default)]
    pub supervisor_acms: Vec<SupervisorAcmRecord>,
    #[serde(rename = "supervisorResponses", default)]
    pub supervisor_responses: Vec<SupervisorResponseRecord>,
}

fn default_true() -> bool { true }

/// Accept any number of choices: missing positions become `None`, extras are ignored
fn deserialize_choices<'de, D>(deserializer: D) -> Result<[Option<String>; CHOICE_ARITY], D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    let mut choices: [Option<String>; CHOICE_ARITY] = Default::default();

    for (slot, choice) in choices.iter_mut().zip(raw.unwrap_or_default()) {
        *slot = choice;
    }

    Ok(choices)
}
