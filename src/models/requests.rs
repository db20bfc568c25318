use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::records::{
    RawRecords, StudentResponseRecord, SupervisorAcmRecord, SupervisorResponseRecord, TopicMapRecord,
};

/// Request to allocate over records supplied in the body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ComputeAllocationRequest {
    #[validate(length(max = 100000))]
    #[serde(alias = "acm_records", rename = "acmRecords", default)]
    pub acm_records: Vec<String>,
    #[validate(length(max = 10000))]
    #[serde(alias = "student_responses", rename = "studentResponses", default)]
    pub student_responses: Vec<StudentResponseRecord>,
    #[validate(length(max = 100000))]
    #[serde(alias = "topic_maps", rename = "topicMaps", default)]
    pub topic_maps: Vec<TopicMapRecord>,
    #[validate(length(max = 100000))]
    #[serde(alias = "supervisor_acms", rename = "supervisorAcms", default)]
    pub supervisor_acms: Vec<SupervisorAcmRecord>,
    #[validate(length(max = 10000))]
    #[serde(alias = "supervisor_responses", rename = "supervisorResponses", default)]
    pub supervisor_responses: Vec<SupervisorResponseRecord>,
    /// Overrides the configured rebalancing switch for this request
    #[serde(default)]
    pub rebalance: Option<bool>,
}

impl ComputeAllocationRequest {
    pub fn into_records(self) -> RawRecords {
        RawRecords {
            acm_records: self.acm_records,
            student_responses: self.student_responses,
            topic_maps: self.topic_maps,
            supervisor_acms: self.supervisor_acms,
            supervisor_responses: self.supervisor_responses,
        }
    }
}

/// Request to fetch records from the source, allocate and hand the result on
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunAllocationRequest {
    #[validate(length(min = 1, max = 64))]
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub submit: bool,
    #[serde(alias = "write_files", rename = "writeFiles", default)]
    pub write_files: bool,
}

impl Default for RunAllocationRequest {
    fn default() -> Self {
        Self {
            label: None,
            submit: true,
            write_files: false,
        }
    }
}

fn default_true() -> bool {
    true
}
