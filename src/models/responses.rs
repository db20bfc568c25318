use serde::{Deserialize, Serialize};
use crate::models::domain::{
    AllocationOutcome, AllocationSummary, Assignment, Candidate, RankedTag, SlotHolder,
    SlotHolderDiagnostic,
};

/// One student placed with a supervisor, reduced to what reviewers need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedStudentMatch {
    #[serde(rename = "studentResponseId")]
    pub student_response_id: String,
    #[serde(rename = "commonAcmKeyword")]
    pub common_acm_keyword: Vec<RankedTag>,
}

/// Human-readable view of an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedMatch {
    #[serde(rename = "supervisorResponseId")]
    pub supervisor_response_id: String,
    pub capacity: u32,
    pub matches: Vec<FormattedStudentMatch>,
}

impl From<&Assignment> for FormattedMatch {
    fn from(assignment: &Assignment) -> Self {
        Self {
            supervisor_response_id: assignment.slot_holder.id.clone(),
            capacity: assignment.capacity,
            matches: assignment
                .matches
                .iter()
                .map(|m| FormattedStudentMatch {
                    student_response_id: m.candidate.id.clone(),
                    common_acm_keyword: m.shared_tags.clone(),
                })
                .collect(),
        }
    }
}

pub fn format_matches(assignments: &[Assignment]) -> Vec<FormattedMatch> {
    assignments.iter().map(FormattedMatch::from).collect()
}

/// Body handed to the submission endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub matches: Vec<FormattedMatch>,
    #[serde(rename = "unmatchedStudents")]
    pub unmatched_students: Vec<Candidate>,
    #[serde(rename = "unmatchedSupervisors")]
    pub unmatched_supervisors: Vec<SlotHolder>,
}

impl From<&AllocationOutcome> for SubmissionPayload {
    fn from(outcome: &AllocationOutcome) -> Self {
        Self {
            matches: format_matches(&outcome.assignments),
            unmatched_students: outcome.unmatched_candidates.clone(),
            unmatched_supervisors: outcome.unmatched_slot_holders.clone(),
        }
    }
}

/// Response for the allocation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResponse {
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "generatedAt")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub matches: Vec<FormattedMatch>,
    #[serde(rename = "unmatchedStudents")]
    pub unmatched_students: Vec<Candidate>,
    #[serde(rename = "unmatchedSupervisors")]
    pub unmatched_supervisors: Vec<SlotHolder>,
    pub diagnostics: Vec<SlotHolderDiagnostic>,
    pub summary: AllocationSummary,
    pub submitted: bool,
    #[serde(rename = "filesWritten")]
    pub files_written: bool,
}

impl AllocationResponse {
    pub fn from_outcome(outcome: AllocationOutcome, label: Option<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            label,
            generated_at: chrono::Utc::now(),
            matches: format_matches(&outcome.assignments),
            unmatched_students: outcome.unmatched_candidates,
            unmatched_supervisors: outcome.unmatched_slot_holders,
            diagnostics: outcome.diagnostics,
            summary: outcome.summary,
            submitted: false,
            files_written: false,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
