use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Number of ranked choices every student response must carry
pub const CHOICE_ARITY: usize = 3;

/// A tag carrying the priority the candidate gave to the choice it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedTag {
    #[serde(rename = "acmRecordId")]
    pub tag: String,
    /// 1 = most preferred
    pub priority: u8,
}

impl RankedTag {
    pub fn new(tag: impl Into<String>, priority: u8) -> Self {
        Self {
            tag: tag.into(),
            priority,
        }
    }
}

/// Student with resolved, ranked tags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "responseId")]
    pub id: String,
    pub choices: [String; CHOICE_ARITY],
    #[serde(rename = "acmKeywords")]
    pub tags: Vec<RankedTag>,
    #[serde(default)]
    pub contact: Option<String>,
}

/// Supervisor offering a bounded number of places
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotHolder {
    #[serde(rename = "responseId")]
    pub id: String,
    #[serde(rename = "acmKeywords")]
    pub tags: BTreeSet<String>,
    pub capacity: u32,
}

impl SlotHolder {
    #[inline]
    pub fn supports(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Compatibility between one candidate and one slot-holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "studentResponse")]
    pub candidate: Candidate,
    #[serde(rename = "supervisorResponseId")]
    pub slot_holder_id: String,
    #[serde(rename = "commonAcmKeyword")]
    pub shared_tags: Vec<RankedTag>,
    #[serde(rename = "bestPriority")]
    pub best_priority: u8,
}

impl MatchRecord {
    pub fn new(candidate: Candidate, slot_holder_id: String, first: RankedTag) -> Self {
        Self {
            candidate,
            slot_holder_id,
            best_priority: first.priority,
            shared_tags: vec![first],
        }
    }

    /// Append another shared tag, keeping `best_priority` the minimum seen
    pub fn push_tag(&mut self, tag: RankedTag) {
        self.best_priority = self.best_priority.min(tag.priority);
        self.shared_tags.push(tag);
    }

    pub fn candidate_id(&self) -> &str {
        &self.candidate.id
    }
}

/// Final allocation for one slot-holder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "supervisorResponse")]
    pub slot_holder: SlotHolder,
    pub capacity: u32,
    #[serde(rename = "takenSpaces")]
    pub taken_spaces: usize,
    #[serde(rename = "matchedStudentResponses")]
    pub matches: Vec<MatchRecord>,
}

/// How demand for a slot-holder compared with what it could take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Oversubscribed,
    Filled,
    Undersubscribed,
    Unmatched,
}

/// Capacity versus taken spaces for one slot-holder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotHolderDiagnostic {
    #[serde(rename = "supervisorResponseId")]
    pub slot_holder_id: String,
    pub capacity: u32,
    #[serde(rename = "takenSpaces")]
    pub taken_spaces: usize,
    /// Distinct candidates sharing at least one tag in the first pass
    pub demand: usize,
    /// First-pass places granted by the fair quota, before the capacity cap
    pub quota: usize,
    /// Every matching candidate had already been taken by an earlier slot-holder
    pub exhausted: bool,
    #[serde(rename = "firstPass")]
    pub first_pass: usize,
    pub rebalanced: usize,
    pub status: SubscriptionStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationSummary {
    #[serde(rename = "eligibleCandidates")]
    pub eligible_candidates: usize,
    #[serde(rename = "slotHolders")]
    pub slot_holders: usize,
    #[serde(rename = "assignedCandidates")]
    pub assigned_candidates: usize,
    #[serde(rename = "firstPassAssigned")]
    pub first_pass_assigned: usize,
    #[serde(rename = "rebalancedAssigned")]
    pub rebalanced_assigned: usize,
    #[serde(rename = "unmatchedCandidates")]
    pub unmatched_candidates: usize,
    #[serde(rename = "unmatchedSlotHolders")]
    pub unmatched_slot_holders: usize,
}

/// Everything one allocation run produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub assignments: Vec<Assignment>,
    #[serde(rename = "unmatchedStudents")]
    pub unmatched_candidates: Vec<Candidate>,
    #[serde(rename = "unmatchedSupervisors")]
    pub unmatched_slot_holders: Vec<SlotHolder>,
    pub diagnostics: Vec<SlotHolderDiagnostic>,
    pub summary: AllocationSummary,
}

/// Allocation tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationOptions {
    /// Run the single rebalancing pass over left-over candidates
    pub rebalance: bool,
}

impl Default for AllocationOptions {
    fn default() -> Self {
        Self { rebalance: true }
    }
}
