// Model exports
pub mod domain;
pub mod records;
pub mod requests;
pub mod responses;

pub use domain::{
    AllocationOptions, AllocationOutcome, AllocationSummary, Assignment, Candidate, MatchRecord,
    RankedTag, SlotHolder, SlotHolderDiagnostic, SubscriptionStatus, CHOICE_ARITY,
};
pub use records::{
    RawRecords, StudentResponseRecord, SupervisorAcmRecord, SupervisorResponseRecord, TopicMapRecord,
};
pub use requests::{ComputeAllocationRequest, RunAllocationRequest};
pub use responses::{
    format_matches, AllocationResponse, ErrorResponse, FormattedMatch, FormattedStudentMatch,
    HealthResponse, SubmissionPayload,
};
