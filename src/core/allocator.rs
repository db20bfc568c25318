use std::collections::HashSet;

use crate::core::{
    collator::collate,
    error::AllocationError,
    planner::{fair_quotas, run_pass},
    rebalancer::{merge_passes, rebalance},
    resolver::{resolve_candidates, resolve_slot_holders},
};
use crate::models::{AllocationOptions, AllocationOutcome, Candidate, RawRecords, SlotHolder};

/// Main allocation orchestrator - runs the resolve/match/plan/rebalance pipeline
///
/// # Pipeline Stages
/// 1. Tag resolution of student responses and supervisor rows
/// 2. Overlap matching per supervisor
/// 3. Fair-quota planning (first pass)
/// 4. Rebalancing of left-over students over under-subscribed supervisors
/// 5. Collation into assignments, unmatched lists and diagnostics
#[derive(Debug, Clone)]
pub struct Allocator {
    options: AllocationOptions,
}

impl Allocator {
    pub fn new(options: AllocationOptions) -> Self {
        Self { options }
    }

    pub fn with_default_options() -> Self {
        Self {
            options: AllocationOptions::default(),
        }
    }

    pub fn options(&self) -> AllocationOptions {
        self.options
    }

    /// Allocate from raw record batches
    ///
    /// # Errors
    /// `AllocationError::Configuration` when no supervisor survives resolution.
    pub fn allocate(&self, records: &RawRecords) -> Result<AllocationOutcome, AllocationError> {
        let candidates = resolve_candidates(
            &records.student_responses,
            &records.topic_maps,
            &records.acm_records,
        );
        let slot_holders = resolve_slot_holders(
            &records.supervisor_acms,
            &records.supervisor_responses,
            &records.acm_records,
        );

        tracing::debug!(
            "Resolved {} of {} student responses, {} supervisors",
            candidates.len(),
            records.student_responses.len(),
            slot_holders.len()
        );

        self.allocate_resolved(&candidates, &slot_holders)
    }

    /// Allocate already-resolved candidates over slot-holders
    ///
    /// Slot-holders sharing an identifier are planned as separate slot-holders.
    pub fn allocate_resolved(
        &self,
        candidates: &[Candidate],
        slot_holders: &[SlotHolder],
    ) -> Result<AllocationOutcome, AllocationError> {
        let distinct: HashSet<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        let quotas = fair_quotas(distinct.len(), slot_holders.len())?;

        let first = run_pass(slot_holders, candidates, &quotas);
        let first_assigned = first.assigned_count();

        let plan = if self.options.rebalance {
            match rebalance(&first, candidates) {
                Some(second) => merge_passes(first, second),
                None => first,
            }
        } else {
            first
        };

        let outcome = collate(plan, candidates);

        tracing::info!(
            "Allocated {} of {} students to {} supervisors ({} in first pass, {} rebalanced); {} students and {} supervisors unmatched",
            outcome.summary.assigned_candidates,
            outcome.summary.eligible_candidates,
            outcome.assignments.len(),
            first_assigned,
            outcome.summary.rebalanced_assigned,
            outcome.summary.unmatched_candidates,
            outcome.summary.unmatched_slot_holders
        );

        Ok(outcome)
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::with_default_options()
    }
}
