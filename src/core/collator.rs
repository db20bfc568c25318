use crate::core::planner::{AllocationPlan, PlannedSlot};
use crate::core::rebalancer::left_over_candidates;
use crate::models::{
    AllocationOutcome, AllocationSummary, Assignment, Candidate, SlotHolderDiagnostic,
    SubscriptionStatus,
};

/// Classify a slot-holder once all passes are merged
pub fn subscription_status(slot: &PlannedSlot) -> SubscriptionStatus {
    let capacity = slot.slot_holder.capacity as usize;

    if slot.taken_spaces() == 0 {
        SubscriptionStatus::Unmatched
    } else if slot.demand > capacity {
        SubscriptionStatus::Oversubscribed
    } else if slot.taken_spaces() >= capacity {
        SubscriptionStatus::Filled
    } else {
        SubscriptionStatus::Undersubscribed
    }
}

fn diagnostic(slot: &PlannedSlot) -> SlotHolderDiagnostic {
    SlotHolderDiagnostic {
        slot_holder_id: slot.slot_holder.id.clone(),
        capacity: slot.slot_holder.capacity,
        taken_spaces: slot.taken_spaces(),
        demand: slot.demand,
        quota: slot.quota,
        exhausted: slot.exhausted,
        first_pass: slot.taken_spaces() - slot.rebalanced,
        rebalanced: slot.rebalanced,
        status: subscription_status(slot),
    }
}

/// Turn the merged plan into assignments, unmatched lists and diagnostics
///
/// `candidates` is the eligible pool the plan was computed over.
pub fn collate(plan: AllocationPlan, candidates: &[Candidate]) -> AllocationOutcome {
    let unmatched_candidates = left_over_candidates(candidates, &plan.consumed);
    let diagnostics: Vec<SlotHolderDiagnostic> = plan.slots.iter().map(diagnostic).collect();

    let summary = AllocationSummary {
        eligible_candidates: candidates.len(),
        slot_holders: plan.slots.len(),
        assigned_candidates: plan.assigned_count(),
        first_pass_assigned: diagnostics.iter().map(|d| d.first_pass).sum(),
        rebalanced_assigned: diagnostics.iter().map(|d| d.rebalanced).sum(),
        unmatched_candidates: unmatched_candidates.len(),
        unmatched_slot_holders: plan.slots.iter().filter(|s| s.assigned.is_empty()).count(),
    };

    let mut assignments = Vec::new();
    let mut unmatched_slot_holders = Vec::new();

    for slot in plan.slots {
        if slot.assigned.is_empty() {
            unmatched_slot_holders.push(slot.slot_holder);
            continue;
        }

        assignments.push(Assignment {
            capacity: slot.slot_holder.capacity,
            taken_spaces: slot.assigned.len(),
            slot_holder: slot.slot_holder,
            matches: slot.assigned,
        });
    }

    AllocationOutcome {
        assignments,
        unmatched_candidates,
        unmatched_slot_holders,
        diagnostics,
        summary,
    }
}
