use std::collections::HashSet;

use crate::core::planner::{order_by_priority, run_pass, AllocationPlan, PlannedSlot};
use crate::models::{Candidate, SlotHolder};

/// Candidates not consumed by any pass so far, in input order
pub fn left_over_candidates(candidates: &[Candidate], consumed: &HashSet<String>) -> Vec<Candidate> {
    candidates
        .iter()
        .filter(|c| !consumed.contains(&c.id))
        .cloned()
        .collect()
}

/// Run the single rebalancing pass over what the first pass left behind
///
/// Left-over candidates are matched against under-subscribed slot-holders
/// only, each with a quota equal to its remaining capacity. When there are
/// more left-over candidates than remaining places, only the first ones (in
/// input order) take part. Returns `None` when there is nothing to rebalance.
pub fn rebalance(first: &AllocationPlan, candidates: &[Candidate]) -> Option<AllocationPlan> {
    let under: Vec<&PlannedSlot> = first.undersubscribed().collect();
    let mut left_over = left_over_candidates(candidates, &first.consumed);

    if under.is_empty() || left_over.is_empty() {
        tracing::debug!(
            "Skipping rebalance ({} under-subscribed supervisors, {} left-over students)",
            under.len(),
            left_over.len()
        );
        return None;
    }

    let quotas: Vec<usize> = under.iter().map(|s| s.remaining_capacity()).collect();
    let total_remaining: usize = quotas.iter().sum();

    if left_over.len() > total_remaining {
        tracing::info!(
            "{} left-over students exceed {} remaining places, {} will stay unmatched",
            left_over.len(),
            total_remaining,
            left_over.len() - total_remaining
        );
        left_over.truncate(total_remaining);
    }

    let holders: Vec<SlotHolder> = under.iter().map(|s| s.slot_holder.clone()).collect();

    tracing::debug!(
        "Rebalancing {} students over {} supervisors",
        left_over.len(),
        holders.len()
    );

    Some(run_pass(&holders, &left_over, &quotas))
}

/// Fold a rebalancing pass into the first pass, slot-holder by slot-holder
///
/// `second` must come from `rebalance(&first, ..)`: its slots line up, in
/// order, with the under-subscribed slots of `first`.
pub fn merge_passes(mut first: AllocationPlan, second: AllocationPlan) -> AllocationPlan {
    let targets = first.slots.iter_mut().filter(|s| s.is_undersubscribed());

    for (slot, extra) in targets.zip(second.slots) {
        debug_assert_eq!(slot.slot_holder.id, extra.slot_holder.id);

        if extra.assigned.is_empty() {
            continue;
        }

        slot.rebalanced += extra.assigned.len();
        slot.assigned.extend(extra.assigned);
        order_by_priority(&mut slot.assigned);
    }

    first.consumed.extend(second.consumed);
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RankedTag;

    fn candidate(id: &str, tags: &[(&str, u8)]) -> Candidate {
        Candidate {
            id: id.to_string(),
            choices: ["c1".to_string(), "c2".to_string(), "c3".to_string()],
            tags: tags.iter().map(|(t, p)| RankedTag::new(*t, *p)).collect(),
            contact: None,
        }
    }

    fn slot_holder(id: &str, tags: &[&str], capacity: u32) -> SlotHolder {
        SlotHolder {
            id: id.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            capacity,
        }
    }

    #[test]
    fn test_left_over_candidates_keep_order() {
        let candidates = vec![
            candidate("s1", &[]),
            candidate("s2", &[]),
            candidate("s3", &[]),
        ];
        let consumed: HashSet<String> = ["s2".to_string()].into_iter().collect();

        let left = left_over_candidates(&candidates, &consumed);

        let ids: Vec<&str> = left.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s3"]);
    }

    #[test]
    fn test_rebalance_fills_remaining_capacity() {
        // v1 stops at its quota of 2; s2 is left over and only fits v1
        let holders = vec![slot_holder("v1", &["ai"], 3), slot_holder("v2", &["db"], 3)];
        let candidates = vec![
            candidate("s1", &[("ai", 1)]),
            candidate("s2", &[("ai", 2)]),
            candidate("s3", &[("ai", 1)]),
            candidate("s4", &[("db", 1)]),
        ];

        let first = run_pass(&holders, &candidates, &[2, 2]);
        assert_eq!(first.slots[0].taken_spaces(), 2);

        let second = rebalance(&first, &candidates).expect("rebalance pass");
        let merged = merge_passes(first, second);

        let v1: Vec<&str> = merged.slots[0].assigned.iter().map(|m| m.candidate_id()).collect();
        assert_eq!(v1, vec!["s1", "s3", "s2"]);
        assert_eq!(merged.slots[0].rebalanced, 1);
        assert_eq!(merged.consumed.len(), 4);
    }

    #[test]
    fn test_rebalance_skipped_when_everyone_placed() {
        let holders = vec![slot_holder("v1", &["ai"], 2)];
        let candidates = vec![candidate("s1", &[("ai", 1)])];

        let first = run_pass(&holders, &candidates, &[1]);

        assert!(rebalance(&first, &candidates).is_none());
    }

    #[test]
    fn test_left_over_truncated_to_remaining_places() {
        // One place left; s2 comes first in input order but cannot match it
        let holders = vec![slot_holder("v1", &["ai"], 1), slot_holder("v2", &["db"], 1)];
        let candidates = vec![
            candidate("s1", &[("ai", 1)]),
            candidate("s2", &[("ai", 1)]),
            candidate("s3", &[("db", 1)]),
        ];

        let first = run_pass(&holders, &candidates, &[1, 0]);
        assert_eq!(first.consumed.len(), 1);

        let second = rebalance(&first, &candidates).expect("rebalance pass");

        assert!(second.consumed.is_empty());
        assert_eq!(second.slots.len(), 1);
        assert_eq!(second.slots[0].slot_holder.id, "v2");
    }

    #[test]
    fn test_merge_keeps_duplicate_slot_holders_apart() {
        // Both holders share an id; s2 can only be placed in the second one
        let holders = vec![slot_holder("v1", &["ai"], 1), slot_holder("v1", &["db"], 2)];
        let candidates = vec![
            candidate("s1", &[("ai", 1)]),
            candidate("s2", &[("db", 1)]),
            candidate("s3", &[("db", 2)]),
        ];

        let first = run_pass(&holders, &candidates, &[2, 1]);
        let second = rebalance(&first, &candidates).expect("rebalance pass");
        let merged = merge_passes(first, second);

        assert_eq!(merged.assigned_count(), 3);
        assert_eq!(merged.slots[0].taken_spaces(), 1);
        assert_eq!(merged.slots[1].taken_spaces(), 2);
        assert_eq!(merged.slots[1].rebalanced, 1);
        assert_eq!(merged.consumed.len(), merged.assigned_count());
    }
}
