use std::collections::HashSet;

use crate::core::error::AllocationError;
use crate::core::overlap::{find_overlaps, OverlapResult};
use crate::models::{Candidate, MatchRecord, SlotHolder};

/// One slot-holder's share of an allocation pass
#[derive(Debug, Clone)]
pub struct PlannedSlot {
    pub slot_holder: SlotHolder,
    /// Places granted by the quota policy for this pass
    pub quota: usize,
    /// Distinct overlapping candidates before truncation
    pub demand: usize,
    /// Assigned records, best priority first
    pub assigned: Vec<MatchRecord>,
    /// Nothing was left to assign once earlier slot-holders had taken their share
    pub exhausted: bool,
    /// How many of `assigned` came from the rebalancing pass
    pub rebalanced: usize,
}

impl PlannedSlot {
    pub fn taken_spaces(&self) -> usize {
        self.assigned.len()
    }

    pub fn remaining_capacity(&self) -> usize {
        (self.slot_holder.capacity as usize).saturating_sub(self.taken_spaces())
    }

    pub fn is_undersubscribed(&self) -> bool {
        self.remaining_capacity() > 0
    }
}

/// Result of one allocation pass
#[derive(Debug, Clone, Default)]
pub struct AllocationPlan {
    /// One entry per slot-holder, in input order
    pub slots: Vec<PlannedSlot>,
    /// Identifiers of every candidate assigned in the pass
    pub consumed: HashSet<String>,
}

impl AllocationPlan {
    pub fn undersubscribed(&self) -> impl Iterator<Item = &PlannedSlot> {
        self.slots.iter().filter(|s| s.is_undersubscribed())
    }

    pub fn assigned_count(&self) -> usize {
        self.slots.iter().map(PlannedSlot::taken_spaces).sum()
    }
}

/// Even split of `candidate_count` over `slot_holder_count`
///
/// Every slot-holder gets `floor(N / S)`; the first `N mod S` get one more.
pub fn fair_quotas(
    candidate_count: usize,
    slot_holder_count: usize,
) -> Result<Vec<usize>, AllocationError> {
    if slot_holder_count == 0 {
        return Err(AllocationError::Configuration(
            "no supervisors available, quota is undefined".to_string(),
        ));
    }

    let base = candidate_count / slot_holder_count;
    let remainder = candidate_count % slot_holder_count;

    Ok((0..slot_holder_count)
        .map(|index| base + usize::from(index < remainder))
        .collect())
}

/// Lowest best-priority first; equal priorities keep discovery order
#[inline]
pub fn order_by_priority(matches: &mut [MatchRecord]) {
    matches.sort_by_key(|m| m.best_priority);
}

/// Distribute matches over slot-holders in order
///
/// Each slot-holder takes up to `min(quota, capacity)` of its best-priority
/// matches that no earlier slot-holder in this pass has taken.
pub fn plan_allocation(overlaps: Vec<(SlotHolder, OverlapResult)>, quotas: &[usize]) -> AllocationPlan {
    debug_assert_eq!(overlaps.len(), quotas.len());

    let mut consumed: HashSet<String> = HashSet::new();
    let mut slots = Vec::with_capacity(overlaps.len());

    for ((slot_holder, overlap), &quota) in overlaps.into_iter().zip(quotas) {
        let OverlapResult { mut matches, demand } = overlap;
        order_by_priority(&mut matches);

        let remaining: Vec<MatchRecord> = matches
            .into_iter()
            .filter(|m| !consumed.contains(m.candidate_id()))
            .collect();
        let exhausted = remaining.is_empty();

        let limit = quota.min(slot_holder.capacity as usize);
        let assigned: Vec<MatchRecord> = remaining.into_iter().take(limit).collect();

        for record in &assigned {
            consumed.insert(record.candidate.id.clone());
        }

        tracing::debug!(
            "Supervisor {}: demand {}, quota {}, assigned {}",
            slot_holder.id,
            demand,
            limit,
            assigned.len()
        );

        slots.push(PlannedSlot {
            slot_holder,
            quota,
            demand,
            assigned,
            exhausted,
            rebalanced: 0,
        });
    }

    AllocationPlan { slots, consumed }
}

/// Match every slot-holder against the candidates and plan one pass
pub fn run_pass(
    slot_holders: &[SlotHolder],
    candidates: &[Candidate],
    quotas: &[usize],
) -> AllocationPlan {
    let overlaps = slot_holders
        .iter()
        .map(|holder| (holder.clone(), find_overlaps(holder, candidates)))
        .collect();

    plan_allocation(overlaps, quotas)
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

    fn ids(slot: &PlannedSlot) -> Vec<&str> {
        slot.assigned.iter().map(MatchRecord::candidate_id).collect()
    }

    #[test]
    fn test_fair_quotas_distribute_remainder_first() {
        assert_eq!(fair_quotas(7, 3).unwrap(), vec![3, 2, 2]);
        assert_eq!(fair_quotas(2, 4).unwrap(), vec![1, 1, 0, 0]);
        assert_eq!(fair_quotas(0, 2).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_fair_quotas_reject_zero_slot_holders() {
        assert!(matches!(
            fair_quotas(5, 0),
            Err(AllocationError::Configuration(_))
        ));
    }

    #[test]
    fn test_best_priority_taken_first() {
        let holders = vec![slot_holder("v1", &["ai"], 1)];
        let candidates = vec![
            candidate("s1", &[("ai", 3)]),
            candidate("s2", &[("ai", 1)]),
            candidate("s3", &[("ai", 2)]),
        ];

        let plan = run_pass(&holders, &candidates, &[3]);

        assert_eq!(ids(&plan.slots[0]), vec!["s2"]);
        assert_eq!(plan.slots[0].demand, 3);
    }

    #[test]
    fn test_equal_priorities_keep_discovery_order() {
        let holders = vec![slot_holder("v1", &["ai"], 3)];
        let candidates = vec![
            candidate("s1", &[("ai", 2)]),
            candidate("s2", &[("ai", 1)]),
            candidate("s3", &[("ai", 2)]),
            candidate("s4", &[("ai", 1)]),
        ];

        let plan = run_pass(&holders, &candidates, &[3]);

        assert_eq!(ids(&plan.slots[0]), vec!["s2", "s4", "s1"]);
    }

    #[test]
    fn test_no_candidate_taken_twice_in_a_pass() {
        let holders = vec![slot_holder("v1", &["ai"], 5), slot_holder("v2", &["ai"], 5)];
        let candidates = vec![candidate("s1", &[("ai", 1)]), candidate("s2", &[("ai", 1)])];

        let plan = run_pass(&holders, &candidates, &[1, 1]);

        assert_eq!(ids(&plan.slots[0]), vec!["s1"]);
        assert_eq!(ids(&plan.slots[1]), vec!["s2"]);
        assert_eq!(plan.consumed.len(), 2);
    }

    #[test]
    fn test_exhausted_slot_holder_flagged() {
        let holders = vec![slot_holder("v1", &["ai"], 5), slot_holder("v2", &["ai"], 5)];
        let candidates = vec![candidate("s1", &[("ai", 1)])];

        let plan = run_pass(&holders, &candidates, &[1, 1]);

        assert!(!plan.slots[0].exhausted);
        assert!(plan.slots[1].exhausted);
        assert!(plan.slots[1].assigned.is_empty());
        assert_eq!(plan.undersubscribed().count(), 2);
    }

    #[test]
    fn test_quota_capped_at_capacity() {
        let holders = vec![slot_holder("v1", &["ai"], 2)];
        let candidates: Vec<Candidate> = (0..5)
            .map(|i| candidate(&format!("s{}", i), &[("ai", 1)]))
            .collect();

        let plan = run_pass(&holders, &candidates, &[5]);

        assert_eq!(plan.slots[0].taken_spaces(), 2);
        assert_eq!(plan.slots[0].remaining_capacity(), 0);
        assert!(!plan.slots[0].is_undersubscribed());
    }
}
