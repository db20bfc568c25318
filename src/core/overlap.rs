use std::collections::HashMap;

use crate::models::{Candidate, MatchRecord, SlotHolder};

/// Candidates sharing at least one tag with a slot-holder
#[derive(Debug, Clone)]
pub struct OverlapResult {
    /// One record per distinct candidate, in candidate input order
    pub matches: Vec<MatchRecord>,
    /// Distinct matching candidates before any quota is applied
    pub demand: usize,
}

/// Find every candidate whose ranked tags intersect the slot-holder's tags
///
/// Shared tags are recorded in the order they are discovered, which follows
/// the candidate's priority order.
pub fn find_overlaps(slot_holder: &SlotHolder, candidates: &[Candidate]) -> OverlapResult {
    let mut matches: Vec<MatchRecord> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for candidate in candidates {
        for ranked in &candidate.tags {
            if !slot_holder.supports(&ranked.tag) {
                continue;
            }

            match positions.get(candidate.id.as_str()) {
                Some(&position) => matches[position].push_tag(ranked.clone()),
                None => {
                    positions.insert(candidate.id.as_str(), matches.len());
                    matches.push(MatchRecord::new(
                        candidate.clone(),
                        slot_holder.id.clone(),
                        ranked.clone(),
                    ));
                }
            }
        }
    }

    let demand = matches.len();
    OverlapResult { matches, demand }
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
    fn test_one_record_per_candidate() {
        let holder = slot_holder("v1", &["ai", "ml"], 3);
        let candidates = vec![
            candidate("s1", &[("ai", 1), ("db", 2), ("ml", 3)]),
            candidate("s2", &[("db", 1)]),
            candidate("s3", &[("ml", 2)]),
        ];

        let result = find_overlaps(&holder, &candidates);

        assert_eq!(result.demand, 2);
        assert_eq!(result.matches[0].candidate_id(), "s1");
        assert_eq!(
            result.matches[0].shared_tags,
            vec![RankedTag::new("ai", 1), RankedTag::new("ml", 3)]
        );
        assert_eq!(result.matches[0].best_priority, 1);
        assert_eq!(result.matches[1].candidate_id(), "s3");
        assert_eq!(result.matches[1].best_priority, 2);
        assert_eq!(result.matches[1].slot_holder_id, "v1");
    }

    #[test]
    fn test_candidate_without_tags_never_matches() {
        let holder = slot_holder("v1", &["ai"], 1);
        let candidates = vec![candidate("s1", &[])];

        let result = find_overlaps(&holder, &candidates);

        assert!(result.matches.is_empty());
        assert_eq!(result.demand, 0);
    }
}
