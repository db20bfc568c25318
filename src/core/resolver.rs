use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{
    Candidate, RankedTag, SlotHolder, StudentResponseRecord, SupervisorAcmRecord,
    SupervisorResponseRecord, TopicMapRecord, CHOICE_ARITY,
};

/// Index from raw topic identifier to the known tags it maps to, in mapping order
pub fn build_choice_index<'a>(
    topic_maps: &'a [TopicMapRecord],
    known_tags: &HashSet<&str>,
) -> HashMap<&'a str, Vec<&'a str>> {
    let mut index: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut unknown = 0usize;

    for map in topic_maps {
        let (Some(topic), Some(tag)) = (map.topic_record_id.as_deref(), map.acm_record_id.as_deref())
        else {
            continue;
        };

        if !known_tags.contains(tag) {
            unknown += 1;
            continue;
        }

        let tags = index.entry(topic).or_default();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    if unknown > 0 {
        tracing::debug!("Skipped {} topic mappings pointing at unknown tags", unknown);
    }

    index
}

/// Rank the tags behind each of a student's choices
///
/// Choice position `p` yields tags with priority `p + 1`. A choice mapping to
/// several tags yields several tags at the same priority; a choice mapping to
/// none yields nothing.
pub fn rank_choices(
    choices: &[String; CHOICE_ARITY],
    choice_index: &HashMap<&str, Vec<&str>>,
) -> Vec<RankedTag> {
    let mut ranked = Vec::new();

    for (position, choice) in choices.iter().enumerate() {
        let priority = (position + 1) as u8;
        if let Some(tags) = choice_index.get(choice.as_str()) {
            ranked.extend(tags.iter().map(|tag| RankedTag::new(*tag, priority)));
        }
    }

    ranked
}

/// Turn raw student responses into candidates
///
/// Responses with no identifier, not marked available, or missing any of the
/// three choices are dropped. Later duplicates of an identifier are dropped.
pub fn resolve_candidates(
    responses: &[StudentResponseRecord],
    topic_maps: &[TopicMapRecord],
    acm_records: &[String],
) -> Vec<Candidate> {
    let known_tags: HashSet<&str> = acm_records.iter().map(String::as_str).collect();
    let choice_index = build_choice_index(topic_maps, &known_tags);

    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates = Vec::with_capacity(responses.len());
    let mut dropped = 0usize;

    for response in responses {
        let Some(id) = response.response_id.as_deref() else {
            dropped += 1;
            continue;
        };

        if !response.available {
            dropped += 1;
            continue;
        }

        let Some(choices) = complete_choices(&response.choices) else {
            tracing::debug!("Dropping student response {}: incomplete choices", id);
            dropped += 1;
            continue;
        };

        if !seen.insert(id) {
            tracing::warn!("Duplicate student response {}, keeping the first", id);
            dropped += 1;
            continue;
        }

        let tags = rank_choices(&choices, &choice_index);
        candidates.push(Candidate {
            id: id.to_string(),
            choices,
            tags,
            contact: response.contact.clone(),
        });
    }

    tracing::debug!(
        "Resolved {} candidates ({} responses dropped)",
        candidates.len(),
        dropped
    );

    candidates
}

fn complete_choices(choices: &[Option<String>; CHOICE_ARITY]) -> Option<[String; CHOICE_ARITY]> {
    let [first, second, third] = choices;
    Some([first.clone()?, second.clone()?, third.clone()?])
}

/// Merge supervisor keyword rows by supervisor identifier
///
/// Returns one entry per distinct identifier in first-seen order, with the
/// union of its known tags. Rows without an identifier are ignored; rows with
/// an absent or unknown tag still register the supervisor.
pub fn merge_supervisor_rows(
    rows: &[SupervisorAcmRecord],
    known_tags: &HashSet<&str>,
) -> Vec<(String, BTreeSet<String>)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut merged: Vec<(String, BTreeSet<String>)> = Vec::new();

    for row in rows {
        let Some(id) = row.response_id.as_deref() else {
            continue;
        };

        let position = *positions.entry(id).or_insert_with(|| {
            merged.push((id.to_string(), BTreeSet::new()));
            merged.len() - 1
        });

        if let Some(tag) = row.acm_record_id.as_deref().filter(|t| known_tags.contains(t)) {
            merged[position].1.insert(tag.to_string());
        }
    }

    merged
}

/// Build slot-holders from keyword rows and capacity rows
///
/// A supervisor without an available capacity row is excluded.
pub fn resolve_slot_holders(
    rows: &[SupervisorAcmRecord],
    capacities: &[SupervisorResponseRecord],
    acm_records: &[String],
) -> Vec<SlotHolder> {
    let known_tags: HashSet<&str> = acm_records.iter().map(String::as_str).collect();

    let capacity_by_id: HashMap<&str, u32> = capacities
        .iter()
        .filter(|r| r.available)
        .filter_map(|r| Some((r.supervisor_id.as_deref()?, r.capacity?)))
        .collect();

    let merged = merge_supervisor_rows(rows, &known_tags);
    let total = merged.len();

    let slot_holders: Vec<SlotHolder> = merged
        .into_iter()
        .filter_map(|(id, tags)| {
            let capacity = *capacity_by_id.get(id.as_str())?;
            Some(SlotHolder { id, tags, capacity })
        })
        .collect();

    if slot_holders.len() < total {
        tracing::warn!(
            "{} supervisors excluded for missing or unavailable capacity",
            total - slot_holders.len()
        );
    }

    slot_holders
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(id: &str, choices: [Option<&str>; 3]) -> StudentResponseRecord {
        StudentResponseRecord {
            response_id: Some(id.to_string()),
            choices: choices.map(|c| c.map(str::to_string)),
            contact: None,
            available: true,
        }
    }

    fn topic_map(topic: &str, tag: &str) -> TopicMapRecord {
        TopicMapRecord {
            topic_map_id: None,
            topic_record_id: Some(topic.to_string()),
            acm_record_id: Some(tag.to_string()),
        }
    }

    fn acm(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_priorities_follow_choice_order() {
        let maps = vec![topic_map("t1", "ai"), topic_map("t2", "db"), topic_map("t3", "hci")];
        let students = vec![response("s1", [Some("t3"), Some("t1"), Some("t2")])];

        let candidates = resolve_candidates(&students, &maps, &acm(&["ai", "db", "hci"]));

        assert_eq!(candidates.len(), 1);
        assert_eq!(
            candidates[0].tags,
            vec![RankedTag::new("hci", 1), RankedTag::new("ai", 2), RankedTag::new("db", 3)]
        );
    }

    #[test]
    fn test_choice_mapping_to_several_tags_shares_priority() {
        let maps = vec![topic_map("t1", "ai"), topic_map("t1", "ml"), topic_map("t2", "db")];
        let students = vec![response("s1", [Some("t1"), Some("t2"), Some("t9")])];

        let candidates = resolve_candidates(&students, &maps, &acm(&["ai", "ml", "db"]));

        assert_eq!(
            candidates[0].tags,
            vec![RankedTag::new("ai", 1), RankedTag::new("ml", 1), RankedTag::new("db", 2)]
        );
    }

    #[test]
    fn test_incomplete_response_dropped() {
        let maps = vec![topic_map("t1", "ai")];
        let students = vec![
            response("s1", [Some("t1"), Some("t1"), None]),
            response("s2", [Some("t1"), Some("t1"), Some("t1")]),
        ];

        let candidates = resolve_candidates(&students, &maps, &acm(&["ai"]));

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "s2");
    }

    #[test]
    fn test_unknown_tags_resolve_to_nothing() {
        let maps = vec![topic_map("t1", "retired")];
        let students = vec![response("s1", [Some("t1"), Some("t1"), Some("t1")])];

        let candidates = resolve_candidates(&students, &maps, &acm(&["ai"]));

        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].tags.is_empty());
    }

    #[test]
    fn test_unavailable_and_duplicate_responses_dropped() {
        let mut away = response("s1", [Some("t1"), Some("t1"), Some("t1")]);
        away.available = false;
        let students = vec![
            away,
            response("s2", [Some("t1"), Some("t1"), Some("t1")]),
            response("s2", [Some("t2"), Some("t2"), Some("t2")]),
        ];

        let candidates = resolve_candidates(&students, &[], &[]);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].choices[0], "t1");
    }

    #[test]
    fn test_supervisor_rows_merged_by_id() {
        let rows = vec![
            SupervisorAcmRecord { response_id: Some("v1".into()), acm_record_id: Some("ai".into()) },
            SupervisorAcmRecord { response_id: Some("v2".into()), acm_record_id: Some("db".into()) },
            SupervisorAcmRecord { response_id: Some("v1".into()), acm_record_id: Some("ml".into()) },
            SupervisorAcmRecord { response_id: Some("v1".into()), acm_record_id: Some("ai".into()) },
        ];
        let known: HashSet<&str> = ["ai", "ml", "db"].into_iter().collect();

        let merged = merge_supervisor_rows(&rows, &known);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].0, "v1");
        assert_eq!(
            merged[0].1,
            ["ai", "ml"].iter().map(|s| s.to_string()).collect::<BTreeSet<String>>()
        );
        assert_eq!(merged[1].0, "v2");
    }

    #[test]
    fn test_slot_holder_without_capacity_excluded() {
        let rows = vec![
            SupervisorAcmRecord { response_id: Some("v1".into()), acm_record_id: Some("ai".into()) },
            SupervisorAcmRecord { response_id: Some("v2".into()), acm_record_id: Some("ai".into()) },
            SupervisorAcmRecord { response_id: Some("v3".into()), acm_record_id: Some("ai".into()) },
        ];
        let capacities = vec![
            SupervisorResponseRecord { supervisor_id: Some("v1".into()), capacity: Some(2), available: true },
            SupervisorResponseRecord { supervisor_id: Some("v2".into()), capacity: None, available: true },
            SupervisorResponseRecord { supervisor_id: Some("v3".into()), capacity: Some(4), available: false },
        ];

        let holders = resolve_slot_holders(&rows, &capacities, &acm(&["ai"]));

        assert_eq!(holders.len(), 1);
        assert_eq!(holders[0].id, "v1");
        assert_eq!(holders[0].capacity, 2);
    }
}
