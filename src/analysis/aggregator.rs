//! Match aggregation and statistics.
//!
//! This module groups matched tenders by issuing entity and computes the
//! counters shown in the run summary and the report.

use crate::models::{EntityGroups, MatchResult, RunSummary};
use std::collections::HashMap;

/// Group matches by entity name exactly as it appears in each record.
///
/// Keys appear in first-occurrence order and each entity's matches keep
/// their relative input order. Names differing only in case or spacing
/// are distinct keys.
pub fn group_by_entity(matches: Vec<MatchResult>) -> EntityGroups {
    let mut grouped = EntityGroups::new();

    for result in matches {
        let key = result.entity().to_string();
        grouped.push(key, result);
    }

    grouped
}

/// Group matches by normalized entity name.
///
/// Names that are equal after [`normalize_entity_name`] share one key,
/// displayed with the spelling seen first.
pub fn group_by_entity_normalized(matches: Vec<MatchResult>) -> EntityGroups {
    let mut grouped = EntityGroups::new();
    let mut display_names: HashMap<String, String> = HashMap::new();

    for result in matches {
        let key = display_names
            .entry(normalize_entity_name(result.entity()))
            .or_insert_with(|| result.entity().to_string())
            .clone();
        grouped.push(key, result);
    }

    grouped
}

/// Lower-case, trim and collapse internal whitespace runs to one space.
pub fn normalize_entity_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Per-entity match counts, in group order.
pub fn entity_counts(groups: &EntityGroups) -> Vec<(&str, usize)> {
    groups
        .iter()
        .map(|(entity, matches)| (entity, matches.len()))
        .collect()
}

/// Build the run counters from the input size and the grouped result.
pub fn summarize(total_records: usize, skipped_records: usize, groups: &EntityGroups) -> RunSummary {
    RunSummary {
        total_records,
        skipped_records,
        matched_tenders: groups.total_matches(),
        unique_entities: groups.entity_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TenderRecord;

    fn create_test_match(tender_no: &str, entity: &str) -> MatchResult {
        MatchResult {
            record: TenderRecord::new(tender_no, "Cloud platform", entity, "2024-01-01"),
            keyword_matched: true,
            entity_matched: false,
            matched_keywords: vec!["cloud".to_string()],
            matched_entities: Vec::new(),
            match_reason: "Keywords: cloud".to_string(),
            scraped_at: None,
        }
    }

    #[test]
    fn test_group_same_entity_keeps_order() {
        let matches = vec![
            create_test_match("A", "Bank Muscat"),
            create_test_match("B", "Bank Muscat"),
        ];

        let grouped = group_by_entity(matches);

        assert_eq!(grouped.entity_count(), 1);
        let ids: Vec<&str> = grouped
            .get("Bank Muscat")
            .unwrap()
            .iter()
            .map(|m| m.record.tender_no())
            .collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn test_group_key_order_is_first_occurrence() {
        let matches = vec![
            create_test_match("1", "Omantel"),
            create_test_match("2", "Bank Dhofar"),
            create_test_match("3", "Omantel"),
            create_test_match("4", "Ooredoo"),
        ];

        let grouped = group_by_entity(matches);
        let keys: Vec<&str> = grouped.iter().map(|(entity, _)| entity).collect();
        assert_eq!(keys, vec!["Omantel", "Bank Dhofar", "Ooredoo"]);
    }

    #[test]
    fn test_group_does_not_normalize_by_default() {
        let matches = vec![
            create_test_match("1", "Bank Muscat"),
            create_test_match("2", "BANK MUSCAT"),
            create_test_match("3", "Bank  Muscat "),
        ];

        let grouped = group_by_entity(matches);
        assert_eq!(grouped.entity_count(), 3);
    }

    #[test]
    fn test_group_empty_entity_name_is_a_key() {
        let grouped = group_by_entity(vec![create_test_match("1", "")]);
        assert_eq!(grouped.get("").map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_grouping_preserves_every_match() {
        let matches = vec![
            create_test_match("1", "Omantel"),
            create_test_match("2", "Bank Dhofar"),
            create_test_match("3", "Omantel"),
        ];

        let flattened = group_by_entity(matches.clone()).into_matches();

        assert_eq!(flattened.len(), matches.len());
        for m in &matches {
            assert!(flattened.contains(m));
        }
    }

    #[test]
    fn test_group_normalized_merges_spelling_variants() {
        let matches = vec![
            create_test_match("1", "Bank Muscat"),
            create_test_match("2", "Omantel"),
            create_test_match("3", " BANK   muscat"),
        ];

        let grouped = group_by_entity_normalized(matches);

        assert_eq!(grouped.entity_count(), 2);
        let keys: Vec<&str> = grouped.iter().map(|(entity, _)| entity).collect();
        assert_eq!(keys, vec!["Bank Muscat", "Omantel"]);
        assert_eq!(grouped.get("Bank Muscat").map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_normalize_entity_name() {
        assert_eq!(normalize_entity_name("  Royal   Oman\tPolice "), "royal oman police");
        assert_eq!(normalize_entity_name(""), "");
    }

    #[test]
    fn test_entity_counts_and_summary() {
        let grouped = group_by_entity(vec![
            create_test_match("1", "Omantel"),
            create_test_match("2", "Bank Dhofar"),
            create_test_match("3", "Omantel"),
        ]);

        assert_eq!(
            entity_counts(&grouped),
            vec![("Omantel", 2), ("Bank Dhofar", 1)]
        );

        let summary = summarize(10, 1, &grouped);
        assert_eq!(summary.total_records, 10);
        assert_eq!(summary.skipped_records, 1);
        assert_eq!(summary.matched_tenders, 3);
        assert_eq!(summary.unique_entities, 2);
    }
}
