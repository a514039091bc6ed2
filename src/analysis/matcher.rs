//! Tender classification against the watchlists.
//!
//! Titles are checked against the keyword list and entity names against
//! the monitored-entity list, both as case-insensitive substring tests.

use super::watchlist::Watchlists;
use crate::models::{MatchResult, TenderRecord};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Classify one tender.
///
/// Returns `None` when neither the title nor the entity name hits a
/// watchlist; such tenders are dropped from the output entirely.
pub fn classify(record: &TenderRecord, watchlists: &Watchlists) -> Option<MatchResult> {
    let title = record.title().to_lowercase();
    let entity = record.entity().to_lowercase();

    let matched_keywords = watchlists.keywords().find_in(&title);
    let matched_entities = watchlists.entities().find_in(&entity);

    if matched_keywords.is_empty() && matched_entities.is_empty() {
        return None;
    }

    let match_reason = build_match_reason(&matched_keywords, &matched_entities);

    Some(MatchResult {
        record: record.clone(),
        keyword_matched: !matched_keywords.is_empty(),
        entity_matched: !matched_entities.is_empty(),
        matched_keywords,
        matched_entities,
        match_reason,
        scraped_at: None,
    })
}

/// Build the `Keywords: ...; Entity: ...` explanation.
///
/// Absent clauses are omitted; the keyword clause always comes first.
pub fn build_match_reason(keywords: &[String], entities: &[String]) -> String {
    let mut reasons = Vec::with_capacity(2);

    if !keywords.is_empty() {
        reasons.push(format!("Keywords: {}", keywords.join(", ")));
    }
    if !entities.is_empty() {
        reasons.push(format!("Entity: {}", entities.join(", ")));
    }

    reasons.join("; ")
}

/// Classify a sequence of tenders, keeping only matches in input order.
///
/// When `scraped_at` is given, every match carries the same timestamp.
pub fn filter_tenders(
    records: &[TenderRecord],
    watchlists: &Watchlists,
    scraped_at: Option<DateTime<Utc>>,
) -> Vec<MatchResult> {
    let matches: Vec<MatchResult> = records
        .iter()
        .filter_map(|record| {
            let result = classify(record, watchlists);
            match result {
                Some(ref m) => debug!("Matched {}: {}", record.tender_no(), m.match_reason),
                None => debug!("No match for {}", record.tender_no()),
            }
            result
        })
        .map(|mut m| {
            m.scraped_at = scraped_at;
            m
        })
        .collect();

    debug!(
        "Filtered {} of {} tenders",
        matches.len(),
        records.len()
    );

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn default_watchlists() -> Watchlists {
        Config::default().watchlists().unwrap()
    }

    fn small_watchlists() -> Watchlists {
        Watchlists::new(["cloud", "ai", "gpu"], ["bank muscat", "ministry"]).unwrap()
    }

    #[test]
    fn test_keyword_and_entity_match_with_default_watchlists() {
        let record = TenderRecord::new(
            "T-100",
            "Cloud Migration Services for Data Center",
            "Ministry of Finance",
            "2024-02-01",
        );

        let result = classify(&record, &default_watchlists()).unwrap();

        assert!(result.keyword_matched);
        assert!(result.entity_matched);
        assert_eq!(
            result.matched_keywords,
            vec!["cloud", "migration", "data center"]
        );
        assert_eq!(
            result.matched_entities,
            vec!["ministry of finance", "ministry"]
        );
        assert_eq!(
            result.match_reason,
            "Keywords: cloud, migration, data center; Entity: ministry of finance, ministry"
        );
    }

    #[test]
    fn test_every_default_keyword_is_found_in_a_title() {
        let config = Config::default();
        let watchlists = config.watchlists().unwrap();

        for keyword in &config.watchlist.keywords {
            for title in [
                keyword.to_uppercase(),
                format!("Tender for {} services", keyword),
                format!("{}-related works", keyword.to_uppercase()),
            ] {
                let record = TenderRecord::new("T-1", title.as_str(), "Unlisted Trading LLC", "");
                let result = classify(&record, &watchlists)
                    .unwrap_or_else(|| panic!("no match for title {:?}", title));

                assert!(result.keyword_matched);
                assert!(
                    result.matched_keywords.contains(keyword),
                    "{:?} missing from {:?}",
                    keyword,
                    result.matched_keywords
                );
                assert!(result.match_reason.starts_with("Keywords: "));
            }
        }
    }

    #[test]
    fn test_unrelated_tender_is_excluded() {
        let record = TenderRecord::new(
            "T-101",
            "Office Furniture Supply",
            "Al Noor Trading LLC",
            "2024-02-01",
        );
        assert!(classify(&record, &default_watchlists()).is_none());
    }

    #[test]
    fn test_empty_entity_still_matches_on_keyword() {
        let record = TenderRecord::new("T-102", "AI chatbot", "", "2024-02-01");

        let result = classify(&record, &default_watchlists()).unwrap();

        assert!(result.keyword_matched);
        assert!(!result.entity_matched);
        assert!(result.matched_keywords.contains(&"ai".to_string()));
        assert!(result.matched_keywords.contains(&"chatbot".to_string()));
        assert_eq!(result.entity(), "");
        assert_eq!(result.match_reason, "Keywords: chatbot, ai");
    }

    #[test]
    fn test_entity_only_match_reason() {
        let record = TenderRecord::new("T-103", "Office desks", "Bank Muscat SAOG", "");
        let result = classify(&record, &small_watchlists()).unwrap();

        assert!(!result.keyword_matched);
        assert!(result.entity_matched);
        assert_eq!(result.match_reason, "Entity: bank muscat");
    }

    #[test]
    fn test_overlapping_keywords_are_all_reported() {
        let watchlists = Watchlists::new(["cloud", "cloud computing"], Vec::<String>::new()).unwrap();
        let record = TenderRecord::new("T-104", "Cloud Computing Framework", "X", "");

        let result = classify(&record, &watchlists).unwrap();
        assert_eq!(result.matched_keywords, vec!["cloud", "cloud computing"]);
    }

    #[test]
    fn test_empty_title_and_entity_do_not_match() {
        let record = TenderRecord::new("T-105", "", "", "");
        assert!(classify(&record, &small_watchlists()).is_none());
    }

    #[test]
    fn test_classify_is_idempotent() {
        let watchlists = small_watchlists();
        let record = TenderRecord::new("T-106", "GPU cloud", "Ministry of Health", "");
        assert_eq!(classify(&record, &watchlists), classify(&record, &watchlists));
    }

    #[test]
    fn test_build_match_reason_clauses() {
        assert_eq!(build_match_reason(&[], &[]), "");
        assert_eq!(
            build_match_reason(&["gpu".to_string(), "llm".to_string()], &[]),
            "Keywords: gpu, llm"
        );
        assert_eq!(
            build_match_reason(&["gpu".to_string()], &["omantel".to_string()]),
            "Keywords: gpu; Entity: omantel"
        );
    }

    #[test]
    fn test_filter_tenders_keeps_order_and_stamps_time() {
        let records = vec![
            TenderRecord::new("1", "GPU servers", "Omantel", ""),
            TenderRecord::new("2", "Catering", "Al Noor Trading", ""),
            TenderRecord::new("3", "Road works", "Ministry of Transport", ""),
        ];
        let now = Utc::now();

        let matches = filter_tenders(&records, &small_watchlists(), Some(now));

        let ids: Vec<&str> = matches.iter().map(|m| m.record.tender_no()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(matches.iter().all(|m| m.scraped_at == Some(now)));
    }

    #[test]
    fn test_filter_tenders_without_timestamp() {
        let records = vec![TenderRecord::new("1", "Cloud", "", "")];
        let matches = filter_tenders(&records, &small_watchlists(), None);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].scraped_at.is_none());
    }

    #[test]
    fn test_filter_tenders_empty_input() {
        assert!(filter_tenders(&[], &small_watchlists(), None).is_empty());
    }
}
