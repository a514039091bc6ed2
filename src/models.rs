//! Data models for the tender watcher.
//!
//! This module contains the core data structures used throughout
//! the application for representing tenders, matches and grouped results.

use crate::error::TenderError;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Input field holding the tender identifier.
pub const TENDER_NO_FIELD: &str = "Tender No";
/// Input field holding the tender title.
pub const TITLE_FIELD: &str = "Tender Title";
/// Input field holding the issuing entity.
pub const ENTITY_FIELD: &str = "Entity";
/// Input field holding the publication date.
pub const DATE_FIELD: &str = "Date";
/// Output field added to every matched tender.
pub const MATCH_REASON_FIELD: &str = "Match_Reason";
/// Optional output field stamped with the run time.
pub const SCRAPED_AT_FIELD: &str = "Scraped_At";

/// What to do with an input record that lacks a usable title or entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Stop the run at the first malformed record (default)
    #[default]
    Abort,
    /// Log the record and continue without it
    Skip,
}

/// A single tender notice as read from the input.
///
/// The typed fields are extracted once; `fields` keeps the complete
/// original object, in input order, so every passthrough field survives
/// into the output.
#[derive(Debug, Clone, PartialEq)]
pub struct TenderRecord {
    tender_no: String,
    title: String,
    entity: String,
    date: String,
    fields: Map<String, Value>,
}

impl TenderRecord {
    /// Creates a record from its four core fields.
    #[cfg(test)]
    pub fn new(
        tender_no: impl Into<String>,
        title: impl Into<String>,
        entity: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        let tender_no = tender_no.into();
        let title = title.into();
        let entity = entity.into();
        let date = date.into();

        let mut fields = Map::new();
        fields.insert(TENDER_NO_FIELD.to_string(), Value::String(tender_no.clone()));
        fields.insert(TITLE_FIELD.to_string(), Value::String(title.clone()));
        fields.insert(ENTITY_FIELD.to_string(), Value::String(entity.clone()));
        fields.insert(DATE_FIELD.to_string(), Value::String(date.clone()));

        Self {
            tender_no,
            title,
            entity,
            date,
            fields,
        }
    }

    /// Adds a passthrough field. Core fields cannot be overwritten this way.
    #[cfg(test)]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if ![TENDER_NO_FIELD, TITLE_FIELD, ENTITY_FIELD, DATE_FIELD].contains(&key.as_str()) {
            self.fields.insert(key, value);
        }
        self
    }

    /// Builds a record from a raw JSON value.
    ///
    /// `position` is the 1-based index in the input array and identifies
    /// the record in errors when it carries no `Tender No`.
    pub fn from_value(position: usize, value: Value) -> Result<Self, TenderError> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(TenderError::malformed(
                    format!("#{}", position),
                    format!("expected a JSON object, found {}", json_type_name(&other)),
                ))
            }
        };

        let tender_no = match fields.get(TENDER_NO_FIELD) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => format!("#{}", position),
        };

        let title = required_string(&fields, TITLE_FIELD, &tender_no)?;
        let entity = required_string(&fields, ENTITY_FIELD, &tender_no)?;

        let date = match fields.get(DATE_FIELD) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        Ok(Self {
            tender_no,
            title,
            entity,
            date,
            fields,
        })
    }

    pub fn tender_no(&self) -> &str {
        &self.tender_no
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// All fields of the original record, in input order.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl Serialize for TenderRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

fn required_string(
    fields: &Map<String, Value>,
    field: &str,
    id: &str,
) -> Result<String, TenderError> {
    match fields.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(TenderError::malformed(
            id,
            format!(
                "field \"{}\" must be a string, found {}",
                field,
                json_type_name(other)
            ),
        )),
        None => Err(TenderError::malformed(
            id,
            format!("missing field \"{}\"", field),
        )),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A tender that matched at least one watchlist, with the reason why.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// The matched tender, unchanged.
    pub record: TenderRecord,
    /// Whether any keyword occurs in the title.
    pub keyword_matched: bool,
    /// Whether any monitored entity occurs in the entity name.
    pub entity_matched: bool,
    /// Matching keywords, in watchlist order.
    pub matched_keywords: Vec<String>,
    /// Matching monitored entities, in watchlist order.
    pub matched_entities: Vec<String>,
    /// Human-readable explanation, e.g. `Keywords: cloud; Entity: ministry`.
    pub match_reason: String,
    /// Run timestamp, emitted as `Scraped_At` when present.
    pub scraped_at: Option<DateTime<Utc>>,
}

impl MatchResult {
    /// The entity name as found in the source record.
    pub fn entity(&self) -> &str {
        self.record.entity()
    }
}

impl Serialize for MatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        // Stale values from a previous run are replaced, not duplicated.
        for (key, value) in self.record.fields() {
            if key != MATCH_REASON_FIELD && key != SCRAPED_AT_FIELD {
                map.serialize_entry(key, value)?;
            }
        }

        map.serialize_entry(MATCH_REASON_FIELD, &self.match_reason)?;
        if let Some(ref scraped_at) = self.scraped_at {
            map.serialize_entry(SCRAPED_AT_FIELD, scraped_at)?;
        }

        map.end()
    }
}

/// Matches grouped by entity name, in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EntityGroups {
    groups: IndexMap<String, Vec<MatchResult>>,
}

impl EntityGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a match under `key`, creating the entry on first use.
    pub fn push(&mut self, key: String, result: MatchResult) {
        self.groups.entry(key).or_default().push(result);
    }

    /// Total number of matches across all entities.
    pub fn total_matches(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Number of distinct entity keys.
    pub fn entity_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, entity: &str) -> Option<&[MatchResult]> {
        self.groups.get(entity).map(Vec::as_slice)
    }

    /// Iterates entities and their matches in key insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[MatchResult])> {
        self.groups
            .iter()
            .map(|(entity, matches)| (entity.as_str(), matches.as_slice()))
    }

    /// Flattens the groups back into a sequence, in key order.
    #[cfg(test)]
    pub fn into_matches(self) -> Vec<MatchResult> {
        self.groups.into_values().flatten().collect()
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records present in the input.
    pub total_records: usize,
    /// Malformed records dropped under the skip policy.
    pub skipped_records: usize,
    /// Records that matched at least one watchlist.
    pub matched_tenders: usize,
    /// Distinct entity keys among the matches.
    pub unique_entities: usize,
}
