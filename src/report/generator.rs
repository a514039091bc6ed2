//! Text and JSON report generation.
//!
//! This module renders the entity-grouped matches as a plain-text report
//! for people and as a JSON document for downstream tooling.

use crate::analysis::entity_counts;
use crate::models::{EntityGroups, MatchResult};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

const RULE_WIDTH: usize = 50;

/// Label printed for tenders whose entity field is empty.
const UNNAMED_ENTITY: &str = "(no entity)";

/// Presentation settings for the text report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// First line of the report.
    pub title: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "OMAN TENDER BOARD SCRAPING REPORT".to_string(),
        }
    }
}

/// Generate the complete text report.
///
/// Entities appear in group order; `generated_at` only feeds the header.
pub fn generate_text_report(
    groups: &EntityGroups,
    options: &ReportOptions,
    generated_at: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    output.push_str(&generate_header(options, generated_at));
    output.push_str(&generate_summary_section(groups));
    output.push_str(&generate_entity_list_section(groups));
    output.push_str(&generate_details_section(groups));

    output
}

fn generate_header(options: &ReportOptions, generated_at: DateTime<Utc>) -> String {
    let mut header = String::new();

    header.push_str(&options.title);
    header.push('\n');
    header.push_str(&format!(
        "Generated: {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    header.push_str(&"=".repeat(RULE_WIDTH));
    header.push_str("\n\n");

    header
}

fn generate_summary_section(groups: &EntityGroups) -> String {
    let mut section = String::new();

    section.push_str("SUMMARY:\n");
    section.push_str(&format!(
        "- Total filtered tenders: {}\n",
        groups.total_matches()
    ));
    section.push_str(&format!("- Unique entities: {}\n\n", groups.entity_count()));

    section
}

fn generate_entity_list_section(groups: &EntityGroups) -> String {
    let mut section = String::new();

    section.push_str("ENTITIES WITH MATCHING TENDERS:\n");

    if groups.is_empty() {
        section.push_str("- No matching tenders found.\n");
        return section;
    }

    for (entity, count) in entity_counts(groups) {
        section.push_str(&format!("- {}: {} tender(s)\n", display_name(entity), count));
    }

    section
}

fn generate_details_section(groups: &EntityGroups) -> String {
    let mut section = String::new();

    section.push_str("\nDETAILED RESULTS:\n");
    section.push_str(&"=".repeat(RULE_WIDTH));
    section.push('\n');

    for (entity, matches) in groups.iter() {
        let heading = display_name(entity).to_uppercase();
        section.push_str(&format!(
            "\n{}:\n{}\n",
            heading,
            "-".repeat(heading.chars().count())
        ));

        for result in matches {
            section.push_str(&generate_tender_block(result));
        }
    }

    section
}

/// Generate the detail lines for one tender.
fn generate_tender_block(result: &MatchResult) -> String {
    let record = &result.record;

    format!(
        "  • {}: {}\n    Date: {}\n    Match Reason: {}\n\n",
        record.tender_no(),
        record.title(),
        record.date(),
        result.match_reason
    )
}

fn display_name(entity: &str) -> &str {
    if entity.is_empty() {
        UNNAMED_ENTITY
    } else {
        entity
    }
}

/// Generate the JSON document: entity name to list of tenders.
///
/// Indented with four spaces, as the downstream consumers expect.
pub fn generate_json_report(groups: &EntityGroups) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);

    groups
        .serialize(&mut serializer)
        .context("Failed to serialize grouped tenders")?;

    String::from_utf8(buffer).context("Serialized JSON was not valid UTF-8")
}

/// Write report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
