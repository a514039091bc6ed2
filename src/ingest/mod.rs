//! Tender input loading.
//!
//! Reads the JSON array produced by the scraping step and turns each
//! element into a [`TenderRecord`]. What happens to malformed elements is
//! decided by the caller through [`MalformedPolicy`].

use crate::error::TenderError;
use crate::models::{MalformedPolicy, TenderRecord};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Records read from one input, with bookkeeping for the run summary.
#[derive(Debug, Clone, Default)]
pub struct LoadedTenders {
    /// Well-formed records, in input order.
    pub records: Vec<TenderRecord>,
    /// Number of elements in the input array.
    pub total: usize,
    /// Elements dropped under [`MalformedPolicy::Skip`].
    pub skipped: usize,
}

/// Load tenders from a JSON file.
pub fn load_tenders(path: &Path, policy: MalformedPolicy) -> Result<LoadedTenders> {
    info!("Loading tenders from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tender file: {}", path.display()))?;

    let loaded = parse_tenders(&content, policy)
        .with_context(|| format!("Failed to load tenders from {}", path.display()))?;

    info!(
        "Loaded {} tenders ({} skipped)",
        loaded.records.len(),
        loaded.skipped
    );

    Ok(loaded)
}

/// Parse tenders from JSON text.
pub fn parse_tenders(content: &str, policy: MalformedPolicy) -> Result<LoadedTenders> {
    let value: Value = serde_json::from_str(content).context("Invalid JSON in tender input")?;

    let elements = match value {
        Value::Array(elements) => elements,
        Value::Object(_) => return Err(TenderError::NotAnArray { found: "an object" }.into()),
        _ => return Err(TenderError::NotAnArray { found: "a scalar" }.into()),
    };

    Ok(records_from_values(elements, policy)?)
}

/// Convert raw JSON elements into records under the given policy.
pub fn records_from_values(
    elements: Vec<Value>,
    policy: MalformedPolicy,
) -> Result<LoadedTenders, TenderError> {
    let mut loaded = LoadedTenders {
        records: Vec::with_capacity(elements.len()),
        total: elements.len(),
        skipped: 0,
    };

    for (index, element) in elements.into_iter().enumerate() {
        match TenderRecord::from_value(index + 1, element) {
            Ok(record) => {
                debug!("Read tender {}", record.tender_no());
                loaded.records.push(record);
            }
            Err(e) => match policy {
                MalformedPolicy::Abort => return Err(e),
                MalformedPolicy::Skip => {
                    warn!("Skipping record: {}", e);
                    loaded.skipped += 1;
                }
            },
        }
    }

    Ok(loaded)
}
