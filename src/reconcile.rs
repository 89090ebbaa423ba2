use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{Entry, normalize_record};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import failed: invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Import failed: JSON must be an array of entries or {{ \"entries\": [...] }}")]
    UnsupportedShape,
}

/// Accepts a bare array of records or an object carrying an `entries` array.
/// Anything else is a hard rejection; nothing is partially imported.
pub fn parse_import_records(raw: &str) -> Result<Vec<Value>, ImportError> {
    let parsed: Value = serde_json::from_str(raw)?;
    match parsed {
        Value::Array(records) => Ok(records),
        Value::Object(mut obj) => match obj.remove("entries") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(ImportError::UnsupportedShape),
        },
        _ => Err(ImportError::UnsupportedShape),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Incoming records that survived normalization.
    pub accepted: usize,
    /// Incoming records dropped by normalization.
    pub rejected: usize,
    /// Existing entries overwritten by an incoming entry with the same id.
    pub replaced: usize,
    /// Incoming entries whose id was not present before.
    pub added: usize,
}

/// Merges incoming records into the existing collection by id; incoming wins
/// on collision with full-record replacement.
///
/// The result holds the union of both id sets. Existing order is preserved,
/// collided ids are replaced in place, and new ids append in incoming order.
/// Records failing normalization are dropped without aborting the batch.
pub fn merge(
    existing: Vec<Entry>,
    incoming: &[Value],
    now: DateTime<Utc>,
) -> (Vec<Entry>, MergeStats) {
    let mut stats = MergeStats::default();
    let mut merged = existing;
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id.clone(), i))
        .collect();

    for raw in incoming {
        let Some(entry) = normalize_record(raw, now) else {
            stats.rejected += 1;
            continue;
        };
        stats.accepted += 1;

        match index.get(&entry.id) {
            Some(&i) => {
                merged[i] = entry;
                stats.replaced += 1;
            }
            None => {
                index.insert(entry.id.clone(), merged.len());
                merged.push(entry);
                stats.added += 1;
            }
        }
    }

    (merged, stats)
}
