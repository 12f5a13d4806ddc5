//! Normalizes raw incident rows into typed [`IncidentRecord`]s.
//!
//! Raw rows arrive as JSON objects with the flat column schema produced by
//! the upstream data source. Only the coordinate, timestamp, and offense
//! columns are consumed; any other column is ignored.

use mke_crime_models::{IncidentRecord, Offense, OffenseFlags};
use serde_json::Value;

use crate::MalformedRecord;

/// Source column holding the X coordinate.
pub const COL_ROUGH_X: &str = "RoughX";
/// Source column holding the Y coordinate.
pub const COL_ROUGH_Y: &str = "RoughY";
/// Source column holding the raw report timestamp.
pub const COL_REPORTED: &str = "ReportedDateTime";

/// The result of loading one or more raw partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    /// Surviving records with fresh sequential identifiers.
    pub records: Vec<IncidentRecord>,
    /// Count of records dropped for non-boolean offense flag values.
    pub malformed: u64,
}

/// Loads raw partitions into incident records, concatenating them in the
/// given order.
///
/// Row order is preserved within each partition. Record identifiers are
/// always freshly assigned, sequential from 0 across the concatenated
/// result: dropped records do not consume an identifier, so the surviving
/// set has no gaps and no reuse.
///
/// A record whose offense columns contain anything other than a
/// boolean-like value (JSON boolean, integer 0/1, or the strings
/// "true"/"false"/"0"/"1") is dropped with a logged [`MalformedRecord`];
/// the load itself never fails.
#[must_use]
pub fn load_incidents(partitions: &[Vec<Value>]) -> LoadOutcome {
    let mut records = Vec::new();
    let mut malformed: u64 = 0;
    let mut next_id: u64 = 0;

    for partition in partitions {
        for (row, value) in partition.iter().enumerate() {
            match load_record(next_id, row, value) {
                Ok(record) => {
                    records.push(record);
                    next_id += 1;
                }
                Err(err) => {
                    malformed += 1;
                    log::warn!("Dropping record: {err}");
                }
            }
        }
    }

    log::info!(
        "Loaded {} incident records ({malformed} malformed dropped)",
        records.len()
    );

    LoadOutcome { records, malformed }
}

fn load_record(id: u64, row: usize, value: &Value) -> Result<IncidentRecord, MalformedRecord> {
    let offenses = parse_offenses(row, value)?;

    Ok(IncidentRecord {
        id,
        rough_x: parse_coordinate(value.get(COL_ROUGH_X)),
        rough_y: parse_coordinate(value.get(COL_ROUGH_Y)),
        reported: parse_timestamp(value.get(COL_REPORTED)),
        offenses,
    })
}

/// Parses all ten offense columns, failing the record on the first column
/// that is not boolean-like. Flags are never coerced from arbitrary values.
fn parse_offenses(row: usize, value: &Value) -> Result<OffenseFlags, MalformedRecord> {
    let mut flags = OffenseFlags::default();

    for offense in Offense::all() {
        let raw = value.get(offense.as_ref()).unwrap_or(&Value::Null);
        let flag = parse_flag(raw).ok_or_else(|| MalformedRecord {
            row,
            offense: *offense,
            value: raw.to_string(),
        })?;
        flags.set(*offense, flag);
    }

    Ok(flags)
}

/// Interprets a boolean-like JSON value. Returns `None` for anything that
/// is not a boolean, the integers 0/1, or the strings "true"/"false"/"0"/"1"
/// (case-insensitive, trimmed).
fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parses a coordinate component from a number or numeric string. Missing,
/// non-numeric, and non-finite values all become `None` rather than an
/// error; the record stays in the pipeline with null geometry.
fn parse_coordinate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|component| component.is_finite())
}

/// Keeps the raw timestamp string verbatim (trimmed). Empty and non-string
/// values become `None`; parse tolerance is the temporal extractor's job.
fn parse_timestamp(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}
