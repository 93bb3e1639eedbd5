//! Repository layer: entity-scoped database operations.
//!
//! Write helpers validate caregiver input before it reaches SQLite; read
//! helpers return rows in the order the engine depends on (see each
//! function). All public functions are re-exported here.

mod appointment;
mod check_in;
mod dose_log;
mod medication;
mod recipient;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use super::DatabaseError;

pub use appointment::*;
pub use check_in::*;
pub use dose_log::*;
pub use medication::*;
pub use recipient::*;

/// Storage format for date-time columns. Lexicographic order matches
/// chronological order, so range filters compare the text directly.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Upper bound for 0-10 scales (symptom severity, caregiver stress).
pub const SCALE_MAX: u8 = 10;

pub(crate) fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid date '{value}': {e}")))
}

pub(crate) fn parse_datetime(value: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).map_err(|e| {
        DatabaseError::ConstraintViolation(format!("Invalid datetime '{value}': {e}"))
    })
}

/// Reads a nullable 0-10 scale column.
pub(crate) fn parse_scale(field: &str, value: Option<i64>) -> Result<Option<u8>, DatabaseError> {
    match value {
        None => Ok(None),
        Some(v) => u8::try_from(v)
            .ok()
            .filter(|v| *v <= SCALE_MAX)
            .map(Some)
            .ok_or_else(|| {
                DatabaseError::ConstraintViolation(format!("{field} out of range: {v}"))
            }),
    }
}

/// Trims free text; blank input is stored as NULL.
pub(crate) fn clean_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn required_text(field: &str, value: &str) -> Result<String, DatabaseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DatabaseError::ConstraintViolation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// SQLite treats a negative LIMIT as "no limit".
pub(crate) fn sql_limit(limit: Option<usize>) -> i64 {
    limit.and_then(|l| i64::try_from(l).ok()).unwrap_or(-1)
}
