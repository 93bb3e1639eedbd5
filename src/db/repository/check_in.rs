use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::CheckIn;

use super::recipient::ensure_recipient;
use super::{
    clean_text, format_date, format_datetime, parse_date, parse_datetime, parse_scale,
    parse_uuid, sql_limit, SCALE_MAX,
};

/// Input for a daily check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCheckIn {
    pub recipient_id: Uuid,
    pub checkin_date: NaiveDate,
    pub symptoms: Option<String>,
    pub symptom_severity: Option<u8>,
    pub caregiver_stress: Option<u8>,
    pub notes: Option<String>,
}

pub fn record_check_in(conn: &Connection, input: &NewCheckIn) -> Result<Uuid, DatabaseError> {
    validate_scale("Symptom severity", input.symptom_severity)?;
    validate_scale("Caregiver stress", input.caregiver_stress)?;
    ensure_recipient(conn, &input.recipient_id)?;

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO check_ins (id, recipient_id, checkin_date, symptoms, symptom_severity,
         caregiver_stress, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id.to_string(),
            input.recipient_id.to_string(),
            format_date(&input.checkin_date),
            clean_text(&input.symptoms),
            input.symptom_severity,
            input.caregiver_stress,
            clean_text(&input.notes),
            format_datetime(&Local::now().naive_local()),
        ],
    )?;

    tracing::debug!(recipient_id = %input.recipient_id, "Check-in recorded");
    Ok(id)
}

fn validate_scale(field: &str, value: Option<u8>) -> Result<(), DatabaseError> {
    match value {
        Some(v) if v > SCALE_MAX => Err(DatabaseError::ConstraintViolation(format!(
            "{field} must be between 0 and {SCALE_MAX}"
        ))),
        _ => Ok(()),
    }
}

/// The `limit` most recent check-ins: date descending, and for equal dates the
/// most recently inserted first.
pub fn recent_check_ins(
    conn: &Connection,
    recipient_id: &Uuid,
    limit: usize,
) -> Result<Vec<CheckIn>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, recipient_id, checkin_date, symptoms, symptom_severity, caregiver_stress,
         notes, created_at
         FROM check_ins
         WHERE recipient_id = ?1
         ORDER BY checkin_date DESC, rowid DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(
        params![recipient_id.to_string(), sql_limit(Some(limit))],
        check_in_row_from_rusqlite,
    )?;

    collect_check_ins(rows)
}

/// Check-ins dated on or after `since`, oldest first (date, then insertion).
pub fn check_ins_since(
    conn: &Connection,
    recipient_id: &Uuid,
    since: &NaiveDate,
) -> Result<Vec<CheckIn>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, recipient_id, checkin_date, symptoms, symptom_severity, caregiver_stress,
         notes, created_at
         FROM check_ins
         WHERE recipient_id = ?1 AND checkin_date >= ?2
         ORDER BY checkin_date ASC, rowid ASC",
    )?;

    let rows = stmt.query_map(
        params![recipient_id.to_string(), format_date(since)],
        check_in_row_from_rusqlite,
    )?;

    collect_check_ins(rows)
}

struct CheckInRow {
    id: String,
    recipient_id: String,
    checkin_date: String,
    symptoms: Option<String>,
    symptom_severity: Option<i64>,
    caregiver_stress: Option<i64>,
    notes: Option<String>,
    created_at: String,
}

fn check_in_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<CheckInRow, rusqlite::Error> {
    Ok(CheckInRow {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        checkin_date: row.get(2)?,
        symptoms: row.get(3)?,
        symptom_severity: row.get(4)?,
        caregiver_stress: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn collect_check_ins(
    rows: impl Iterator<Item = Result<CheckInRow, rusqlite::Error>>,
) -> Result<Vec<CheckIn>, DatabaseError> {
    let mut check_ins = Vec::new();
    for row in rows {
        let row = row?;
        check_ins.push(CheckIn {
            id: parse_uuid(&row.id)?,
            recipient_id: parse_uuid(&row.recipient_id)?,
            checkin_date: parse_date(&row.checkin_date)?,
            symptoms: row.symptoms,
            symptom_severity: parse_scale("symptom_severity", row.symptom_severity)?,
            caregiver_stress: parse_scale("caregiver_stress", row.caregiver_stress)?,
            notes: row.notes,
            created_at: parse_datetime(&row.created_at)?,
        });
    }
    Ok(check_ins)
}
