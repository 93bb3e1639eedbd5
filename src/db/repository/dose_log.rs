use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::DoseStatus;
use crate::models::{DoseLogView, MedicationLogEntry};

use super::{format_date, format_datetime, parse_date, parse_datetime, parse_uuid};

/// Appends a taken/missed entry. Several entries per medication per day are
/// allowed; nothing is collapsed.
pub fn log_dose(
    conn: &Connection,
    medication_id: &Uuid,
    log_date: &NaiveDate,
    status: DoseStatus,
) -> Result<Uuid, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM medications WHERE id = ?1",
        params![medication_id.to_string()],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(DatabaseError::NotFound {
            entity_type: "Medication".into(),
            id: medication_id.to_string(),
        });
    }

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO dose_log (id, medication_id, log_date, status, logged_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id.to_string(),
            medication_id.to_string(),
            format_date(log_date),
            status.as_str(),
            format_datetime(&Local::now().naive_local()),
        ],
    )?;

    tracing::debug!(medication_id = %medication_id, status = status.as_str(), "Dose logged");
    Ok(id)
}

/// Raw dose-log rows for a recipient's medications dated on or after `since`,
/// oldest first (log date, then insertion order). `status` narrows to one kind.
pub fn dose_log_since(
    conn: &Connection,
    recipient_id: &Uuid,
    status: Option<DoseStatus>,
    since: &NaiveDate,
) -> Result<Vec<DoseLogView>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT dl.id, dl.medication_id, dl.log_date, dl.status, dl.logged_at, m.name
         FROM dose_log dl
         JOIN medications m ON m.id = dl.medication_id
         WHERE m.recipient_id = ?1
           AND dl.log_date >= ?2
           AND (?3 IS NULL OR dl.status = ?3)
         ORDER BY dl.log_date ASC, dl.rowid ASC",
    )?;

    let rows = stmt.query_map(
        params![
            recipient_id.to_string(),
            format_date(since),
            status.map(|s| s.as_str()),
        ],
        dose_row_from_rusqlite,
    )?;

    collect_doses(rows)
}

/// Dose log for display: newest first (log date, then logging time, then
/// insertion order).
pub fn recent_dose_log(
    conn: &Connection,
    recipient_id: &Uuid,
    since: &NaiveDate,
) -> Result<Vec<DoseLogView>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT dl.id, dl.medication_id, dl.log_date, dl.status, dl.logged_at, m.name
         FROM dose_log dl
         JOIN medications m ON m.id = dl.medication_id
         WHERE m.recipient_id = ?1 AND dl.log_date >= ?2
         ORDER BY dl.log_date DESC, dl.logged_at DESC, dl.rowid DESC",
    )?;

    let rows = stmt.query_map(
        params![recipient_id.to_string(), format_date(since)],
        dose_row_from_rusqlite,
    )?;

    collect_doses(rows)
}

fn collect_doses(
    rows: impl Iterator<Item = Result<DoseRow, rusqlite::Error>>,
) -> Result<Vec<DoseLogView>, DatabaseError> {
    let mut entries = Vec::new();
    for row in rows {
        entries.push(dose_from_row(row?)?);
    }
    Ok(entries)
}

struct DoseRow {
    id: String,
    medication_id: String,
    log_date: String,
    status: String,
    logged_at: String,
    medication_name: String,
}

fn dose_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<DoseRow, rusqlite::Error> {
    Ok(DoseRow {
        id: row.get(0)?,
        medication_id: row.get(1)?,
        log_date: row.get(2)?,
        status: row.get(3)?,
        logged_at: row.get(4)?,
        medication_name: row.get(5)?,
    })
}

fn dose_from_row(row: DoseRow) -> Result<DoseLogView, DatabaseError> {
    Ok(DoseLogView {
        entry: MedicationLogEntry {
            id: parse_uuid(&row.id)?,
            medication_id: parse_uuid(&row.medication_id)?,
            log_date: parse_date(&row.log_date)?,
            status: DoseStatus::from_str(&row.status)?,
            logged_at: parse_datetime(&row.logged_at)?,
        },
        medication_name: row.medication_name,
    })
}
