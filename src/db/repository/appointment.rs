use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Appointment;

use super::recipient::ensure_recipient;
use super::{clean_text, format_datetime, parse_datetime, parse_uuid, sql_limit};

/// Input for scheduling an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub recipient_id: Uuid,
    pub scheduled_at: NaiveDateTime,
    pub provider: Option<String>,
    pub purpose: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

pub fn insert_appointment(
    conn: &Connection,
    input: &NewAppointment,
) -> Result<Uuid, DatabaseError> {
    ensure_recipient(conn, &input.recipient_id)?;

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO appointments (id, recipient_id, scheduled_at, provider, purpose, location, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id.to_string(),
            input.recipient_id.to_string(),
            format_datetime(&input.scheduled_at),
            clean_text(&input.provider),
            clean_text(&input.purpose),
            clean_text(&input.location),
            clean_text(&input.notes),
            format_datetime(&Local::now().naive_local()),
        ],
    )?;
    Ok(id)
}

/// Appointments with `from <= scheduled_at <= to`, earliest first. Equal
/// times keep insertion order. `limit` caps the result count.
pub fn appointments_between(
    conn: &Connection,
    recipient_id: &Uuid,
    from: &NaiveDateTime,
    to: &NaiveDateTime,
    limit: Option<usize>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, recipient_id, scheduled_at, provider, purpose, location, notes, created_at
         FROM appointments
         WHERE recipient_id = ?1 AND scheduled_at >= ?2 AND scheduled_at <= ?3
         ORDER BY scheduled_at ASC, rowid ASC
         LIMIT ?4",
    )?;

    let rows = stmt.query_map(
        params![
            recipient_id.to_string(),
            format_datetime(from),
            format_datetime(to),
            sql_limit(limit),
        ],
        appointment_row_from_rusqlite,
    )?;

    collect_appointments(rows)
}

/// Recent and upcoming appointments for display, latest first.
pub fn list_appointments(
    conn: &Connection,
    recipient_id: &Uuid,
    limit: usize,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, recipient_id, scheduled_at, provider, purpose, location, notes, created_at
         FROM appointments
         WHERE recipient_id = ?1
         ORDER BY scheduled_at DESC, rowid DESC
         LIMIT ?2",
    )?;

    let rows = stmt.query_map(
        params![recipient_id.to_string(), sql_limit(Some(limit))],
        appointment_row_from_rusqlite,
    )?;

    collect_appointments(rows)
}

struct AppointmentRow {
    id: String,
    recipient_id: String,
    scheduled_at: String,
    provider: Option<String>,
    purpose: Option<String>,
    location: Option<String>,
    notes: Option<String>,
    created_at: String,
}

fn appointment_row_from_rusqlite(
    row: &rusqlite::Row<'_>,
) -> Result<AppointmentRow, rusqlite::Error> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        scheduled_at: row.get(2)?,
        provider: row.get(3)?,
        purpose: row.get(4)?,
        location: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn collect_appointments(
    rows: impl Iterator<Item = Result<AppointmentRow, rusqlite::Error>>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut appointments = Vec::new();
    for row in rows {
        let row = row?;
        appointments.push(Appointment {
            id: parse_uuid(&row.id)?,
            recipient_id: parse_uuid(&row.recipient_id)?,
            scheduled_at: parse_datetime(&row.scheduled_at)?,
            provider: row.provider,
            purpose: row.purpose,
            location: row.location,
            notes: row.notes,
            created_at: parse_datetime(&row.created_at)?,
        });
    }
    Ok(appointments)
}
