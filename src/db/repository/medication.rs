use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Medication;

use super::recipient::ensure_recipient;
use super::{clean_text, format_datetime, parse_datetime, parse_uuid, required_text};

/// Input for adding a medication to a recipient's list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedication {
    pub recipient_id: Uuid,
    pub name: String,
    pub dose: Option<String>,
    pub schedule: Option<String>,
    pub notes: Option<String>,
}

pub fn insert_medication(conn: &Connection, input: &NewMedication) -> Result<Uuid, DatabaseError> {
    let name = required_text("Medication name", &input.name)?;
    ensure_recipient(conn, &input.recipient_id)?;

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO medications (id, recipient_id, name, dose, schedule, notes, active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
        params![
            id.to_string(),
            input.recipient_id.to_string(),
            name,
            clean_text(&input.dose),
            clean_text(&input.schedule),
            clean_text(&input.notes),
            format_datetime(&Local::now().naive_local()),
        ],
    )?;
    Ok(id)
}

pub fn get_medication(conn: &Connection, id: &Uuid) -> Result<Option<Medication>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, recipient_id, name, dose, schedule, notes, active, created_at
             FROM medications WHERE id = ?1",
            params![id.to_string()],
            medication_row_from_rusqlite,
        )
        .optional()?;

    row.map(medication_from_row).transpose()
}

/// All medications for a recipient, newest first. Includes inactive ones.
pub fn list_medications(
    conn: &Connection,
    recipient_id: &Uuid,
) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, recipient_id, name, dose, schedule, notes, active, created_at
         FROM medications WHERE recipient_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map(params![recipient_id.to_string()], medication_row_from_rusqlite)?;

    let mut meds = Vec::new();
    for row in rows {
        meds.push(medication_from_row(row?)?);
    }
    Ok(meds)
}

/// Medications offered in the daily "log today" list.
pub fn list_active_medications(
    conn: &Connection,
    recipient_id: &Uuid,
) -> Result<Vec<Medication>, DatabaseError> {
    Ok(list_medications(conn, recipient_id)?
        .into_iter()
        .filter(|m| m.active)
        .collect())
}

/// Toggles the active flag. Medications are never hard-deleted.
pub fn set_medication_active(
    conn: &Connection,
    medication_id: &Uuid,
    active: bool,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medications SET active = ?1 WHERE id = ?2",
        params![active as i32, medication_id.to_string()],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Medication".into(),
            id: medication_id.to_string(),
        });
    }
    Ok(())
}

struct MedicationRow {
    id: String,
    recipient_id: String,
    name: String,
    dose: Option<String>,
    schedule: Option<String>,
    notes: Option<String>,
    active: i32,
    created_at: String,
}

fn medication_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MedicationRow, rusqlite::Error> {
    Ok(MedicationRow {
        id: row.get(0)?,
        recipient_id: row.get(1)?,
        name: row.get(2)?,
        dose: row.get(3)?,
        schedule: row.get(4)?,
        notes: row.get(5)?,
        active: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, DatabaseError> {
    Ok(Medication {
        id: parse_uuid(&row.id)?,
        recipient_id: parse_uuid(&row.recipient_id)?,
        name: row.name,
        dose: row.dose,
        schedule: row.schedule,
        notes: row.notes,
        active: row.active != 0,
        created_at: parse_datetime(&row.created_at)?,
    })
}
