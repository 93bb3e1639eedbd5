use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Recipient;

use super::{clean_text, format_datetime, parse_datetime, parse_uuid, required_text};

/// Input for creating a care recipient profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipient {
    pub first_name: String,
    pub last_name: String,
    pub relationship: Option<String>,
    pub age: Option<u8>,
    pub conditions: Option<String>,
}

/// Maximum accepted age (matches the profile form bound).
const MAX_AGE: u8 = 120;

pub fn insert_recipient(conn: &Connection, input: &NewRecipient) -> Result<Uuid, DatabaseError> {
    let first_name = required_text("First name", &input.first_name)?;
    let last_name = required_text("Last name", &input.last_name)?;
    if let Some(age) = input.age {
        if age > MAX_AGE {
            return Err(DatabaseError::ConstraintViolation(format!(
                "Age must be between 0 and {MAX_AGE}"
            )));
        }
    }

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO recipients (id, first_name, last_name, relationship, age, conditions, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id.to_string(),
            first_name,
            last_name,
            clean_text(&input.relationship),
            input.age,
            clean_text(&input.conditions),
            format_datetime(&Local::now().naive_local()),
        ],
    )?;

    tracing::debug!(recipient_id = %id, "Recipient created");
    Ok(id)
}

pub fn get_recipient(conn: &Connection, id: &Uuid) -> Result<Option<Recipient>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, first_name, last_name, relationship, age, conditions, created_at
             FROM recipients WHERE id = ?1",
            params![id.to_string()],
            recipient_row_from_rusqlite,
        )
        .optional()?;

    row.map(recipient_from_row).transpose()
}

/// All recipients, newest first.
pub fn list_recipients(conn: &Connection) -> Result<Vec<Recipient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, relationship, age, conditions, created_at
         FROM recipients ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map([], recipient_row_from_rusqlite)?;

    let mut recipients = Vec::new();
    for row in rows {
        recipients.push(recipient_from_row(row?)?);
    }
    Ok(recipients)
}

/// Fails with `NotFound` unless the recipient row exists.
pub(crate) fn ensure_recipient(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM recipients WHERE id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(DatabaseError::NotFound {
            entity_type: "Recipient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

struct RecipientRow {
    id: String,
    first_name: String,
    last_name: String,
    relationship: Option<String>,
    age: Option<i64>,
    conditions: Option<String>,
    created_at: String,
}

fn recipient_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<RecipientRow, rusqlite::Error> {
    Ok(RecipientRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        relationship: row.get(3)?,
        age: row.get(4)?,
        conditions: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn recipient_from_row(row: RecipientRow) -> Result<Recipient, DatabaseError> {
    Ok(Recipient {
        id: parse_uuid(&row.id)?,
        first_name: row.first_name,
        last_name: row.last_name,
        relationship: row.relationship,
        age: row.age.and_then(|a| u8::try_from(a).ok()),
        conditions: row.conditions,
        created_at: parse_datetime(&row.created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn make_input(first: &str, last: &str) -> NewRecipient {
        NewRecipient {
            first_name: first.into(),
            last_name: last.into(),
            relationship: Some("Mother".into()),
            age: Some(78),
            conditions: Some("diabetes, hypertension".into()),
        }
    }

    #[test]
    fn insert_and_get_recipient() {
        let conn = open_memory_database().unwrap();
        let id = insert_recipient(&conn, &make_input(" Mary ", "Adams")).unwrap();

        let recipient = get_recipient(&conn, &id).unwrap().expect("recipient exists");
        assert_eq!(recipient.first_name, "Mary");
        assert_eq!(recipient.display_name(), "Mary Adams");
        assert_eq!(recipient.age, Some(78));
    }

    #[test]
    fn get_unknown_recipient_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_recipient(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn insert_requires_names() {
        let conn = open_memory_database().unwrap();
        let result = insert_recipient(&conn, &make_input("", "Adams"));
        assert!(matches!(result, Err(DatabaseError::ConstraintViolation(_))));
    }

    #[test]
    fn insert_rejects_implausible_age() {
        let conn = open_memory_database().unwrap();
        let mut input = make_input("Mary", "Adams");
        input.age = Some(200);
        assert!(insert_recipient(&conn, &input).is_err());
    }

    #[test]
    fn list_recipients_newest_first() {
        let conn = open_memory_database().unwrap();
        insert_recipient(&conn, &make_input("Mary", "Adams")).unwrap();
        insert_recipient(&conn, &make_input("John", "Baker")).unwrap();

        let all = list_recipients(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].first_name, "John");
    }

    #[test]
    fn ensure_recipient_not_found() {
        let conn = open_memory_database().unwrap();
        let result = ensure_recipient(&conn, &Uuid::new_v4());
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
