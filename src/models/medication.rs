use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DoseStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub name: String,
    pub dose: Option<String>,
    pub schedule: Option<String>,
    pub notes: Option<String>,
    /// Inactive medications drop out of the daily logging list only.
    pub active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationLogEntry {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub log_date: NaiveDate,
    pub status: DoseStatus,
    pub logged_at: NaiveDateTime,
}

/// Dose log row joined with its medication name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseLogView {
    pub entry: MedicationLogEntry,
    pub medication_name: String,
}
