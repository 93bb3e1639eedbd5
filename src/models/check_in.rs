use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Daily well-being report. Severity and stress are 0-10 and may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub checkin_date: NaiveDate,
    pub symptoms: Option<String>,
    pub symptom_severity: Option<u8>,
    pub caregiver_stress: Option<u8>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}
