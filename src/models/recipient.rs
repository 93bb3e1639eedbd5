use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The person being cared for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub relationship: Option<String>,
    pub age: Option<u8>,
    pub conditions: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Recipient {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
