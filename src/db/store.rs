//! Read contract between the risk engine and whatever holds the records.
//!
//! Every query is parameterised by the caller's window bounds; the store
//! never consults the clock. Rows are raw (no per-day collapsing) and the
//! ordering of each method is part of the contract.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use uuid::Uuid;

use super::repository;
use super::DatabaseError;
use crate::models::enums::DoseStatus;
use crate::models::{Appointment, CheckIn, DoseLogView, Recipient};

pub trait RecordStore {
    fn find_recipient(&self, recipient_id: &Uuid) -> Result<Option<Recipient>, DatabaseError>;

    /// Dose-log rows for the recipient's medications with `log_date >= since`,
    /// optionally narrowed to one status.
    fn medication_logs_since(
        &self,
        recipient_id: &Uuid,
        status: Option<DoseStatus>,
        since: &NaiveDate,
    ) -> Result<Vec<DoseLogView>, DatabaseError>;

    /// Most recent `limit` check-ins: date descending, ties newest-inserted first.
    fn recent_check_ins(
        &self,
        recipient_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<CheckIn>, DatabaseError>;

    /// Check-ins with `checkin_date >= since`: date ascending, ties oldest-inserted first.
    fn check_ins_since(
        &self,
        recipient_id: &Uuid,
        since: &NaiveDate,
    ) -> Result<Vec<CheckIn>, DatabaseError>;

    /// Appointments in `[from, to]`, earliest first, capped to `limit` when given.
    fn appointments_between(
        &self,
        recipient_id: &Uuid,
        from: &NaiveDateTime,
        to: &NaiveDateTime,
        limit: Option<usize>,
    ) -> Result<Vec<Appointment>, DatabaseError>;
}

impl RecordStore for Connection {
    fn find_recipient(&self, recipient_id: &Uuid) -> Result<Option<Recipient>, DatabaseError> {
        repository::get_recipient(self, recipient_id)
    }

    fn medication_logs_since(
        &self,
        recipient_id: &Uuid,
        status: Option<DoseStatus>,
        since: &NaiveDate,
    ) -> Result<Vec<DoseLogView>, DatabaseError> {
        repository::dose_log_since(self, recipient_id, status, since)
    }

    fn recent_check_ins(
        &self,
        recipient_id: &Uuid,
        limit: usize,
    ) -> Result<Vec<CheckIn>, DatabaseError> {
        repository::recent_check_ins(self, recipient_id, limit)
    }

    fn check_ins_since(
        &self,
        recipient_id: &Uuid,
        since: &NaiveDate,
    ) -> Result<Vec<CheckIn>, DatabaseError> {
        repository::check_ins_since(self, recipient_id, since)
    }

    fn appointments_between(
        &self,
        recipient_id: &Uuid,
        from: &NaiveDateTime,
        to: &NaiveDateTime,
        limit: Option<usize>,
    ) -> Result<Vec<Appointment>, DatabaseError> {
        repository::appointments_between(self, recipient_id, from, to, limit)
    }
}
