//! Chart series for the dashboard: severity and stress over the last 30 days,
//! taken vs missed doses per day over the last 14.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::RecordStore;
use crate::intelligence::detection::require_recipient;
use crate::intelligence::helpers::window_start;
use crate::intelligence::EngineError;
use crate::models::enums::DoseStatus;

pub const CHECK_IN_TREND_DAYS: i64 = 30;
pub const ADHERENCE_TREND_DAYS: i64 = 14;

/// One check-in plotted on the severity and stress charts. Missing values
/// stay `None` so charts show a gap rather than a zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckInPoint {
    pub date: NaiveDate,
    pub symptom_severity: Option<u8>,
    pub caregiver_stress: Option<u8>,
}

/// Dose-log counts for a single day. Days without logs are not emitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdherencePoint {
    pub date: NaiveDate,
    pub taken: u32,
    pub missed: u32,
}

/// Check-ins from the last 30 days, oldest first. Several check-ins on the
/// same day each produce a point.
pub fn checkin_series<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
    now: NaiveDateTime,
) -> Result<Vec<CheckInPoint>, EngineError> {
    require_recipient(store, recipient_id)?;

    let since = window_start(&now, CHECK_IN_TREND_DAYS);
    let points: Vec<CheckInPoint> = store
        .check_ins_since(recipient_id, &since)?
        .into_iter()
        .map(|c| CheckInPoint {
            date: c.checkin_date,
            symptom_severity: c.symptom_severity,
            caregiver_stress: c.caregiver_stress,
        })
        .collect();

    tracing::debug!(recipient_id = %recipient_id, points = points.len(), "Check-in series built");
    Ok(points)
}

/// Taken/missed counts grouped by log date over the last 14 days, oldest first.
pub fn adherence_series<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
    now: NaiveDateTime,
) -> Result<Vec<AdherencePoint>, EngineError> {
    require_recipient(store, recipient_id)?;

    let since = window_start(&now, ADHERENCE_TREND_DAYS);
    let logs = store.medication_logs_since(recipient_id, None, &since)?;

    let mut by_day: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();
    for log in &logs {
        let counts = by_day.entry(log.entry.log_date).or_default();
        match log.entry.status {
            DoseStatus::Taken => counts.0 += 1,
            DoseStatus::Missed => counts.1 += 1,
        }
    }

    let points: Vec<AdherencePoint> = by_day
        .into_iter()
        .map(|(date, (taken, missed))| AdherencePoint { date, taken, missed })
        .collect();

    tracing::debug!(recipient_id = %recipient_id, days = points.len(), "Adherence series built");
    Ok(points)
}
