use std::collections::BTreeSet;

use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

use crate::db::RecordStore;
use crate::models::enums::DoseStatus;

use super::helpers::window_start;
use super::types::{EngineError, RiskFlag, RiskKind};

/// Missed doses look back this many days from today (inclusive).
const MISSED_DOSE_WINDOW_DAYS: i64 = 3;
/// The trend rule needs exactly this many check-ins.
const TREND_CHECK_IN_COUNT: usize = 3;
const WORSENING_MIN_RISE: u8 = 3;
const HIGH_SEVERITY_THRESHOLD: u8 = 7;
const BURNOUT_WINDOW_DAYS: i64 = 7;
const BURNOUT_STRESS_THRESHOLD: u8 = 8;
const APPOINTMENT_SOON_DAYS: i64 = 2;

/// Evaluate every risk rule for one recipient at `now`.
///
/// Flags come back in rule order (missed doses, symptom trend, burnout,
/// appointment), at most one per rule. Fails with `RecipientNotFound` when the
/// store has no such recipient.
pub fn evaluate_risk_flags<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
    now: NaiveDateTime,
) -> Result<Vec<RiskFlag>, EngineError> {
    require_recipient(store, recipient_id)?;
    let flags = collect_flags(store, recipient_id, now)?;

    tracing::info!(
        recipient_id = %recipient_id,
        flags = flags.len(),
        "Risk evaluation complete"
    );
    Ok(flags)
}

pub(crate) fn require_recipient<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
) -> Result<(), EngineError> {
    match store.find_recipient(recipient_id)? {
        Some(_) => Ok(()),
        None => Err(EngineError::RecipientNotFound(*recipient_id)),
    }
}

pub(crate) fn collect_flags<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
    now: NaiveDateTime,
) -> Result<Vec<RiskFlag>, EngineError> {
    let kinds = [
        detect_missed_medications(store, recipient_id, &now)?,
        detect_symptom_trend(store, recipient_id)?,
        detect_caregiver_burnout(store, recipient_id, &now)?,
        detect_upcoming_appointment(store, recipient_id, &now)?,
    ];

    Ok(kinds
        .into_iter()
        .flatten()
        .inspect(|kind| {
            tracing::debug!(recipient_id = %recipient_id, rule = kind.title(), "Risk rule fired");
        })
        .map(RiskFlag::new)
        .collect())
}

// ---------------------------------------------------------------------------
// [1] Missed medications
// ---------------------------------------------------------------------------

fn detect_missed_medications<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
    now: &NaiveDateTime,
) -> Result<Option<RiskKind>, EngineError> {
    let since = window_start(now, MISSED_DOSE_WINDOW_DAYS);
    let missed = store.medication_logs_since(recipient_id, Some(DoseStatus::Missed), &since)?;
    if missed.is_empty() {
        return Ok(None);
    }

    let names: BTreeSet<String> = missed.into_iter().map(|m| m.medication_name).collect();
    Ok(Some(RiskKind::MissedMedications {
        medication_names: names.into_iter().collect(),
    }))
}

// ---------------------------------------------------------------------------
// [2] Symptom trend
// ---------------------------------------------------------------------------

fn detect_symptom_trend<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
) -> Result<Option<RiskKind>, EngineError> {
    let recent = store.recent_check_ins(recipient_id, TREND_CHECK_IN_COUNT)?;
    if recent.len() != TREND_CHECK_IN_COUNT {
        return Ok(None);
    }

    // Oldest first. Any missing severity disables the rule.
    let severities: Option<Vec<u8>> = recent.iter().rev().map(|c| c.symptom_severity).collect();
    let Some(severities) = severities else {
        return Ok(None);
    };

    Ok(classify_severity_sequence(severities[0], severities[1], severities[2]))
}

fn classify_severity_sequence(s0: u8, s1: u8, s2: u8) -> Option<RiskKind> {
    if s0 <= s1 && s1 <= s2 && s2 - s0 >= WORSENING_MIN_RISE {
        Some(RiskKind::SymptomsWorsening {
            from_severity: s0,
            to_severity: s2,
        })
    } else if s2 >= HIGH_SEVERITY_THRESHOLD {
        Some(RiskKind::HighSeverity { latest_severity: s2 })
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// [3] Caregiver burnout
// ---------------------------------------------------------------------------

fn detect_caregiver_burnout<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
    now: &NaiveDateTime,
) -> Result<Option<RiskKind>, EngineError> {
    let since = window_start(now, BURNOUT_WINDOW_DAYS);
    let peak = store
        .check_ins_since(recipient_id, &since)?
        .iter()
        .filter_map(|c| c.caregiver_stress)
        .max();

    Ok(peak
        .filter(|p| *p >= BURNOUT_STRESS_THRESHOLD)
        .map(|peak_stress| RiskKind::CaregiverBurnout { peak_stress }))
}

// ---------------------------------------------------------------------------
// [4] Upcoming appointment
// ---------------------------------------------------------------------------

fn detect_upcoming_appointment<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
    now: &NaiveDateTime,
) -> Result<Option<RiskKind>, EngineError> {
    let until = *now + Duration::days(APPOINTMENT_SOON_DAYS);
    let next = store
        .appointments_between(recipient_id, now, &until, Some(1))?
        .into_iter()
        .next();

    Ok(next.map(|a| RiskKind::UpcomingAppointment {
        appointment_id: a.id,
        scheduled_at: a.scheduled_at,
        provider: a.provider.unwrap_or_default(),
        purpose: a.purpose.unwrap_or_default(),
    }))
}
