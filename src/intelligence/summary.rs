use std::time::Instant;

use chrono::{Duration, NaiveDateTime};
use uuid::Uuid;

use crate::db::RecordStore;
use crate::models::enums::DoseStatus;
use crate::models::{Appointment, CheckIn};

use super::actions::recommend_actions;
use super::detection::{collect_flags, require_recipient};
use super::helpers::{adherence_rate, check_in_keywords, describe_appointment, window_start};
use super::messages::MessageTemplates;
use super::types::{CareSummary, EngineError, OverallStatus, SymptomTrend};

/// Adherence, symptom and stress aggregates cover this many trailing days.
const SUMMARY_WINDOW_DAYS: i64 = 7;
const UPCOMING_WINDOW_DAYS: i64 = 14;
const MAX_COMMON_SYMPTOMS: usize = 6;

/// Build the narrative summary for one recipient at `now`.
///
/// Pure read over the store: the same snapshot and `now` always yield the
/// same summary.
pub fn compose_summary<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
    now: NaiveDateTime,
) -> Result<CareSummary, EngineError> {
    let start = Instant::now();
    require_recipient(store, recipient_id)?;

    let (taken, missed) = count_doses(store, recipient_id, &now)?;
    let rate = adherence_rate(taken, missed);

    let since = window_start(&now, SUMMARY_WINDOW_DAYS);
    let check_ins = store.check_ins_since(recipient_id, &since)?;
    let symptoms = SymptomAggregate::from_check_ins(&check_ins);

    let upcoming = next_appointment(store, recipient_id, &now)?;

    let flags = collect_flags(store, recipient_id, now)?;
    let status = OverallStatus::from_flags(&flags);
    let actions = recommend_actions(&flags);

    let mut lines = vec![
        MessageTemplates::status_line(status),
        MessageTemplates::adherence_line(rate, taken, missed),
    ];
    if check_ins.is_empty() {
        lines.push(MessageTemplates::no_check_ins_line());
    } else {
        lines.push(MessageTemplates::symptoms_line(symptoms.latest, symptoms.trend));
        if !symptoms.keywords.is_empty() {
            lines.push(MessageTemplates::common_symptoms_line(&symptoms.keywords));
        }
    }
    lines.push(MessageTemplates::stress_line(symptoms.peak_stress));
    lines.push(MessageTemplates::upcoming_line(
        upcoming.as_ref().map(describe_appointment).as_deref(),
    ));

    tracing::info!(
        recipient_id = %recipient_id,
        status = status.as_str(),
        flags = flags.len(),
        processing_ms = start.elapsed().as_millis() as u64,
        "Care summary composed"
    );

    Ok(CareSummary {
        recipient_id: *recipient_id,
        generated_for: now,
        lines,
        actions,
        flags,
        status,
        adherence_rate: rate,
        taken,
        missed,
        earliest_severity: symptoms.earliest,
        latest_severity: symptoms.latest,
        symptom_trend: symptoms.trend,
        peak_stress: symptoms.peak_stress,
        common_symptoms: symptoms.keywords,
    })
}

/// Raw taken/missed row counts over the summary window.
fn count_doses<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
    now: &NaiveDateTime,
) -> Result<(u32, u32), EngineError> {
    let since = window_start(now, SUMMARY_WINDOW_DAYS);
    let logs = store.medication_logs_since(recipient_id, None, &since)?;

    let mut taken = 0u32;
    let mut missed = 0u32;
    for log in &logs {
        match log.entry.status {
            DoseStatus::Taken => taken += 1,
            DoseStatus::Missed => missed += 1,
        }
    }
    Ok((taken, missed))
}

fn next_appointment<S: RecordStore + ?Sized>(
    store: &S,
    recipient_id: &Uuid,
    now: &NaiveDateTime,
) -> Result<Option<Appointment>, EngineError> {
    let until = *now + Duration::days(UPCOMING_WINDOW_DAYS);
    Ok(store
        .appointments_between(recipient_id, now, &until, Some(1))?
        .into_iter()
        .next())
}

struct SymptomAggregate {
    earliest: Option<u8>,
    latest: Option<u8>,
    trend: Option<SymptomTrend>,
    peak_stress: Option<u8>,
    keywords: Vec<String>,
}

impl SymptomAggregate {
    /// `check_ins` must be oldest first.
    fn from_check_ins(check_ins: &[CheckIn]) -> Self {
        let earliest = check_ins.first().and_then(|c| c.symptom_severity);
        let latest = check_ins.last().and_then(|c| c.symptom_severity);
        Self {
            earliest,
            latest,
            trend: SymptomTrend::between(earliest, latest),
            peak_stress: check_ins.iter().filter_map(|c| c.caregiver_stress).max(),
            keywords: check_in_keywords(check_ins, MAX_COMMON_SYMPTOMS),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rusqlite::Connection;

    use super::*;
    use crate::db::repository::*;
    use crate::db::sqlite::open_memory_database;
    use crate::intelligence::actions::{ACTION_NO_URGENT_RISKS, ACTION_PREPARE_QUESTIONS};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn days_ago(n: i64) -> NaiveDate {
        now().date() - Duration::days(n)
    }

    fn setup() -> (Connection, Uuid) {
        let conn = open_memory_database().unwrap();
        let rid = insert_recipient(
            &conn,
            &NewRecipient {
                first_name: "Mary".into(),
                last_name: "Adams".into(),
                relationship: None,
                age: None,
                conditions: None,
            },
        )
        .unwrap();
        (conn, rid)
    }

    fn add_med(conn: &Connection, rid: Uuid, name: &str) -> Uuid {
        insert_medication(
            conn,
            &NewMedication {
                recipient_id: rid,
                name: name.into(),
                dose: None,
                schedule: None,
                notes: None,
            },
        )
        .unwrap()
    }

    fn add_check_in(
        conn: &Connection,
        rid: Uuid,
        date: NaiveDate,
        symptoms: Option<&str>,
        severity: Option<u8>,
        stress: Option<u8>,
    ) {
        record_check_in(
            conn,
            &NewCheckIn {
                recipient_id: rid,
                checkin_date: date,
                symptoms: symptoms.map(Into::into),
                symptom_severity: severity,
                caregiver_stress: stress,
                notes: None,
            },
        )
        .unwrap();
    }

    fn add_appointment(conn: &Connection, rid: Uuid, at: NaiveDateTime, provider: &str) {
        insert_appointment(
            conn,
            &NewAppointment {
                recipient_id: rid,
                scheduled_at: at,
                provider: Some(provider.into()),
                purpose: Some("Follow-up".into()),
                location: None,
                notes: None,
            },
        )
        .unwrap();
    }

    #[test]
    fn empty_recipient_gets_neutral_summary() {
        let (conn, rid) = setup();
        let summary = compose_summary(&conn, &rid, now()).unwrap();

        assert_eq!(summary.status, OverallStatus::Stable);
        assert_eq!(summary.adherence_rate, None);
        assert_eq!(summary.latest_severity, None);
        assert_eq!(summary.peak_stress, None);
        assert!(summary.flags.is_empty());
        assert_eq!(summary.actions, vec![ACTION_NO_URGENT_RISKS]);
        assert_eq!(
            summary.lines,
            vec![
                "Overall status: Stable",
                "Medication adherence: No logs in the last 7 days.",
                "Symptoms: No check-ins in the last 7 days.",
                "Caregiver stress: No stress check-ins in last 7 days.",
                "Upcoming appointment: None in next 14 days.",
            ]
        );
    }

    #[test]
    fn adherence_counts_raw_rows_in_window() {
        let (conn, rid) = setup();
        let med = add_med(&conn, rid, "Metformin");
        log_dose(&conn, &med, &days_ago(0), DoseStatus::Taken).unwrap();
        log_dose(&conn, &med, &days_ago(0), DoseStatus::Taken).unwrap();
        log_dose(&conn, &med, &days_ago(7), DoseStatus::Taken).unwrap();
        log_dose(&conn, &med, &days_ago(5), DoseStatus::Missed).unwrap();
        log_dose(&conn, &med, &days_ago(8), DoseStatus::Missed).unwrap();

        let summary = compose_summary(&conn, &rid, now()).unwrap();
        assert_eq!(summary.taken, 3);
        assert_eq!(summary.missed, 1);
        assert_eq!(summary.adherence_rate, Some(75));
        assert_eq!(
            summary.lines[1],
            "Medication adherence: 75% (Taken: 3, Missed: 1) over last 7 days."
        );
    }

    #[test]
    fn symptoms_trend_and_keywords() {
        let (conn, rid) = setup();
        add_check_in(&conn, rid, days_ago(6), Some("fatigue, dizziness"), Some(2), Some(5));
        add_check_in(&conn, rid, days_ago(1), Some("Dizziness; nausea"), Some(6), Some(7));

        let summary = compose_summary(&conn, &rid, now()).unwrap();
        assert_eq!(summary.earliest_severity, Some(2));
        assert_eq!(summary.latest_severity, Some(6));
        assert_eq!(summary.symptom_trend, Some(SymptomTrend::Worsening));
        assert_eq!(summary.common_symptoms, vec!["dizziness", "fatigue", "nausea"]);
        assert_eq!(summary.peak_stress, Some(7));
        assert_eq!(summary.lines[2], "Symptoms: Latest severity 6/10; trend is worsening.");
        assert_eq!(summary.lines[3], "Common symptoms: dizziness, fatigue, nausea");
        assert_eq!(summary.lines[4], "Caregiver stress: Peak 7/10 (elevated).");
    }

    #[test]
    fn unknown_earliest_severity_omits_trend() {
        let (conn, rid) = setup();
        add_check_in(&conn, rid, days_ago(5), None, None, None);
        add_check_in(&conn, rid, days_ago(1), None, Some(4), None);

        let summary = compose_summary(&conn, &rid, now()).unwrap();
        assert_eq!(summary.symptom_trend, None);
        assert_eq!(summary.lines[2], "Symptoms: Latest severity 4/10.");
        assert_eq!(summary.lines[3], "Caregiver stress: No stress check-ins in last 7 days.");
    }

    #[test]
    fn unknown_latest_severity_is_reported_not_zeroed() {
        let (conn, rid) = setup();
        add_check_in(&conn, rid, days_ago(1), Some("cough"), None, Some(3));

        let summary = compose_summary(&conn, &rid, now()).unwrap();
        assert_eq!(summary.latest_severity, None);
        assert_eq!(summary.lines[2], "Symptoms: Latest severity not recorded.");
        assert_eq!(summary.lines[3], "Common symptoms: cough");
    }

    #[test]
    fn upcoming_picks_earliest_within_fourteen_days() {
        let (conn, rid) = setup();
        add_appointment(&conn, rid, now() + Duration::days(10), "Dr. Later");
        add_appointment(&conn, rid, now() + Duration::days(1), "Dr. Soon");
        add_appointment(&conn, rid, now() + Duration::days(20), "Dr. Far");

        let summary = compose_summary(&conn, &rid, now()).unwrap();
        assert_eq!(
            summary.lines.last().unwrap(),
            "Upcoming appointment: 2026-03-11 12:00 \u{2014} Dr. Soon (Follow-up)"
        );
        // Only the +1 day appointment is inside the 48h flag window.
        assert_eq!(summary.flags.len(), 1);
        assert!(summary.flags[0].detail.contains("Dr. Soon"));
        assert_eq!(summary.actions, vec![ACTION_PREPARE_QUESTIONS]);
        assert_eq!(summary.status, OverallStatus::Stable);
    }

    #[test]
    fn status_follows_flag_levels() {
        let (conn, rid) = setup();
        add_check_in(&conn, rid, days_ago(1), None, None, Some(9));

        let summary = compose_summary(&conn, &rid, now()).unwrap();
        assert_eq!(summary.status, OverallStatus::Watch);
        assert_eq!(summary.lines[0], "Overall status: Watch");

        let med = add_med(&conn, rid, "Metformin");
        log_dose(&conn, &med, &days_ago(2), DoseStatus::Missed).unwrap();
        let summary = compose_summary(&conn, &rid, now()).unwrap();
        assert_eq!(summary.status, OverallStatus::NeedsAttention);
        assert_eq!(summary.lines[0], "Overall status: Needs Attention");
    }

    #[test]
    fn repeated_calls_are_identical() {
        let (conn, rid) = setup();
        let med = add_med(&conn, rid, "Metformin");
        log_dose(&conn, &med, &days_ago(1), DoseStatus::Missed).unwrap();
        add_check_in(&conn, rid, days_ago(1), Some("fatigue"), Some(5), Some(8));
        add_appointment(&conn, rid, now() + Duration::days(1), "Dr. Smith");

        let first = compose_summary(&conn, &rid, now()).unwrap();
        let second = compose_summary(&conn, &rid, now()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn window_slides_with_now() {
        let (conn, rid) = setup();
        let med = add_med(&conn, rid, "Metformin");
        log_dose(&conn, &med, &days_ago(3), DoseStatus::Missed).unwrap();

        let today = compose_summary(&conn, &rid, now()).unwrap();
        assert_eq!(today.status, OverallStatus::NeedsAttention);

        let tomorrow = compose_summary(&conn, &rid, now() + Duration::days(1)).unwrap();
        assert_eq!(tomorrow.status, OverallStatus::Stable);
        assert_eq!(tomorrow.missed, 1, "still inside the 7-day adherence window");
    }

    #[test]
    fn unknown_recipient_errors() {
        let (conn, _) = setup();
        let result = compose_summary(&conn, &Uuid::new_v4(), now());
        assert!(matches!(result, Err(EngineError::RecipientNotFound(_))));
    }
}
