use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::models::{Appointment, CheckIn};

use super::messages::MessageTemplates;

/// First day of a trailing window of `days` days ending today (inclusive).
pub fn window_start(now: &NaiveDateTime, days: i64) -> NaiveDate {
    now.date() - Duration::days(days)
}

/// Percentage of taken doses, rounded half-to-even. `None` when nothing
/// was logged, so callers can say "no logs" instead of "0%".
pub fn adherence_rate(taken: u32, missed: u32) -> Option<u32> {
    let total = taken + missed;
    if total == 0 {
        return None;
    }
    let pct = f64::from(taken) / f64::from(total) * 100.0;
    Some(pct.round_ties_even() as u32)
}

/// Splits free-text symptom fields on ',' or ';', lowercases, dedups and
/// sorts, keeping at most `limit` keywords.
pub fn extract_symptom_keywords<'a>(
    texts: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> Vec<String> {
    let keywords: BTreeSet<String> = texts
        .into_iter()
        .flat_map(|text| text.split([',', ';']))
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .collect();

    keywords.into_iter().take(limit).collect()
}

pub fn check_in_keywords(check_ins: &[CheckIn], limit: usize) -> Vec<String> {
    extract_symptom_keywords(
        check_ins.iter().filter_map(|c| c.symptoms.as_deref()),
        limit,
    )
}

/// One-line appointment description shared by the flag and the narrative.
pub fn describe_appointment(appointment: &Appointment) -> String {
    MessageTemplates::appointment(
        &appointment.scheduled_at,
        appointment.provider.as_deref().unwrap_or(""),
        appointment.purpose.as_deref().unwrap_or(""),
    )
}
