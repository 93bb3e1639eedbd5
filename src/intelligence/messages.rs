use chrono::NaiveDateTime;

use super::types::{OverallStatus, StressLabel, SymptomTrend};

/// Display format for appointment times in flags and narrative lines.
pub const APPOINTMENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Fixed wording for flag details and summary narrative lines.
pub struct MessageTemplates;

impl MessageTemplates {
    pub fn missed_medications(names: &[String]) -> String {
        format!("Missed med(s) in last 3 days: {}.", names.join(", "))
    }

    pub fn symptoms_worsening(from: u8, to: u8) -> String {
        format!("Severity rose from {from} to {to} over the last 3 check-ins.")
    }

    pub fn high_severity(latest: u8) -> String {
        format!("Latest symptom severity is {latest}/10.")
    }

    pub fn caregiver_burnout() -> String {
        "Stress hit 8+ in the last 7 days.".to_string()
    }

    /// `{when} \u{2014} {provider} ({purpose})`; callers pass empty strings for
    /// missing provider or purpose.
    pub fn appointment(scheduled_at: &NaiveDateTime, provider: &str, purpose: &str) -> String {
        format!(
            "{} \u{2014} {} ({})",
            scheduled_at.format(APPOINTMENT_TIME_FORMAT),
            provider,
            purpose,
        )
    }

    // -- narrative ---------------------------------------------------------

    pub fn status_line(status: OverallStatus) -> String {
        format!("Overall status: {}", status.as_str())
    }

    pub fn adherence_line(rate: Option<u32>, taken: u32, missed: u32) -> String {
        match rate {
            None => "Medication adherence: No logs in the last 7 days.".to_string(),
            Some(rate) => format!(
                "Medication adherence: {rate}% (Taken: {taken}, Missed: {missed}) over last 7 days."
            ),
        }
    }

    pub fn no_check_ins_line() -> String {
        "Symptoms: No check-ins in the last 7 days.".to_string()
    }

    pub fn symptoms_line(latest: Option<u8>, trend: Option<SymptomTrend>) -> String {
        match (latest, trend) {
            (Some(latest), Some(trend)) => format!(
                "Symptoms: Latest severity {latest}/10; trend is {}.",
                trend.as_str()
            ),
            (Some(latest), None) => format!("Symptoms: Latest severity {latest}/10."),
            (None, _) => "Symptoms: Latest severity not recorded.".to_string(),
        }
    }

    pub fn common_symptoms_line(keywords: &[String]) -> String {
        format!("Common symptoms: {}", keywords.join(", "))
    }

    pub fn stress_line(peak: Option<u8>) -> String {
        match peak {
            None => "Caregiver stress: No stress check-ins in last 7 days.".to_string(),
            Some(peak) => format!(
                "Caregiver stress: Peak {peak}/10 ({}).",
                StressLabel::for_peak(peak).as_str()
            ),
        }
    }

    pub fn upcoming_line(appointment: Option<&str>) -> String {
        format!(
            "Upcoming appointment: {}",
            appointment.unwrap_or("None in next 14 days.")
        )
    }
}
