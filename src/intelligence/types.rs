use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::DatabaseError;

use super::messages::MessageTemplates;

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

/// Fixed per rule; not configurable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

// ---------------------------------------------------------------------------
// RiskKind
// ---------------------------------------------------------------------------

/// What a flag is about, with the values that triggered it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RiskKind {
    /// Distinct medication names, sorted alphabetically.
    MissedMedications { medication_names: Vec<String> },
    SymptomsWorsening { from_severity: u8, to_severity: u8 },
    HighSeverity { latest_severity: u8 },
    CaregiverBurnout { peak_stress: u8 },
    /// Absent provider/purpose are carried as empty strings.
    UpcomingAppointment {
        appointment_id: Uuid,
        scheduled_at: NaiveDateTime,
        provider: String,
        purpose: String,
    },
}

impl RiskKind {
    pub fn level(&self) -> RiskLevel {
        match self {
            Self::MissedMedications { .. } | Self::SymptomsWorsening { .. } => RiskLevel::High,
            Self::HighSeverity { .. } | Self::CaregiverBurnout { .. } => RiskLevel::Medium,
            Self::UpcomingAppointment { .. } => RiskLevel::Low,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::MissedMedications { .. } => "Missed medications recently",
            Self::SymptomsWorsening { .. } => "Symptoms worsening trend",
            Self::HighSeverity { .. } => "High symptom severity",
            Self::CaregiverBurnout { .. } => "Caregiver burnout risk",
            Self::UpcomingAppointment { .. } => "Upcoming appointment soon",
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::MissedMedications { medication_names } => {
                MessageTemplates::missed_medications(medication_names)
            }
            Self::SymptomsWorsening { from_severity, to_severity } => {
                MessageTemplates::symptoms_worsening(*from_severity, *to_severity)
            }
            Self::HighSeverity { latest_severity } => {
                MessageTemplates::high_severity(*latest_severity)
            }
            Self::CaregiverBurnout { .. } => MessageTemplates::caregiver_burnout(),
            Self::UpcomingAppointment { scheduled_at, provider, purpose, .. } => {
                MessageTemplates::appointment(scheduled_at, provider, purpose)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RiskFlag
// ---------------------------------------------------------------------------

/// A rule-triggered alert. Ephemeral: recomputed on every request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RiskFlag {
    pub level: RiskLevel,
    pub kind: RiskKind,
    pub title: String,
    pub detail: String,
}

impl RiskFlag {
    pub fn new(kind: RiskKind) -> Self {
        Self {
            level: kind.level(),
            title: kind.title().to_string(),
            detail: kind.detail(),
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// OverallStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OverallStatus {
    Stable,
    Watch,
    NeedsAttention,
}

impl OverallStatus {
    /// Any High flag wins, then any Medium. Low flags never change the status.
    pub fn from_flags(flags: &[RiskFlag]) -> Self {
        if flags.iter().any(|f| f.level == RiskLevel::High) {
            Self::NeedsAttention
        } else if flags.iter().any(|f| f.level == RiskLevel::Medium) {
            Self::Watch
        } else {
            Self::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Watch => "Watch",
            Self::NeedsAttention => "Needs Attention",
        }
    }
}

// ---------------------------------------------------------------------------
// Summary aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SymptomTrend {
    Worsening,
    Improving,
    Stable,
}

impl SymptomTrend {
    /// Only defined when both ends of the window carry a severity.
    pub fn between(earliest: Option<u8>, latest: Option<u8>) -> Option<Self> {
        let delta = i16::from(latest?) - i16::from(earliest?);
        Some(if delta >= 3 {
            Self::Worsening
        } else if delta <= -3 {
            Self::Improving
        } else {
            Self::Stable
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Worsening => "worsening",
            Self::Improving => "improving",
            Self::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StressLabel {
    High,
    Elevated,
    Manageable,
}

impl StressLabel {
    pub fn for_peak(peak: u8) -> Self {
        if peak >= 8 {
            Self::High
        } else if peak >= 6 {
            Self::Elevated
        } else {
            Self::Manageable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Elevated => "elevated",
            Self::Manageable => "manageable",
        }
    }
}

/// Structured result of `compose_summary`: narrative plus the numbers that
/// KPI tiles render directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CareSummary {
    pub recipient_id: Uuid,
    pub generated_for: NaiveDateTime,
    pub lines: Vec<String>,
    pub actions: Vec<String>,
    pub flags: Vec<RiskFlag>,
    pub status: OverallStatus,
    /// `None` when nothing was logged in the window (never 0).
    pub adherence_rate: Option<u32>,
    pub taken: u32,
    pub missed: u32,
    pub earliest_severity: Option<u8>,
    pub latest_severity: Option<u8>,
    pub symptom_trend: Option<SymptomTrend>,
    pub peak_stress: Option<u8>,
    pub common_symptoms: Vec<String>,
}

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Care recipient not found: {0}")]
    RecipientNotFound(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(kind: RiskKind) -> RiskFlag {
        RiskFlag::new(kind)
    }

    #[test]
    fn risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn levels_fixed_per_kind() {
        assert_eq!(
            flag(RiskKind::MissedMedications { medication_names: vec!["A".into()] }).level,
            RiskLevel::High
        );
        assert_eq!(
            flag(RiskKind::HighSeverity { latest_severity: 8 }).level,
            RiskLevel::Medium
        );
        assert_eq!(
            flag(RiskKind::CaregiverBurnout { peak_stress: 9 }).level,
            RiskLevel::Medium
        );
    }

    #[test]
    fn status_ignores_low_flags() {
        let low = flag(RiskKind::UpcomingAppointment {
            appointment_id: Uuid::nil(),
            scheduled_at: chrono::NaiveDate::from_ymd_opt(2026, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            provider: String::new(),
            purpose: String::new(),
        });
        assert_eq!(OverallStatus::from_flags(&[low.clone()]), OverallStatus::Stable);

        let medium = flag(RiskKind::CaregiverBurnout { peak_stress: 8 });
        assert_eq!(
            OverallStatus::from_flags(&[low.clone(), medium.clone()]),
            OverallStatus::Watch
        );

        let high = flag(RiskKind::SymptomsWorsening { from_severity: 2, to_severity: 8 });
        assert_eq!(
            OverallStatus::from_flags(&[low, medium, high]),
            OverallStatus::NeedsAttention
        );
        assert_eq!(OverallStatus::from_flags(&[]), OverallStatus::Stable);
    }

    #[test]
    fn status_display_strings() {
        assert_eq!(OverallStatus::NeedsAttention.as_str(), "Needs Attention");
        assert_eq!(OverallStatus::Watch.as_str(), "Watch");
    }

    #[test]
    fn trend_requires_both_ends() {
        assert_eq!(SymptomTrend::between(None, Some(5)), None);
        assert_eq!(SymptomTrend::between(Some(5), None), None);
        assert_eq!(SymptomTrend::between(Some(2), Some(5)), Some(SymptomTrend::Worsening));
        assert_eq!(SymptomTrend::between(Some(8), Some(5)), Some(SymptomTrend::Improving));
        assert_eq!(SymptomTrend::between(Some(4), Some(6)), Some(SymptomTrend::Stable));
    }

    #[test]
    fn stress_label_thresholds() {
        assert_eq!(StressLabel::for_peak(8), StressLabel::High);
        assert_eq!(StressLabel::for_peak(6), StressLabel::Elevated);
        assert_eq!(StressLabel::for_peak(5), StressLabel::Manageable);
    }

    #[test]
    fn kind_serializes_with_tag() {
        let json = serde_json::to_value(RiskKind::HighSeverity { latest_severity: 9 }).unwrap();
        assert_eq!(json["type"], "high_severity");
        assert_eq!(json["latest_severity"], 9);
    }
}
