use super::types::{RiskFlag, RiskKind, RiskLevel};

pub const ACTION_DOUBLE_REMINDER: &str =
    "Review medication schedule and set a double reminder (alarm + checklist).";
pub const ACTION_FAMILY_CONFIRM: &str =
    "Ask a family member to confirm meds for the next 2\u{2013}3 days.";
pub const ACTION_CONTACT_PROVIDER: &str =
    "Contact the provider/clinic and describe the symptom trend using your logs.";
pub const ACTION_WRITE_DOWN: &str =
    "Write down: when symptoms started, what changed, and what helps.";
pub const ACTION_DELEGATE: &str =
    "Delegate one task this week and schedule a daily recovery break.";
pub const ACTION_PREPARE_QUESTIONS: &str =
    "Prepare 3 questions and bring a med list + symptom timeline.";
pub const ACTION_NO_URGENT_RISKS: &str =
    "No urgent risks flagged. Keep logging check-ins to improve trend detection.";

/// Map flags to suggested next steps.
///
/// Never empty: with nothing matched the single fallback is returned. The
/// list is deduplicated and untruncated; display limits belong to callers.
pub fn recommend_actions(flags: &[RiskFlag]) -> Vec<String> {
    let has = |pred: fn(&RiskFlag) -> bool| flags.iter().any(pred);

    let mut actions: Vec<&'static str> = Vec::new();

    if has(|f| f.level == RiskLevel::High && matches!(f.kind, RiskKind::MissedMedications { .. })) {
        actions.push(ACTION_DOUBLE_REMINDER);
        actions.push(ACTION_FAMILY_CONFIRM);
    }

    if has(|f| f.level == RiskLevel::High && matches!(f.kind, RiskKind::SymptomsWorsening { .. })) {
        actions.push(ACTION_CONTACT_PROVIDER);
        actions.push(ACTION_WRITE_DOWN);
    }

    if has(|f| matches!(f.kind, RiskKind::CaregiverBurnout { .. })) {
        actions.push(ACTION_DELEGATE);
    }

    if has(|f| matches!(f.kind, RiskKind::UpcomingAppointment { .. })) {
        actions.push(ACTION_PREPARE_QUESTIONS);
    }

    if actions.is_empty() {
        actions.push(ACTION_NO_URGENT_RISKS);
    }

    let mut deduped: Vec<String> = Vec::with_capacity(actions.len());
    for action in actions {
        if !deduped.iter().any(|a| a == action) {
            deduped.push(action.to_string());
        }
    }
    deduped
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    fn missed() -> RiskFlag {
        RiskFlag::new(RiskKind::MissedMedications {
            medication_names: vec!["Metformin".into()],
        })
    }

    fn appointment() -> RiskFlag {
        RiskFlag::new(RiskKind::UpcomingAppointment {
            appointment_id: Uuid::nil(),
            scheduled_at: NaiveDate::from_ymd_opt(2026, 3, 11)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            provider: "Dr. Smith".into(),
            purpose: "Follow-up".into(),
        })
    }

    #[test]
    fn empty_flags_return_single_fallback() {
        let actions = recommend_actions(&[]);
        assert_eq!(actions, vec![ACTION_NO_URGENT_RISKS.to_string()]);
    }

    #[test]
    fn missed_medications_add_two_actions() {
        let actions = recommend_actions(&[missed()]);
        assert_eq!(actions, vec![ACTION_DOUBLE_REMINDER, ACTION_FAMILY_CONFIRM]);
    }

    #[test]
    fn high_severity_alone_uses_fallback() {
        let actions = recommend_actions(&[RiskFlag::new(RiskKind::HighSeverity {
            latest_severity: 9,
        })]);
        assert_eq!(actions, vec![ACTION_NO_URGENT_RISKS]);
    }

    #[test]
    fn all_rules_in_table_order() {
        let flags = vec![
            appointment(),
            RiskFlag::new(RiskKind::CaregiverBurnout { peak_stress: 9 }),
            RiskFlag::new(RiskKind::SymptomsWorsening {
                from_severity: 2,
                to_severity: 8,
            }),
            missed(),
        ];
        let actions = recommend_actions(&flags);
        assert_eq!(
            actions,
            vec![
                ACTION_DOUBLE_REMINDER,
                ACTION_FAMILY_CONFIRM,
                ACTION_CONTACT_PROVIDER,
                ACTION_WRITE_DOWN,
                ACTION_DELEGATE,
                ACTION_PREPARE_QUESTIONS,
            ]
        );
    }

    #[test]
    fn repeated_flags_do_not_duplicate_actions() {
        let actions = recommend_actions(&[appointment(), appointment()]);
        assert_eq!(actions, vec![ACTION_PREPARE_QUESTIONS]);
    }

    #[test]
    fn missed_flag_downgraded_from_high_does_not_match() {
        let mut flag = missed();
        flag.level = RiskLevel::Medium;
        assert_eq!(recommend_actions(&[flag]), vec![ACTION_NO_URGENT_RISKS]);
    }
}
