//! Keycloak status condition reporting

use chrono::{DateTime, SecondsFormat, Utc};
use keycloak_api::constants::CONDITION_HAS_ERRORS;
use keycloak_api::{KeycloakStatus, KeycloakStatusCondition};

/// Status reflecting the outcome of a reconciliation, or `None` when the
/// current status already says the same thing.
///
/// `error` is the failure message of the pass, if it failed.
pub fn next_status(
    current: Option<&KeycloakStatus>,
    generation: Option<i64>,
    error: Option<&str>,
    now: DateTime<Utc>,
) -> Option<KeycloakStatus> {
    let has_errors = Some(error.is_some());
    let message = error.map(str::to_string);
    let previous = current.and_then(|s| s.condition(CONDITION_HAS_ERRORS));

    if let (Some(status), Some(condition)) = (current, previous) {
        if condition.status == has_errors
            && condition.message == message
            && status.observed_generation == generation
        {
            return None;
        }
    }

    let last_transition_time = match previous {
        Some(condition) if condition.status == has_errors => condition.last_transition_time.clone(),
        _ => Some(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
    };
    let condition = KeycloakStatusCondition {
        condition_type: CONDITION_HAS_ERRORS.to_string(),
        status: has_errors,
        message,
        last_transition_time,
        observed_generation: generation,
    };

    let mut next = current.cloned().unwrap_or_default();
    next.observed_generation = generation;
    match next
        .conditions
        .iter_mut()
        .find(|c| c.condition_type == CONDITION_HAS_ERRORS)
    {
        Some(existing) => *existing = condition,
        None => next.conditions.push(condition),
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_first_success_reports_no_errors() {
        let status = next_status(None, Some(1), None, at(0)).unwrap();

        let condition = status.condition(CONDITION_HAS_ERRORS).unwrap();
        assert_eq!(condition.status, Some(false));
        assert_eq!(condition.message, None);
        assert_eq!(condition.last_transition_time.as_deref(), Some("1970-01-01T00:00:00Z"));
        assert_eq!(status.observed_generation, Some(1));
    }

    #[test]
    fn test_unchanged_status_is_not_rewritten() {
        let status = next_status(None, Some(1), None, at(0)).unwrap();
        assert_eq!(next_status(Some(&status), Some(1), None, at(60)), None);
    }

    #[test]
    fn test_failure_flips_condition() {
        let ok = next_status(None, Some(1), None, at(0)).unwrap();
        let failed = next_status(Some(&ok), Some(1), Some("conflict"), at(60)).unwrap();

        let condition = failed.condition(CONDITION_HAS_ERRORS).unwrap();
        assert_eq!(condition.status, Some(true));
        assert_eq!(condition.message.as_deref(), Some("conflict"));
        assert_eq!(condition.last_transition_time.as_deref(), Some("1970-01-01T00:01:00Z"));
        assert_eq!(failed.conditions.len(), 1);
    }

    #[test]
    fn test_new_message_keeps_transition_time() {
        let failed = next_status(None, Some(1), Some("first"), at(0)).unwrap();
        let again = next_status(Some(&failed), Some(1), Some("second"), at(60)).unwrap();

        let condition = again.condition(CONDITION_HAS_ERRORS).unwrap();
        assert_eq!(condition.message.as_deref(), Some("second"));
        assert_eq!(condition.last_transition_time.as_deref(), Some("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn test_new_generation_is_recorded() {
        let ok = next_status(None, Some(1), None, at(0)).unwrap();
        let next = next_status(Some(&ok), Some(2), None, at(60)).unwrap();
        assert_eq!(next.observed_generation, Some(2));
    }

    #[test]
    fn test_other_conditions_are_kept() {
        let current = KeycloakStatus {
            observed_generation: Some(1),
            conditions: vec![KeycloakStatusCondition {
                condition_type: "Ready".to_string(),
                status: Some(true),
                ..Default::default()
            }],
        };
        let next = next_status(Some(&current), Some(1), None, at(0)).unwrap();

        assert_eq!(next.conditions.len(), 2);
        assert!(next.condition("Ready").is_some());
    }
}
