//! Temporal validation: staleness and dormancy.

use chrono::{DateTime, Utc};

use cortex_core::memory::{half_life_days, staleness_threshold_days, BaseMemory};
use cortex_core::models::{IssueSeverity, ValidationDimension, ValidationIssue};

pub fn validate(memory: &BaseMemory, now: DateTime<Utc>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let anchor = memory.last_validated.unwrap_or(memory.created_at);
    let unvalidated_days = days_between(anchor, now);
    let threshold = staleness_threshold_days(memory.memory_type);
    if unvalidated_days > threshold {
        let severity = if unvalidated_days <= threshold * 2.0 {
            IssueSeverity::Minor
        } else {
            IssueSeverity::Moderate
        };
        issues.push(ValidationIssue {
            dimension: ValidationDimension::Temporal,
            kind: ValidationIssue::TEMPORAL_STALE.to_string(),
            severity,
            description: format!(
                "unvalidated for {unvalidated_days:.0} days (threshold {threshold:.0})"
            ),
            citation_index: None,
        });
    }

    if let Some(half_life) = half_life_days(memory.memory_type) {
        let idle_days = days_between(memory.last_accessed, now);
        if idle_days > half_life {
            issues.push(ValidationIssue {
                dimension: ValidationDimension::Temporal,
                kind: ValidationIssue::TEMPORAL_DORMANT.to_string(),
                severity: IssueSeverity::Minor,
                description: format!(
                    "not accessed for {idle_days:.0} days (half-life {half_life:.0})"
                ),
                citation_index: None,
            });
        }
    }

    issues
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds().max(0) as f64 / 86_400.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::{aged, episode, tribal};

    #[test]
    fn fresh_memory_is_clean() {
        let memory = tribal("just learned");
        assert!(validate(&memory, Utc::now()).is_empty());
    }

    #[test]
    fn old_episode_is_stale_and_dormant() {
        let memory = aged(episode("general", "ancient history", &[]), 20);
        let issues = validate(&memory, Utc::now());
        let kinds: Vec<&str> = issues.iter().map(|i| i.kind.as_str()).collect();
        assert!(kinds.contains(&ValidationIssue::TEMPORAL_STALE));
        assert!(kinds.contains(&ValidationIssue::TEMPORAL_DORMANT));
    }

    #[test]
    fn severity_escalates_past_double_threshold() {
        // Episodic threshold is 7 days; 20 days is past 2x.
        let memory = aged(episode("general", "very old", &[]), 20);
        let stale = validate(&memory, Utc::now())
            .into_iter()
            .find(|i| i.kind == ValidationIssue::TEMPORAL_STALE)
            .unwrap();
        assert_eq!(stale.severity, IssueSeverity::Moderate);

        let memory = aged(episode("general", "slightly old", &[]), 10);
        let stale = validate(&memory, Utc::now())
            .into_iter()
            .find(|i| i.kind == ValidationIssue::TEMPORAL_STALE)
            .unwrap();
        assert_eq!(stale.severity, IssueSeverity::Minor);
    }
}
