//! Backup health classification

use chrono::{DateTime, Utc};

use crate::domain::HealthStatus;

/// A daily schedule plus slack: newer than this is healthy
pub const HEALTHY_HOURS: f64 = 25.0;
/// One missed run tolerated: newer than this is a warning, older is critical
pub const WARNING_HOURS: f64 = 49.0;

/// Fractional hours from `then` to `now`
pub fn hours_since(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - then).num_milliseconds() as f64 / 3_600_000.0
}

/// Classify the age of the newest backup
pub fn classify(newest: Option<DateTime<Utc>>, now: DateTime<Utc>) -> HealthStatus {
    let Some(newest) = newest else {
        return HealthStatus::NoBackups;
    };

    let hours = hours_since(newest, now);
    if hours < HEALTHY_HOURS {
        HealthStatus::Healthy
    } else if hours < WARNING_HOURS {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_no_backups() {
        assert_eq!(classify(None, Utc::now()), HealthStatus::NoBackups);
    }

    #[test]
    fn test_thresholds() {
        let now = Utc::now();
        let at = |minutes: i64| classify(Some(now - Duration::minutes(minutes)), now);

        assert_eq!(at(0), HealthStatus::Healthy);
        assert_eq!(at(24 * 60 + 59), HealthStatus::Healthy);
        assert_eq!(at(25 * 60), HealthStatus::Warning);
        assert_eq!(at(48 * 60 + 59), HealthStatus::Warning);
        assert_eq!(at(49 * 60), HealthStatus::Critical);
        assert_eq!(at(30 * 24 * 60), HealthStatus::Critical);
    }

    #[test]
    fn test_future_timestamp_is_healthy() {
        let now = Utc::now();
        assert_eq!(classify(Some(now + Duration::hours(3)), now), HealthStatus::Healthy);
    }
}
