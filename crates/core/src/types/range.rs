//! Date ranges for seller analytics.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Reporting window for seller dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsRange {
    /// Since midnight UTC today.
    Today,
    /// The last 7 days.
    Week,
    /// The last 30 days.
    #[default]
    Month,
}

impl AnalyticsRange {
    /// Start of the window ending at `now`.
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .map_or(now, |midnight| midnight.and_utc()),
            Self::Week => now - Duration::days(7),
            Self::Month => now - Duration::days(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn test_today_starts_at_midnight_utc() {
        let start = AnalyticsRange::Today.start(noon());
        assert_eq!(
            start,
            Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0)
                .single()
                .expect("valid timestamp")
        );
    }

    #[test]
    fn test_week_and_month_are_rolling() {
        assert_eq!(AnalyticsRange::Week.start(noon()), noon() - Duration::days(7));
        assert_eq!(AnalyticsRange::Month.start(noon()), noon() - Duration::days(30));
    }

    #[test]
    fn test_parses_lowercase_names() {
        let range: AnalyticsRange = serde_json::from_str("\"week\"").expect("deserialize");
        assert_eq!(range, AnalyticsRange::Week);
        assert_eq!(AnalyticsRange::default(), AnalyticsRange::Month);
    }
}
