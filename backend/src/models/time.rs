use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed time interval `[from, to]` used for range queries.
///
/// Invariant: `from <= to`. Built per request, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TimeRange {
    /// Create a range, or `None` when `to` lies before `from`.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Option<Self> {
        (from <= to).then_some(Self { from, to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn width(&self) -> Duration {
        self.to - self.from
    }

    /// Inclusive on both ends.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from <= ts && ts <= self.to
    }
}

/// Parse a request timestamp.
///
/// Accepts RFC 3339 (`2016-03-01T12:00:00Z`), a zone-less date-time which is
/// read as UTC, and a bare date which means midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_range_rejects_inverted_bounds() {
        let a = Utc.with_ymd_and_hms(2016, 3, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2016, 3, 2, 0, 0, 0).unwrap();
        assert!(TimeRange::new(a, b).is_some());
        assert!(TimeRange::new(b, a).is_none());
    }

    #[test]
    fn test_time_range_allows_empty_width() {
        let a = Utc.with_ymd_and_hms(2016, 3, 1, 0, 0, 0).unwrap();
        let range = TimeRange::new(a, a).unwrap();
        assert_eq!(range.width(), Duration::zero());
        assert!(range.contains(a));
    }

    #[test]
    fn test_time_range_contains_is_inclusive() {
        let a = Utc.with_ymd_and_hms(2016, 3, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2016, 3, 2, 0, 0, 0).unwrap();
        let range = TimeRange::new(a, b).unwrap();
        assert!(range.contains(a));
        assert!(range.contains(b));
        assert!(!range.contains(b + Duration::seconds(1)));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2016, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2016-03-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2016-03-01T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2016-03-01T12:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2016-03-01"),
            Some(Utc.with_ymd_and_hms(2016, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2016-13-01"), None);
    }
}
