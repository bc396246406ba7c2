//! Time handling for forecast validity windows and hourly cache keys.

use chrono::{DateTime, Duration, DurationRound, NaiveDateTime, TimeZone, Utc};

/// Truncate a timestamp to the start of its UTC hour.
pub fn truncate_to_hour(now: DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(Duration::hours(1)).unwrap_or(now)
}

/// Hour-granularity UTC key, e.g. `2024-06-01T14`.
pub fn hour_key(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H").to_string()
}

/// A forecast validity window parsed from an NWS `validTime` value.
///
/// NWS gridpoint values carry `validTime` as an ISO-8601 start instant and a
/// duration separated by `/`, e.g. `2024-06-01T12:00:00+00:00/PT3H`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ValidInterval {
    /// Parse `start/duration`. Returns `None` for malformed strings, for
    /// zero-length durations and for windows ending outside the representable
    /// time range.
    pub fn parse(valid_time: &str) -> Option<Self> {
        let (start_str, duration_str) = valid_time.split_once('/')?;
        let start = parse_instant(start_str)?;
        let duration = parse_iso_duration(duration_str)?;
        if duration == Duration::zero() {
            return None;
        }
        let end = start.checked_add_signed(duration)?;
        Some(Self { start, end })
    }

    /// Half-open containment: `start <= t < end`.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // No offset: assume UTC
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|ndt| Utc.from_utc_datetime(&ndt))
}

/// Parse the `P[nD][T[nH][nM][nS]]` subset of ISO-8601 durations used by NWS.
///
/// Components too large for a `Duration` yield `None`.
pub fn parse_iso_duration(s: &str) -> Option<Duration> {
    let rest = s.strip_prefix('P')?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };

    let mut total = Duration::zero();

    if !date_part.is_empty() {
        let days = date_part.strip_suffix('D')?;
        total = total.checked_add(&Duration::try_days(parse_digits(days)?)?)?;
    }

    if let Some(mut time) = time_part {
        // Designators must appear in H, M, S order, each at most once
        for (designator, unit) in [('H', 3600), ('M', 60), ('S', 1)] {
            if let Some(idx) = time.find(designator) {
                let value = parse_digits(&time[..idx])?;
                let seconds = Duration::try_seconds(value.checked_mul(unit)?)?;
                total = total.checked_add(&seconds)?;
                time = &time[idx + 1..];
            }
        }
        if !time.is_empty() {
            return None;
        }
    }

    Some(total)
}

fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_hour_key() {
        assert_eq!(hour_key(utc("2024-06-01T14:59:59Z")), "2024-06-01T14");
        assert_eq!(hour_key(utc("2024-06-01T15:00:00Z")), "2024-06-01T15");
    }

    #[test]
    fn test_truncate_to_hour() {
        assert_eq!(
            truncate_to_hour(utc("2024-06-01T14:37:12Z")),
            utc("2024-06-01T14:00:00Z")
        );
    }

    #[test]
    fn test_parse_durations() {
        assert_eq!(parse_iso_duration("PT1H"), Some(Duration::hours(1)));
        assert_eq!(parse_iso_duration("P1DT6H"), Some(Duration::hours(30)));
        assert_eq!(parse_iso_duration("P2D"), Some(Duration::days(2)));
        assert_eq!(
            parse_iso_duration("PT1H30M15S"),
            Some(Duration::seconds(5415))
        );
        assert_eq!(parse_iso_duration("PT45M"), Some(Duration::minutes(45)));
    }

    #[test]
    fn test_parse_malformed_durations() {
        assert_eq!(parse_iso_duration("1H"), None);
        assert_eq!(parse_iso_duration("PTH"), None);
        assert_eq!(parse_iso_duration("PT1X"), None);
        assert_eq!(parse_iso_duration("PT30M1H"), None);
    }

    #[test]
    fn test_valid_interval_contains() {
        let interval = ValidInterval::parse("2024-06-01T12:00:00+00:00/PT3H").unwrap();
        assert!(interval.contains(utc("2024-06-01T12:00:00Z")));
        assert!(interval.contains(utc("2024-06-01T14:59:59Z")));
        assert!(!interval.contains(utc("2024-06-01T15:00:00Z")));
        assert!(!interval.contains(utc("2024-06-01T11:59:59Z")));
    }

    #[test]
    fn test_valid_interval_rejects_zero_and_garbage() {
        assert!(ValidInterval::parse("2024-06-01T12:00:00+00:00/PT0H").is_none());
        assert!(ValidInterval::parse("2024-06-01T12:00:00+00:00/P").is_none());
        assert!(ValidInterval::parse("2024-06-01T12:00:00+00:00").is_none());
        assert!(ValidInterval::parse("yesterday/PT1H").is_none());
        assert!(ValidInterval::parse("").is_none());
    }

    #[test]
    fn test_oversized_durations_are_rejected() {
        assert_eq!(parse_iso_duration("P9999999999999D"), None);
        assert_eq!(parse_iso_duration("PT9223372036854775807H"), None);
        assert_eq!(parse_iso_duration("P99999999999999999999D"), None);
        assert_eq!(parse_iso_duration("P100000000D"), Some(Duration::days(100_000_000)));
    }

    #[test]
    fn test_valid_interval_past_time_range_is_rejected() {
        assert!(ValidInterval::parse("2024-06-01T12:00:00+00:00/P100000000D").is_none());
        assert!(ValidInterval::parse("2024-06-01T12:00:00+00:00/P9999999999999D").is_none());
    }

    #[test]
    fn test_valid_interval_zulu_and_naive() {
        let z = ValidInterval::parse("2024-06-01T12:00:00Z/PT1H").unwrap();
        let naive = ValidInterval::parse("2024-06-01T12:00:00/PT1H").unwrap();
        assert_eq!(z, naive);
    }
}
