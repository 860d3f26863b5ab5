use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::ApiError;

/// Largest accepted distance, in either direction, between a press timestamp and the server clock.
pub const MAX_CLOCK_SKEW_MS: i64 = 10_000;

/// Offset-less forms a browser or script may send. They are read as UTC.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at one instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(ts) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(ts, format).ok())
        .map(|naive| naive.and_utc())
}

/// Accept a press only if its timestamp is present, readable and close to `now`.
pub fn validate_timestamp(ts: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>, ApiError> {
    let raw = ts
        .filter(|ts| !ts.is_empty())
        .ok_or_else(|| ApiError::Validation("missing ts".to_string()))?;

    let pressed_at = parse_timestamp(raw)
        .ok_or_else(|| ApiError::Validation(format!("unreadable ts {raw:?}")))?;

    let skew = (now - pressed_at).num_milliseconds();
    if skew.abs() > MAX_CLOCK_SKEW_MS {
        return Err(ApiError::Validation(format!(
            "ts {raw} is {skew}ms away from server time"
        )));
    }

    Ok(pressed_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SecondsFormat, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn stamp(offset_ms: i64) -> String {
        (now() + Duration::milliseconds(offset_ms)).to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    #[test]
    fn accepts_offsets_and_naive_forms() {
        assert_eq!(parse_timestamp("2024-05-01T14:00:00+02:00"), Some(now()));
        assert_eq!(parse_timestamp("2024-05-01T12:00:00.000Z"), Some(now()));
        assert_eq!(parse_timestamp("2024-05-01T12:00:00"), Some(now()));
        assert_eq!(parse_timestamp("2024-05-01T12:00"), Some(now()));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn boundary_is_inclusive() {
        assert!(validate_timestamp(Some(&stamp(10_000)), now()).is_ok());
        assert!(validate_timestamp(Some(&stamp(-10_000)), now()).is_ok());
        assert!(validate_timestamp(Some(&stamp(10_001)), now()).is_err());
    }

    #[test]
    fn missing_or_empty_ts_is_rejected() {
        assert!(matches!(validate_timestamp(None, now()), Err(ApiError::Validation(_))));
        assert!(matches!(validate_timestamp(Some(""), now()), Err(ApiError::Validation(_))));
        assert!(matches!(
            validate_timestamp(Some("not a date"), now()),
            Err(ApiError::Validation(_))
        ));
    }

    proptest! {
        #[test]
        fn presses_inside_the_window_pass(offset in -MAX_CLOCK_SKEW_MS..=MAX_CLOCK_SKEW_MS) {
            prop_assert!(validate_timestamp(Some(&stamp(offset)), now()).is_ok());
        }

        #[test]
        fn presses_outside_the_window_fail(
            offset in (MAX_CLOCK_SKEW_MS + 1)..86_400_000i64,
            past in any::<bool>()
        ) {
            let offset = if past { -offset } else { offset };
            prop_assert!(validate_timestamp(Some(&stamp(offset)), now()).is_err());
        }
    }
}
