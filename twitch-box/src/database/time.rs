//! Timestamp helpers for the database layer.
//!
//! We store timestamps as `INTEGER` Unix epoch milliseconds (UTC) in SQLite.

use chrono::Utc;
use std::time::Duration;

/// Current time as Unix epoch milliseconds (UTC).
#[inline]
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert a duration to whole milliseconds, saturating at `i64::MAX`.
#[inline]
pub fn duration_to_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Time left until `expires_at_ms`, or `None` once it has passed.
#[inline]
pub fn remaining(expires_at_ms: i64) -> Option<Duration> {
    let left = expires_at_ms - now_ms();
    u64::try_from(left)
        .ok()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining() {
        assert!(remaining(now_ms() - 1).is_none());
        let left = remaining(now_ms() + 60_000).unwrap();
        assert!(left <= Duration::from_secs(60));
        assert!(left > Duration::from_secs(59));
    }

    #[test]
    fn test_duration_to_ms() {
        assert_eq!(duration_to_ms(Duration::from_secs(86_400)), 86_400_000);
        assert_eq!(duration_to_ms(Duration::MAX), i64::MAX);
    }
}
