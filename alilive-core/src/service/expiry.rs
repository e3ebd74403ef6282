//! Expiry timestamps for signed URLs
//!
//! The platform compares `auth_key` expiry against a Unix timestamp, which is
//! the same in every timezone. The offset only documents which wall clock the
//! caller reasons in.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::{Error, Result};

/// Asia/Shanghai, UTC+8 with no daylight saving
pub const SHANGHAI_OFFSET_SECS: i32 = 8 * 3600;

/// Default lifetime of a signed URL (24 hours)
pub const DEFAULT_TTL_SECS: i64 = 24 * 3600;

/// Unix timestamp `duration_secs` from now, observed in Shanghai time
#[must_use]
pub fn shanghai_expiry(duration_secs: i64) -> i64 {
    let offset = FixedOffset::east_opt(SHANGHAI_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    expiry_from(Utc::now(), offset, duration_secs)
}

/// Unix timestamp `duration_secs` from now, observed at a fixed UTC offset
pub fn expiry_in(offset_secs: i32, duration_secs: i64) -> Result<i64> {
    let offset =
        FixedOffset::east_opt(offset_secs).ok_or(Error::InvalidTimezoneOffset(offset_secs))?;
    Ok(expiry_from(Utc::now(), offset, duration_secs))
}

/// Unix timestamp `duration_secs` after `now`, with `now` viewed at `offset`
///
/// Saturates at the `i64` bounds instead of wrapping.
#[must_use]
pub fn expiry_from(now: DateTime<Utc>, offset: FixedOffset, duration_secs: i64) -> i64 {
    now.with_timezone(&offset)
        .timestamp()
        .saturating_add(duration_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_offset_does_not_change_timestamp() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let shanghai = FixedOffset::east_opt(SHANGHAI_OFFSET_SECS).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();

        assert_eq!(expiry_from(now, shanghai, 60), 1_700_000_060);
        assert_eq!(expiry_from(now, utc, 60), 1_700_000_060);
    }

    #[test]
    fn test_shanghai_expiry_is_now_plus_duration() {
        let before = Utc::now().timestamp();
        let expiry = shanghai_expiry(DEFAULT_TTL_SECS);
        let after = Utc::now().timestamp();

        assert!(expiry >= before + DEFAULT_TTL_SECS);
        assert!(expiry <= after + DEFAULT_TTL_SECS);
    }

    #[test]
    fn test_huge_duration_saturates() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let shanghai = FixedOffset::east_opt(SHANGHAI_OFFSET_SECS).unwrap();

        assert_eq!(expiry_from(now, shanghai, i64::MAX), i64::MAX);
        assert_eq!(
            expiry_from(now, shanghai, i64::MAX - 1_700_000_000),
            i64::MAX
        );
        assert_eq!(expiry_from(now, shanghai, i64::MIN), i64::MIN + 1_700_000_000);
        assert_eq!(shanghai_expiry(i64::MAX), i64::MAX);
    }

    #[test]
    fn test_expiry_in_rejects_bad_offset() {
        assert!(expiry_in(-5 * 3600, 60).is_ok());
        assert!(matches!(
            expiry_in(25 * 3600, 60),
            Err(Error::InvalidTimezoneOffset(90_000))
        ));
    }
}
