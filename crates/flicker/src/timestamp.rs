//! Trace timestamps.
//!
//! A trace entry may be stamped by up to three clocks: elapsed realtime,
//! system uptime and wall clock (unix). Entries coming from different
//! traces rarely share all three, so comparisons fall back to the most
//! precise clock both sides carry.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SECOND: i64 = 1_000 * NANOS_PER_MILLI;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i64 = 24 * NANOS_PER_HOUR;

/// Timestamp of one trace entry, in nanoseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Nanoseconds since boot, including deep sleep
    pub elapsed_nanos: i64,
    /// Nanoseconds since boot, excluding deep sleep
    pub system_uptime_nanos: i64,
    /// Nanoseconds since the unix epoch
    pub unix_nanos: i64,
}

impl Timestamp {
    /// Create a timestamp from all three clocks
    #[must_use]
    pub const fn new(elapsed_nanos: i64, system_uptime_nanos: i64, unix_nanos: i64) -> Self {
        Self {
            elapsed_nanos,
            system_uptime_nanos,
            unix_nanos,
        }
    }

    /// The timestamp of a trace without entries
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(0, 0, 0)
    }

    /// Create a timestamp from the elapsed realtime clock only
    #[must_use]
    pub const fn from_elapsed_nanos(nanos: i64) -> Self {
        Self::new(nanos, 0, 0)
    }

    /// Create a timestamp from the system uptime clock only
    #[must_use]
    pub const fn from_system_uptime_nanos(nanos: i64) -> Self {
        Self::new(0, nanos, 0)
    }

    /// Create a timestamp from the wall clock only
    #[must_use]
    pub const fn from_unix_nanos(nanos: i64) -> Self {
        Self::new(0, 0, nanos)
    }

    /// Current wall clock time
    ///
    /// Only the unix clock is filled in: the boot-relative clocks belong
    /// to the device that captured the trace.
    #[must_use]
    pub fn now() -> Self {
        let now = chrono::Utc::now();
        let unix = now.timestamp_nanos_opt().unwrap_or_default();
        Self::from_unix_nanos(unix)
    }

    /// Check whether no clock is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.elapsed_nanos == 0 && self.system_uptime_nanos == 0 && self.unix_nanos == 0
    }

    /// Check whether the wall clock is set
    #[must_use]
    pub const fn has_unix(&self) -> bool {
        self.unix_nanos != 0
    }

    fn clock_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.unix_nanos != 0 && other.unix_nanos != 0 {
            Some(self.unix_nanos.cmp(&other.unix_nanos))
        } else if self.system_uptime_nanos != 0 && other.system_uptime_nanos != 0 {
            Some(self.system_uptime_nanos.cmp(&other.system_uptime_nanos))
        } else if self.elapsed_nanos != 0 && other.elapsed_nanos != 0 {
            Some(self.elapsed_nanos.cmp(&other.elapsed_nanos))
        } else if self.is_empty() && other.is_empty() {
            Some(Ordering::Equal)
        } else {
            None
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        // Equal on the shared clock but different elsewhere: no ordering.
        match self.clock_cmp(other)? {
            Ordering::Equal => None,
            ordering => Some(ordering),
        }
    }
}

/// Format a nanosecond duration as `1d2h3m4s5ms6ns`, skipping zero units
#[must_use]
pub fn format_duration_nanos(nanos: i64) -> String {
    if nanos == 0 {
        return "0ns".to_string();
    }
    let sign = if nanos < 0 { "-" } else { "" };
    let mut remaining = nanos.unsigned_abs();
    let units: [(u64, &str); 5] = [
        (NANOS_PER_DAY as u64, "d"),
        (NANOS_PER_HOUR as u64, "h"),
        (NANOS_PER_MINUTE as u64, "m"),
        (NANOS_PER_SECOND as u64, "s"),
        (NANOS_PER_MILLI as u64, "ms"),
    ];
    let mut out = String::from(sign);
    for (size, suffix) in units {
        let count = remaining / size;
        if count > 0 {
            out.push_str(&format!("{count}{suffix}"));
            remaining %= size;
        }
    }
    if remaining > 0 {
        out.push_str(&format!("{remaining}ns"));
    }
    out
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<NO TIMESTAMP>");
        }
        if self.unix_nanos != 0 {
            let secs = self.unix_nanos.div_euclid(NANOS_PER_SECOND);
            let nanos = self.unix_nanos.rem_euclid(NANOS_PER_SECOND) as u32;
            if let Some(date) = chrono::DateTime::from_timestamp(secs, nanos) {
                return write!(f, "{}", date.format("%Y-%m-%dT%H:%M:%S%.9f"));
            }
        }
        if self.elapsed_nanos != 0 {
            write!(f, "{}", format_duration_nanos(self.elapsed_nanos))
        } else {
            write!(f, "{}", format_duration_nanos(self.system_uptime_nanos))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod ordering {
        use super::*;

        #[test]
        fn test_compares_on_elapsed_clock() {
            let a = Timestamp::from_elapsed_nanos(10);
            let b = Timestamp::from_elapsed_nanos(20);
            assert!(a < b);
            assert!(b > a);
        }

        #[test]
        fn test_prefers_unix_clock() {
            let a = Timestamp::new(50, 0, 100);
            let b = Timestamp::new(10, 0, 200);
            assert!(a < b);
        }

        #[test]
        fn test_no_shared_clock_is_unordered() {
            let a = Timestamp::from_elapsed_nanos(10);
            let b = Timestamp::from_unix_nanos(10);
            assert_eq!(a.partial_cmp(&b), None);
        }

        #[test]
        fn test_empty_equals_empty() {
            assert_eq!(
                Timestamp::empty().partial_cmp(&Timestamp::empty()),
                Some(Ordering::Equal)
            );
        }
    }

    mod display {
        use super::*;

        #[test]
        fn test_empty_display() {
            assert_eq!(Timestamp::empty().to_string(), "<NO TIMESTAMP>");
            assert!(Timestamp::empty().is_empty());
        }

        #[test]
        fn test_elapsed_display() {
            let ts = Timestamp::from_elapsed_nanos(NANOS_PER_HOUR + 2 * NANOS_PER_SECOND + 5);
            assert_eq!(ts.to_string(), "1h2s5ns");
        }

        #[test]
        fn test_unix_display() {
            let ts = Timestamp::from_unix_nanos(NANOS_PER_DAY + 1);
            assert_eq!(ts.to_string(), "1970-01-02T00:00:00.000000001");
        }

        #[test]
        fn test_format_duration() {
            assert_eq!(format_duration_nanos(0), "0ns");
            assert_eq!(format_duration_nanos(-3 * NANOS_PER_MILLI), "-3ms");
            let day_and_minute = NANOS_PER_DAY + NANOS_PER_MINUTE;
            assert_eq!(format_duration_nanos(day_and_minute), "1d1m");
        }
    }

    #[test]
    fn test_now_sets_unix_clock_only() {
        let now = Timestamp::now();
        assert!(now.has_unix());
        assert_eq!(now.elapsed_nanos, 0);
        assert_eq!(now.system_uptime_nanos, 0);
    }
}
