//! The device's `time` type.

use chrono::{DateTime, Utc};

use crate::error::{ScriptError, ScriptResult};

const NANOS_PER_SEC: u64 = 1_000_000_000;
const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// A signed elapsed time, kept in the components it was written with.
///
/// Components are not normalized: `90s` stays 90 seconds and `25:00:00`
/// stays 25 hours, so equality is structural.
///
/// A total day count is only known for durations measured between two
/// timestamps (see [`Duration::between`]); it selects the absolute day form
/// when encoding and is ignored by equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct Duration {
    negative: bool,
    days: u64,
    hours: u64,
    minutes: u64,
    seconds: u64,
    nanos: u32,
    total_days: Option<u64>,
}

impl PartialEq for Duration {
    fn eq(&self, other: &Self) -> bool {
        self.negative == other.negative
            && self.days == other.days
            && self.hours == other.hours
            && self.minutes == other.minutes
            && self.seconds == other.seconds
            && self.nanos == other.nanos
    }
}

impl Eq for Duration {}

impl Duration {
    /// Create a positive duration from whole components.
    pub fn new(days: u64, hours: u64, minutes: u64, seconds: u64) -> Self {
        Duration {
            days,
            hours,
            minutes,
            seconds,
            ..Default::default()
        }
    }

    /// Create a duration of whole seconds.
    pub fn from_secs(seconds: u64) -> Self {
        Duration::new(0, 0, 0, seconds)
    }

    /// Set the sub-second fraction, carrying whole seconds out of it.
    ///
    /// The seconds saturate at `u64::MAX`.
    pub fn with_nanos(mut self, nanos: u64) -> Self {
        self.seconds = self.seconds.saturating_add(nanos / NANOS_PER_SEC);
        self.nanos = (nanos % NANOS_PER_SEC) as u32;
        self
    }

    /// Flip the direction.
    pub fn negated(mut self) -> Self {
        self.negative = !self.negative;
        self
    }

    /// Convert from a std duration, normalized to days/hours/minutes/seconds.
    pub fn from_std(duration: std::time::Duration) -> Self {
        Duration::from_normalized_secs(duration.as_secs(), duration.subsec_nanos())
    }

    fn from_normalized_secs(total: u64, nanos: u32) -> Self {
        Duration {
            negative: false,
            days: total / SECS_PER_DAY,
            hours: total % SECS_PER_DAY / SECS_PER_HOUR,
            minutes: total % SECS_PER_HOUR / SECS_PER_MINUTE,
            seconds: total % SECS_PER_MINUTE,
            nanos,
            total_days: None,
        }
    }

    /// The elapsed time from `from` to `to`.
    ///
    /// The result is normalized and carries a defined total day count.
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        let delta = to.signed_duration_since(from);
        let negative = delta < chrono::TimeDelta::zero();
        let delta = delta.abs();
        let secs = delta.num_seconds() as u64;
        let nanos = delta.subsec_nanos().unsigned_abs();
        let mut duration = Duration::from_normalized_secs(secs, nanos);
        duration.negative = negative;
        duration.total_days = Some(duration.days);
        duration
    }

    /// Whether the duration points backwards in time.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Whole days.
    pub fn days(&self) -> u64 {
        self.days
    }

    /// Hours (not limited to 0-23).
    pub fn hours(&self) -> u64 {
        self.hours
    }

    /// Minutes.
    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    /// Whole seconds.
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Sub-second fraction in nanoseconds (0..1_000_000_000).
    pub fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// Total elapsed days, when known from a calendar difference.
    pub fn total_days(&self) -> Option<u64> {
        self.total_days
    }

    /// Total whole seconds, ignoring the sign and the fraction.
    ///
    /// `None` when the components do not fit in a `u64` of seconds.
    pub fn whole_seconds(&self) -> Option<u64> {
        self.days
            .checked_mul(SECS_PER_DAY)?
            .checked_add(self.hours.checked_mul(SECS_PER_HOUR)?)?
            .checked_add(self.minutes.checked_mul(SECS_PER_MINUTE)?)?
            .checked_add(self.seconds)
    }

    /// Convert to a std duration. Negative and oversized durations are
    /// rejected.
    pub fn to_std(&self) -> ScriptResult<std::time::Duration> {
        if self.negative {
            return Err(ScriptError::DurationOutOfRange(
                "negative durations have no std representation".to_string(),
            ));
        }
        let seconds = self.whole_seconds().ok_or_else(|| {
            ScriptError::DurationOutOfRange(format!("{:?} exceeds u64 seconds", self))
        })?;
        Ok(std::time::Duration::new(seconds, self.nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_with_nanos_carries() {
        let d = Duration::from_secs(4).with_nanos(1_500_000_000);
        assert_eq!(d.seconds(), 5);
        assert_eq!(d.subsec_nanos(), 500_000_000);
    }

    #[test]
    fn test_from_std_normalizes() {
        let d = Duration::from_std(std::time::Duration::from_secs(90_061));
        assert_eq!(d, Duration::new(1, 1, 1, 1));
        assert_eq!(d.to_std().unwrap().as_secs(), 90_061);
    }

    #[test]
    fn test_between_sets_total_days() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 3, 5, 0, 0).unwrap();
        let forward = Duration::between(a, b);
        assert_eq!(forward, Duration::new(2, 5, 0, 0));
        assert_eq!(forward.total_days(), Some(2));
        assert!(!forward.is_negative());

        let backward = Duration::between(b, a);
        assert!(backward.is_negative());
        assert_eq!(backward.days(), 2);
        assert_eq!(backward.total_days(), Some(2));
    }

    #[test]
    fn test_equality_ignores_total_days() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let measured = Duration::between(a, b);
        assert_eq!(measured, Duration::new(1, 0, 0, 0));
        assert_eq!(Duration::new(1, 0, 0, 0).total_days(), None);
    }

    #[test]
    fn test_total_days_matches_days_after_changes() {
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 4, 6, 0, 0).unwrap();
        let d = Duration::between(a, b).negated().with_nanos(5);
        assert_eq!(d.total_days(), Some(d.days()));
    }

    #[test]
    fn test_oversized_to_std_fails() {
        let d = Duration::new(u64::MAX, 0, 0, 0);
        assert_eq!(d.whole_seconds(), None);
        assert!(d.to_std().is_err());
    }

    #[test]
    fn test_with_nanos_saturates() {
        let d = Duration::from_secs(u64::MAX).with_nanos(2_000_000_000);
        assert_eq!(d.seconds(), u64::MAX);
    }

    #[test]
    fn test_negative_to_std_fails() {
        assert!(Duration::from_secs(1).negated().to_std().is_err());
    }
}
