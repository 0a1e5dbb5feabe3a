//! Exponential backoff handed out to retrying callers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_MIN_MS: u64 = 1_000;
pub const DEFAULT_MAX_MS: u64 = 60_000;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// The `backoff` configuration section, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffSettings {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            min_ms: DEFAULT_MIN_MS,
            max_ms: DEFAULT_MAX_MS,
        }
    }
}

impl BackoffSettings {
    pub fn with_overrides(self, overrides: BackoffOverrides) -> Self {
        Self {
            min_ms: overrides.min_ms.unwrap_or(self.min_ms),
            max_ms: overrides.max_ms.unwrap_or(self.max_ms),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_ms == 0 || self.min_ms > self.max_ms {
            return Err(Error::InvalidBackoff {
                min_ms: self.min_ms.into(),
                max_ms: self.max_ms.into(),
            });
        }
        Ok(())
    }
}

/// Per-call replacements for individual bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackoffOverrides {
    pub min_ms: Option<u64>,
    pub max_ms: Option<u64>,
}

impl BackoffOverrides {
    pub fn min_ms(mut self, min_ms: u64) -> Self {
        self.min_ms = Some(min_ms);
        self
    }

    pub fn max_ms(mut self, max_ms: u64) -> Self {
        self.max_ms = Some(max_ms);
        self
    }
}

/// Yields `minimal_interval * multiplier^n` until the sum of handed-out
/// intervals would pass `maximum_elapsed_time`.
///
/// Each instance keeps its own progress; clone it to share the bounds
/// without sharing the state.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialBackoff {
    minimal_interval: Duration,
    maximum_elapsed_time: Duration,
    multiplier: f64,
    attempt: u32,
    elapsed: Duration,
}

impl ExponentialBackoff {
    pub fn new(minimal_interval: Duration, maximum_elapsed_time: Duration) -> Result<Self> {
        if minimal_interval.is_zero() || minimal_interval > maximum_elapsed_time {
            return Err(Error::InvalidBackoff {
                min_ms: minimal_interval.as_millis(),
                max_ms: maximum_elapsed_time.as_millis(),
            });
        }
        Ok(Self {
            minimal_interval,
            maximum_elapsed_time,
            multiplier: DEFAULT_MULTIPLIER,
            attempt: 0,
            elapsed: Duration::ZERO,
        })
    }

    pub fn from_settings(settings: BackoffSettings) -> Result<Self> {
        settings.validate()?;
        Self::new(
            Duration::from_millis(settings.min_ms),
            Duration::from_millis(settings.max_ms),
        )
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Result<Self> {
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(Error::InvalidMultiplier(multiplier));
        }
        self.multiplier = multiplier;
        Ok(self)
    }

    pub fn minimal_interval(&self) -> Duration {
        self.minimal_interval
    }

    pub fn maximum_elapsed_time(&self) -> Duration {
        self.maximum_elapsed_time
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Number of intervals handed out since creation or the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Sum of the intervals handed out so far.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Interval for the given zero-based retry, capped at the maximum elapsed time.
    pub fn interval_at(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.minimal_interval;
        }
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.minimal_interval.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.maximum_elapsed_time.as_secs_f64() {
            return self.maximum_elapsed_time;
        }
        Duration::from_secs_f64(secs).max(self.minimal_interval)
    }

    /// Next delay to wait, or `None` once the time budget is spent.
    pub fn next_interval(&mut self) -> Option<Duration> {
        let interval = self.interval_at(self.attempt);
        let elapsed = self.elapsed.checked_add(interval)?;
        if elapsed > self.maximum_elapsed_time {
            return None;
        }
        self.elapsed = elapsed;
        self.attempt = self.attempt.saturating_add(1);
        Some(interval)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
        self.elapsed = Duration::ZERO;
    }
}

impl Iterator for ExponentialBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        self.next_interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_intervals_double_until_budget_is_spent() {
        let backoff = ExponentialBackoff::new(secs(1), secs(20)).unwrap();
        let intervals: Vec<_> = backoff.collect();
        // 1 + 2 + 4 + 8 = 15; the next 16 would pass 20.
        assert_eq!(intervals, vec![secs(1), secs(2), secs(4), secs(8)]);
    }

    #[test]
    fn test_interval_is_capped_by_maximum() {
        let backoff = ExponentialBackoff::new(secs(1), secs(10)).unwrap();
        assert_eq!(backoff.interval_at(3), secs(8));
        assert_eq!(backoff.interval_at(4), secs(10));
        assert_eq!(backoff.interval_at(u32::MAX), secs(10));
    }

    #[test]
    fn test_intervals_never_decrease() {
        let backoff = ExponentialBackoff::new(Duration::from_millis(150), secs(3600))
            .unwrap()
            .with_multiplier(1.5)
            .unwrap();
        let mut previous = Duration::ZERO;
        for attempt in 0..64 {
            let current = backoff.interval_at(attempt);
            assert!(current >= previous, "attempt {attempt}: {current:?} < {previous:?}");
            previous = current;
        }
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut backoff = ExponentialBackoff::new(secs(1), secs(5)).unwrap();
        assert_eq!(backoff.next_interval(), Some(secs(1)));
        assert_eq!(backoff.next_interval(), Some(secs(2)));
        assert_eq!(backoff.next_interval(), None);
        assert_eq!(backoff.next_interval(), None);
        assert_eq!(backoff.elapsed(), secs(3));

        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_interval(), Some(secs(1)));
    }

    #[test]
    fn test_settings_convert_milliseconds() {
        let backoff = ExponentialBackoff::from_settings(BackoffSettings {
            min_ms: 1_234_000,
            max_ms: 5_678_000,
        })
        .unwrap();
        assert_eq!(backoff.minimal_interval().as_secs(), 1234);
        assert_eq!(backoff.maximum_elapsed_time().as_secs(), 5678);
    }

    #[test]
    fn test_overrides_replace_individual_bounds() {
        let merged = BackoffSettings::default().with_overrides(BackoffOverrides::default().max_ms(90_000));
        assert_eq!(merged, BackoffSettings { min_ms: 1_000, max_ms: 90_000 });
    }

    #[test]
    fn test_rejects_inverted_bounds_and_bad_multiplier() {
        assert!(matches!(
            ExponentialBackoff::from_settings(BackoffSettings { min_ms: 10, max_ms: 5 }),
            Err(Error::InvalidBackoff { min_ms: 10, max_ms: 5 })
        ));
        let backoff = ExponentialBackoff::new(secs(1), secs(2)).unwrap();
        assert!(backoff.clone().with_multiplier(0.5).is_err());
        assert!(backoff.with_multiplier(f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_zero_minimal_interval() {
        assert!(matches!(
            ExponentialBackoff::from_settings(BackoffSettings { min_ms: 0, max_ms: 60_000 }),
            Err(Error::InvalidBackoff { min_ms: 0, max_ms: 60_000 })
        ));
        assert!(ExponentialBackoff::new(Duration::ZERO, secs(60)).is_err());
    }
}
