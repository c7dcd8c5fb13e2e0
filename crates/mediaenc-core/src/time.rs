//! Timestamps expressed as a tick count over a rational rate.
//!
//! A `MediaTime` of `count` ticks at `rate` ticks per second is
//! `count / rate` seconds. Negative rates are rejected; zero and invalid
//! rates are accepted here and checked by whoever consumes the time.

use crate::error::{MediaEncError, Result};
use crate::rational::MediaRational;
use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in time as `count` ticks at `rate` ticks per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MediaTime {
    count: i64,
    rate: MediaRational,
}

impl MediaTime {
    /// Zero ticks at an invalid rate.
    pub const INVALID: Self = Self {
        count: 0,
        rate: MediaRational::INVALID,
    };

    /// Create a time from a tick count and rate.
    pub fn new(count: i64, rate: MediaRational) -> Result<Self> {
        let mut time = Self {
            count,
            rate: MediaRational::INVALID,
        };
        time.set_rate(rate)?;
        Ok(time)
    }

    /// Create a time from a tick count and a rate given as two integers.
    /// The rate is reduced to lowest terms.
    pub fn from_parts(count: i64, rate_numerator: i32, rate_denominator: i32) -> Result<Self> {
        Self::new(count, MediaRational::new(rate_numerator, rate_denominator))
    }

    /// Create a time from seconds, rounding to the nearest tick.
    pub fn from_seconds(seconds: f64, rate: MediaRational) -> Result<Self> {
        let count = (seconds * rate.to_f64()).round() as i64;
        Self::new(count, rate)
    }

    #[inline]
    pub fn count(self) -> i64 {
        self.count
    }

    #[inline]
    pub fn set_count(&mut self, count: i64) {
        self.count = count;
    }

    #[inline]
    pub fn rate(self) -> MediaRational {
        self.rate
    }

    /// Replace the rate. Fails if `rate` is negative.
    pub fn set_rate(&mut self, rate: MediaRational) -> Result<()> {
        if rate.is_negative() {
            return Err(MediaEncError::InvalidArgument(format!(
                "time rate must not be negative, got {rate}"
            )));
        }
        self.rate = rate;
        Ok(())
    }

    /// Seconds as `f64`. A zero or invalid rate yields `0.0`.
    #[inline]
    pub fn to_seconds_f64(self) -> f64 {
        self.count as f64 * self.rate.inverse().to_f64()
    }

    /// Exact seconds, or `None` for a zero or invalid rate or when the
    /// result does not fit in a `Rational64`.
    pub fn to_rational_seconds(self) -> Option<Rational64> {
        let period = self.rate.inverse().to_ratio()?;
        // Cancel count against the period's denominator before multiplying.
        let scaled = Rational64::new(self.count, *period.denom());
        let numer = scaled.numer().checked_mul(*period.numer())?;
        Some(Rational64::new(numer, *scaled.denom()))
    }
}

impl fmt::Display for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.count, self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_reduces_rate() {
        let t = MediaTime::from_parts(48, 48, 2).unwrap();
        assert_eq!(t.rate(), MediaRational::new_raw(24, 1));
        assert!((t.to_seconds_f64() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_rate_rejected() {
        let err = MediaTime::from_parts(1, -30, 1).unwrap_err();
        assert!(matches!(err, MediaEncError::InvalidArgument(_)));

        let mut t = MediaTime::from_parts(1, 30, 1).unwrap();
        assert!(t.set_rate(MediaRational::new_raw(30, -1)).is_err());
        assert_eq!(t.rate(), MediaRational::FPS_30);
    }

    #[test]
    fn test_zero_and_invalid_rates_accepted() {
        let mut t = MediaTime::default();
        t.set_rate(MediaRational::new_raw(0, 1)).unwrap();
        t.set_rate(MediaRational::INVALID).unwrap();
        assert_eq!(t, MediaTime::INVALID);
    }

    #[test]
    fn test_to_seconds_with_zero_rate_is_zero() {
        let t = MediaTime::new(100, MediaRational::new_raw(0, 1)).unwrap();
        assert_eq!(t.to_seconds_f64(), 0.0);
        assert_eq!(t.to_rational_seconds(), None);
    }

    #[test]
    fn test_ntsc_rational_seconds_is_exact() {
        let t = MediaTime::new(30000, MediaRational::FPS_29_97).unwrap();
        assert_eq!(t.to_rational_seconds(), Some(Rational64::new(1001, 1)));
    }

    #[test]
    fn test_rational_seconds_overflow_is_none() {
        let t = MediaTime::new(i64::MAX / 2, MediaRational::new(1, i32::MAX)).unwrap();
        assert_eq!(t.to_rational_seconds(), None);

        // Cancellation keeps large counts representable.
        let t = MediaTime::new(i64::MAX - 1, MediaRational::new(3, 2)).unwrap();
        assert_eq!(
            t.to_rational_seconds(),
            Some(Rational64::new((i64::MAX - 1) / 3 * 2, 1))
        );
    }

    #[test]
    fn test_from_seconds_rounds() {
        let t = MediaTime::from_seconds(1.5, MediaRational::new(48000, 1)).unwrap();
        assert_eq!(t.count(), 72000);
        assert!((t.to_seconds_f64() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        let t = MediaTime::from_parts(5, 25, 1).unwrap();
        assert_eq!(t.to_string(), "5@25/1");
    }
}
