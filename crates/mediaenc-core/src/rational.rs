//! Exact fractions for frame rates, sample rates and time bases.
//!
//! Unlike `num_rational::Ratio`, a `MediaRational` may carry a zero
//! denominator. Such a value is *invalid* and is the default state, so
//! callers can pass "unspecified" rates through without panicking.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fraction `numerator / denominator` used for rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MediaRational {
    pub numerator: i32,
    pub denominator: i32,
}

impl MediaRational {
    /// The invalid rational `0/0`.
    pub const INVALID: Self = Self::new_raw(0, 0);

    /// Common frame rates
    pub const FPS_23_976: Self = Self::new_raw(24000, 1001);
    pub const FPS_24: Self = Self::new_raw(24, 1);
    pub const FPS_25: Self = Self::new_raw(25, 1);
    pub const FPS_29_97: Self = Self::new_raw(30000, 1001);
    pub const FPS_30: Self = Self::new_raw(30, 1);
    pub const FPS_50: Self = Self::new_raw(50, 1);
    pub const FPS_59_94: Self = Self::new_raw(60000, 1001);
    pub const FPS_60: Self = Self::new_raw(60, 1);

    /// Create a rational reduced to lowest terms.
    pub fn new(numerator: i32, denominator: i32) -> Self {
        Self::new_raw(numerator, denominator).reduce()
    }

    /// Create a rational without reducing it.
    #[inline]
    pub const fn new_raw(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Create `numerator / 1`.
    #[inline]
    pub const fn from_integer(numerator: i32) -> Self {
        Self::new_raw(numerator, 1)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.denominator != 0
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.is_valid() && self.numerator == 0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.is_valid() && (self.numerator < 0) != (self.denominator < 0) && self.numerator != 0
    }

    /// Swap numerator and denominator. Inverting zero yields an invalid value.
    #[inline]
    pub fn inverse(self) -> Self {
        Self::new_raw(self.denominator, self.numerator)
    }

    /// Reduce to lowest terms with a positive denominator.
    ///
    /// Invalid values are returned unchanged. The only inputs whose
    /// normalized form does not fit in `i32` involve `i32::MIN`; those keep
    /// a negative denominator after reduction.
    pub fn reduce(self) -> Self {
        let Some(ratio) = self.to_ratio() else {
            return self;
        };
        let (numer, denom) = (*ratio.numer(), *ratio.denom());
        match (i32::try_from(numer), i32::try_from(denom)) {
            (Ok(n), Ok(d)) => Self::new_raw(n, d),
            _ => match (i32::try_from(-numer), i32::try_from(-denom)) {
                (Ok(n), Ok(d)) => Self::new_raw(n, d),
                _ => self,
            },
        }
    }

    /// Value as `f64`, or `0.0` when the rational is invalid.
    #[inline]
    pub fn to_f64(self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        self.numerator as f64 / self.denominator as f64
    }

    /// Exact value, or `None` when the rational is invalid.
    pub fn to_ratio(self) -> Option<Rational64> {
        self.is_valid()
            .then(|| Rational64::new(self.numerator as i64, self.denominator as i64))
    }

    /// Compare by value rather than by representation.
    ///
    /// Two invalid rationals are equal to each other and to nothing else.
    pub fn value_eq(self, other: Self) -> bool {
        self.to_ratio() == other.to_ratio()
    }
}

impl From<i32> for MediaRational {
    fn from(value: i32) -> Self {
        Self::from_integer(value)
    }
}

impl fmt::Display for MediaRational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
