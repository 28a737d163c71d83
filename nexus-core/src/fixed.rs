//! Fixed-point arithmetic for reproducible bonus aggregation.
//!
//! Every rate (`0.05` = 5%) and every continuous resource (protoform, dark
//! matter, naquadah) is a [`Fixed`]. Stacking `0.05 × 1.6` must give exactly
//! `0.08`, which binary floats cannot promise.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Fixed-point value with scale 10000.
///
/// Represents decimal values as integers: 0.25 → 2500, 1.0 → 10000.
/// Products go through an i128 intermediate so large unit counts cannot overflow
/// before rescaling. Every operator saturates at the i64 bounds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fixed(pub i64);

impl Fixed {
    /// Scale factor: 10000 = 1.0
    pub const SCALE: i64 = 10000;

    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(10000);
    pub const HALF: Fixed = Fixed(5000);

    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Fixed(raw)
    }

    /// Create from integer (e.g., 5 → 50_000)
    #[inline]
    pub const fn from_int(v: i64) -> Self {
        Fixed(v.saturating_mul(Self::SCALE))
    }

    /// Convert a tuning constant.
    ///
    /// Rounds to the nearest raw unit so `0.15f32` (stored as 0.1499999…)
    /// lands on exactly 1500. NaN and infinities map to zero.
    #[inline]
    pub fn from_f32(v: f32) -> Self {
        if !v.is_finite() {
            return Fixed::ZERO;
        }
        let scaled = (v as f64) * Self::SCALE as f64;
        if scaled >= i64::MAX as f64 {
            return Fixed(i64::MAX);
        }
        if scaled <= i64::MIN as f64 {
            return Fixed(i64::MIN);
        }
        Fixed(scaled.round() as i64)
    }

    /// Display only; never feed the result back into a calculation.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Floor to an integer (toward negative infinity).
    ///
    /// Discrete resources use floor so rounding never creates resources.
    #[inline]
    pub const fn floor_int(self) -> i64 {
        self.0.div_euclid(Self::SCALE)
    }

    /// Clamp negative values to zero.
    #[inline]
    pub fn non_negative(self) -> Fixed {
        if self.0 < 0 {
            Fixed::ZERO
        } else {
            self
        }
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Multiply by a plain integer count.
    #[inline]
    pub fn mul_int(self, count: i64) -> Fixed {
        Fixed(self.0.saturating_mul(count))
    }

    /// `numerator / denominator` as a fixed-point ratio; zero when the
    /// denominator is zero.
    #[inline]
    pub fn ratio(numerator: Fixed, denominator: Fixed) -> Fixed {
        numerator / denominator
    }

    #[inline]
    pub fn saturating_add(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(other.0))
    }

    #[inline]
    pub fn saturating_sub(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(other.0))
    }
}

impl Add for Fixed {
    type Output = Fixed;
    #[inline]
    fn add(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Fixed {
    #[inline]
    fn add_assign(&mut self, other: Fixed) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline]
    fn sub(self, other: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Fixed {
    #[inline]
    fn sub_assign(&mut self, other: Fixed) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline]
    fn neg(self) -> Fixed {
        Fixed(self.0.saturating_neg())
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    #[inline]
    fn mul(self, other: Fixed) -> Fixed {
        let wide = self.0 as i128 * other.0 as i128 / Fixed::SCALE as i128;
        Fixed(wide.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

impl Div for Fixed {
    type Output = Fixed;
    #[inline]
    fn div(self, other: Fixed) -> Fixed {
        if other.0 == 0 {
            return Fixed::ZERO;
        }
        let wide = self.0 as i128 * Fixed::SCALE as i128 / other.0 as i128;
        Fixed(wide.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

impl std::iter::Sum for Fixed {
    fn sum<I: Iterator<Item = Fixed>>(iter: I) -> Fixed {
        iter.fold(Fixed::ZERO, |acc, v| acc + v)
    }
}

impl std::fmt::Debug for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fixed({} = {})", self.0, self.to_f64())
    }
}

impl std::fmt::Display for Fixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}
