// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use num_traits::{AsPrimitive, Float};
use serde::{Deserialize, Serialize};
use std::fmt::Result as FormatterResult;
use std::fmt::{self, Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// A duration represented with unit type.
///
/// # Type Parameter
/// - `T`: The underlying value (typically a floating point number)
/// - `U`: The unit of the value (should be a zero-sized type)
///
/// # Examples
/// ```rust
/// use psdl_units::duration::seconds;
///
/// let duration = seconds(100e-9); // Create a duration of 100 ns
/// assert_eq!(duration.value(), 100e-9);
/// ```
#[derive(Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Duration<U, T = f64> {
    value: T,
    #[serde(skip)]
    unit: U,
}

impl<U, T: Copy> Duration<U, T> {
    pub fn value(&self) -> T {
        self.value
    }
}

impl<U, T: Float> Duration<U, T> {
    pub fn is_negative(&self) -> bool {
        self.value < T::zero()
    }
}

impl<T: Float, U> PartialEq for Duration<U, T> {
    fn eq(&self, other: &Self) -> bool {
        let a = self.value;
        let b = other.value;
        if a.is_zero() && b.is_zero() {
            true
        } else {
            a == b
        }
    }
}

impl<T: Float, U> Eq for Duration<U, T> {}

impl<T: Float, U> PartialOrd for Duration<U, T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Float, U> Ord for Duration<U, T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.value < other.value {
            std::cmp::Ordering::Less
        } else if self.value > other.value {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    }
}

impl<T: Debug, U> Debug for Duration<U, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatterResult {
        f.debug_struct("Duration")
            .field("value", &self.value)
            .field("unit", &std::any::type_name::<U>())
            .finish()
    }
}

impl<T, U> Add for Duration<U, T>
where
    T: Add<Output = T> + Copy,
    U: Copy,
{
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Duration {
            value: self.value + rhs.value,
            unit: self.unit,
        }
    }
}

impl<T, U> AddAssign for Duration<U, T>
where
    T: Add<Output = T> + Copy,
    U: Copy,
{
    fn add_assign(&mut self, rhs: Self) {
        self.value = self.value + rhs.value;
    }
}

impl<U, T> Sub for Duration<U, T>
where
    T: Sub<Output = T> + Copy,
    U: Copy,
{
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration {
            value: self.value - rhs.value,
            unit: self.unit,
        }
    }
}

impl<U, T> Mul<T> for Duration<U, T>
where
    T: Mul<T, Output = T> + Copy,
    U: Copy,
{
    type Output = Self;

    fn mul(self, rhs: T) -> Self::Output {
        Duration {
            value: self.value * rhs,
            unit: self.unit,
        }
    }
}

impl<U, T> Neg for Duration<U, T>
where
    T: Neg<Output = T> + Copy,
    U: Copy,
{
    type Output = Self;

    fn neg(self) -> Self::Output {
        Duration {
            value: -self.value,
            unit: self.unit,
        }
    }
}

impl<U, T> Div<T> for Duration<U, T>
where
    T: Div<T, Output = T> + Copy,
    U: Copy,
{
    type Output = Self;

    fn div(self, rhs: T) -> Self::Output {
        Duration {
            value: self.value / rhs,
            unit: self.unit,
        }
    }
}

impl<U: Default, T: Float> Sum for Duration<U, T> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        let value = iter.fold(T::zero(), |acc, d| acc + d.value);
        Duration {
            value,
            unit: U::default(),
        }
    }
}

fn round_to_significant_digits(x: f64, n: u32) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        let order = x.abs().log10().floor();
        let scale = 10f64.powf((n as f64) - 1.0 - order);
        (x * scale).round() / scale
    }
}

impl<U, T> Display for Duration<U, T>
where
    T: Display + Debug + AsPrimitive<f64> + Float,
    U: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            Display::fmt(&self.value, f)?;
        } else {
            // Round slightly below the epsilon precision so that rounding errors
            // from unit conversion (e.g. 0.1 us) do not leak into messages.
            let significand_digits = (-T::epsilon().log10() - T::one()).as_() as u32;
            let value = round_to_significant_digits(self.value.as_(), significand_digits);

            Debug::fmt(&value, f)?;
        }
        write!(f, " ")?;
        self.unit.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Seconds;

impl Display for Seconds {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatterResult {
        write!(f, "s")
    }
}

impl<T: Float, U: Default> From<T> for Duration<U, T> {
    fn from(value: T) -> Self {
        Duration {
            value,
            unit: U::default(),
        }
    }
}

impl<U> From<Duration<U, f64>> for f64 {
    fn from(duration: Duration<U, f64>) -> Self {
        duration.value
    }
}

impl<U: Default> Default for Duration<U, f64> {
    fn default() -> Self {
        Duration {
            value: 0.0,
            unit: U::default(),
        }
    }
}

pub const fn seconds<T>(value: T) -> Duration<Seconds, T> {
    Duration {
        value,
        unit: Seconds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation() {
        let duration: Duration<Seconds> = 1e-6.into();
        assert_eq!(duration.value(), 1e-6);

        let duration = Duration::<Seconds>::from(100e-9);
        assert_eq!(duration.value(), 100e-9);
    }

    #[test]
    fn test_display() {
        let duration: Duration<Seconds> = 1e-6.into();
        assert_eq!(format!("{duration}"), "1e-6 s");

        // 0.1 us expressed in seconds carries a rounding error
        let duration = seconds(0.1 * 1e-6);
        assert_eq!(format!("{duration}"), "1e-7 s");
    }

    #[test]
    fn test_eq() {
        assert_eq!(seconds(1e-6), seconds(1e-6));
        assert_eq!(seconds(0.0), seconds(-0.0));
        assert_ne!(seconds(1e-6), seconds(2e-6));
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(seconds(1.0) + seconds(2.0), seconds(3.0));
        assert_eq!(seconds(3.0) - seconds(2.0), seconds(1.0));
        assert_eq!(seconds(3.0) * 2.0, seconds(6.0));
        assert_eq!(-seconds(3.0), seconds(-3.0));
        assert!(seconds(-1.0).is_negative());

        let mut total = seconds(1.0);
        total += seconds(0.5);
        assert_eq!(total, seconds(1.5));
    }

    #[test]
    fn test_sum() {
        let total: Duration<Seconds> = [seconds(1.0), seconds(2.0), seconds(0.5)]
            .into_iter()
            .sum();
        assert_eq!(total, seconds(3.5));

        let empty: Duration<Seconds> = std::iter::empty().sum();
        assert_eq!(empty, seconds(0.0));
    }

    #[test]
    fn test_ordering() {
        let mut c = vec![seconds(2e-6), seconds(1e-6)];
        c.sort();
        assert_eq!(c, vec![seconds(1e-6), seconds(2e-6)]);
        assert_eq!(seconds(1.0).max(seconds(2.0)), seconds(2.0));
    }
}
