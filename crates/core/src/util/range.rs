use anyhow::anyhow;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Debug, Display},
    ops,
};

/// A type of value that we can create ranges of, where a range has a min and
/// max. In practice this is just our float types, but keeping it generic lets
/// colors (`f32`) and channels (`f64`) share the same range logic.
pub trait Rangeable:
    Copy
    + Debug
    + Display
    + PartialOrd
    + ops::Add<Self, Output = Self>
    + ops::Sub<Self, Output = Self>
    + ops::Mul<Self, Output = Self>
    + ops::Div<Self, Output = Self>
{
    fn zero() -> Self;
    fn one() -> Self;
}

impl Rangeable for f32 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }
}

impl Rangeable for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }
}

/// A range between two numeric values, inclusive on both ends. Used for
/// channel constraints on biome rules, climate falloff bands, and for mapping
/// raw noise output onto the unit interval.
#[derive(Copy, Clone, Debug, Display, PartialEq, Serialize, Deserialize)]
#[display(fmt = "[{}, {}]", min, max)]
pub struct NumRange<T: Rangeable = f64> {
    pub min: T,
    pub max: T,
}

impl<T: Rangeable> NumRange<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Get a [0,1] range for this type.
    pub fn normal_range() -> Self {
        Self::new(T::zero(), T::one())
    }

    /// Build the tightest range that contains every value in the iterator.
    /// Returns `None` if the iterator is empty. Values that can't be compared
    /// (i.e. `NaN`) never widen the range.
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Option<Self> {
        values.into_iter().fold(None, |acc, value| match acc {
            None => Some(Self::new(value, value)),
            Some(range) => Some(Self::new(
                if value < range.min { value } else { range.min },
                if value > range.max { value } else { range.max },
            )),
        })
    }

    /// Create a [RangeValue] in this range, which is convenient for chaining
    /// operations on a single value.
    pub fn value(self, value: T) -> RangeValue<T> {
        RangeValue { value, range: self }
    }

    /// Max minus min
    pub fn span(&self) -> T {
        self.max - self.min
    }

    /// Is this range a subset of [0,1], with the bounds in order?
    pub fn is_normalized(&self) -> bool {
        T::zero() <= self.min && self.min <= self.max && self.max <= T::one()
    }

    /// Check if a value is in this range. Ranges are inclusive on both ends.
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }

    /// Checks if the value is in this range. If it isn't, return an error.
    pub fn ensure_contains(&self, value: T) -> anyhow::Result<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(anyhow!("value {} is not in range {}", value, self))
        }
    }

    /// Map a value from this range to the target range. If the span of this
    /// range is zero, we can't properly map the value because we don't know
    /// where on the target range it should fall. In that case, we just always
    /// return the **minimum** of the target range.
    pub fn map_to(&self, dest_range: &Self, value: T) -> T {
        let span = self.span();
        if span > T::zero() {
            let normalized = (value - self.min) / span;
            dest_range.min + (normalized * dest_range.span())
        } else {
            dest_range.min
        }
    }

    /// Map a value from this range to the range [0, 1]
    pub fn normalize(&self, value: T) -> T {
        self.map_to(&Self::normal_range(), value)
    }

    /// Force a value into this range. If it's already in the range, return
    /// that value. If it's outside the range, return the bound (lower or upper)
    /// that's closest to the value.
    pub fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

/// An alternative interface for [NumRange] that makes it easy to chain
/// operations on a single value.
///
/// ```
/// use globe::NumRange;
///
/// let range: NumRange<f64> = NumRange::new(10.0, 20.0);
/// let value = range.value(15.0).normalize().apply(|x| x + 1.0).inner();
/// assert_eq!(value, 1.5);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct RangeValue<T: Rangeable> {
    value: T,
    range: NumRange<T>,
}

impl<T: Rangeable> RangeValue<T> {
    /// Get the value from this struct
    pub fn inner(self) -> T {
        self.value
    }

    /// Map this value to the range [0,1]
    pub fn normalize(self) -> Self {
        self.map_to(NumRange::normal_range())
    }

    /// Invert this value in the range, so that its distance from the min
    /// becomes its distance from the max, and vice versa. For example,
    /// inverting `0.7` in the range `[0,1]` returns `0.3`.
    pub fn invert(mut self) -> Self {
        let flipped = NumRange::new(self.range.max, self.range.min);
        self.value = self.range.map_to(&flipped, self.value);
        self
    }

    /// Map this value from the current range to a new range.
    pub fn map_to(self, range: NumRange<T>) -> Self {
        Self {
            value: self.range.map_to(&range, self.value),
            range,
        }
    }

    /// Force the value into its range. Below the range becomes the min, above
    /// the range becomes the max.
    pub fn clamp(self) -> Self {
        Self {
            value: self.range.clamp(self.value),
            range: self.range,
        }
    }

    /// Apply the given mapping function to this value. The value will be
    /// replaced with the output of the function.
    pub fn apply(self, f: impl FnOnce(T) -> T) -> Self {
        Self {
            value: f(self.value),
            range: self.range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_contains() {
        let range: NumRange<f64> = NumRange::new(1.0, 3.0);
        assert!(!range.contains(0.9));
        assert!(range.contains(1.0));
        assert!(range.contains(2.0));
        assert!(range.contains(3.0));
        assert!(!range.contains(3.1));

        // Zero-length span contains exactly one value
        let range: NumRange<f64> = NumRange::new(1.0, 1.0);
        assert!(!range.contains(0.9));
        assert!(range.contains(1.0));
        assert!(!range.contains(1.1));
    }

    #[test]
    fn test_from_values() {
        assert_eq!(NumRange::<f64>::from_values(vec![]), None);
        assert_eq!(
            NumRange::from_values(vec![0.5, -0.25, 0.75, 0.0]),
            Some(NumRange::new(-0.25, 0.75))
        );
        assert_eq!(
            NumRange::from_values(vec![2.0]),
            Some(NumRange::new(2.0, 2.0))
        );
    }

    #[test]
    fn test_is_normalized() {
        assert!(NumRange::new(0.0, 1.0).is_normalized());
        assert!(NumRange::new(0.4, 0.4).is_normalized());
        assert!(!NumRange::new(0.9, 0.4).is_normalized());
        assert!(!NumRange::new(-0.1, 0.5).is_normalized());
        assert!(!NumRange::new(0.5, 1.1).is_normalized());
    }

    #[test]
    fn test_map_to() {
        let input_range: NumRange<f64> = NumRange::new(1.0, 3.0);
        let output_range: NumRange<f64> = NumRange::new(20.0, 40.0);
        assert_approx_eq!(input_range.map_to(&output_range, 0.0), 10.0);
        assert_approx_eq!(input_range.map_to(&output_range, 1.0), 20.0);
        assert_approx_eq!(input_range.map_to(&output_range, 2.0), 30.0);
        assert_approx_eq!(input_range.map_to(&output_range, 3.0), 40.0);

        // Zero-length span always maps to the min of the output range
        let input_range: NumRange<f64> = NumRange::new(1.0, 1.0);
        assert_approx_eq!(input_range.map_to(&output_range, 0.0), 20.0);
        assert_approx_eq!(input_range.map_to(&output_range, 1.5), 20.0);
    }

    #[test]
    fn test_normalize() {
        let range: NumRange<f64> = NumRange::new(-1.0, 1.0);
        assert_approx_eq!(range.normalize(-1.0), 0.0);
        assert_approx_eq!(range.normalize(0.0), 0.5);
        assert_approx_eq!(range.normalize(1.0), 1.0);
    }

    #[test]
    fn test_clamp() {
        let range: NumRange<f64> = NumRange::new(1.0, 3.0);
        assert_approx_eq!(range.clamp(0.0), 1.0);
        assert_approx_eq!(range.clamp(2.0), 2.0);
        assert_approx_eq!(range.clamp(6.0), 3.0);
    }

    #[test]
    fn test_value_chain() {
        let band: NumRange<f64> = NumRange::new(0.4, 0.9);
        let falloff = |h: f64| band.value(h).clamp().normalize().invert().inner();
        assert_approx_eq!(falloff(0.0), 1.0);
        assert_approx_eq!(falloff(0.4), 1.0);
        assert_approx_eq!(falloff(0.65), 0.5);
        assert_approx_eq!(falloff(0.9), 0.0);
        assert_approx_eq!(falloff(1.0), 0.0);
    }
}
