//! Bounded scalar used for particle positions, velocities and power values.
//!
//! A `RangeValue` always holds `from <= value <= to`. Writes outside the
//! range saturate at the nearest bound; they never fail.

use super::error::{AirconError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeValue {
    value: f32,
    from: f32,
    to: f32,
}

impl RangeValue {
    /// Creates a value inside `[from, to]`, clamping `value` into the range.
    pub fn new(value: f32, from: f32, to: f32) -> Result<Self> {
        if !from.is_finite() || !to.is_finite() || from > to {
            return Err(AirconError::config(format!(
                "invalid range [{}, {}]",
                from, to
            )));
        }
        let mut range = RangeValue {
            value: from,
            from,
            to,
        };
        range.set_value(value);
        Ok(range)
    }

    /// Uniform draw inside `[from, to]`.
    pub fn random<R: Rng + ?Sized>(from: f32, to: f32, rng: &mut R) -> Result<Self> {
        let mut range = Self::new(from, from, to)?;
        range.set_value(from + (to - from) * rng.gen::<f32>());
        Ok(range)
    }

    /// Same bounds, new value (clamped).
    pub fn with_value(&self, value: f32) -> Self {
        let mut copy = *self;
        copy.set_value(value);
        copy
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn from(&self) -> f32 {
        self.from
    }

    #[inline]
    pub fn to(&self) -> f32 {
        self.to
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.to - self.from
    }

    /// Saturating write. NaN leaves the current value untouched.
    #[inline]
    pub fn set_value(&mut self, value: f32) {
        if value.is_nan() {
            return;
        }
        self.value = value.clamp(self.from, self.to);
    }

    #[inline]
    pub fn is_in_range(&self, value: f32) -> bool {
        value >= self.from && value <= self.to
    }
}

/// Copies the values of `src` into `dst`, keeping `dst`'s bounds.
pub fn copy_values(dst: &mut [RangeValue], src: &[RangeValue]) {
    for (d, s) in dst.iter_mut().zip(src) {
        d.set_value(s.value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn set_value_saturates() {
        let mut v = RangeValue::new(5.0, 0.0, 10.0).unwrap();
        v.set_value(42.0);
        assert_eq!(v.value(), 10.0);
        v.set_value(-1e30);
        assert_eq!(v.value(), 0.0);
        v.set_value(f32::INFINITY);
        assert_eq!(v.value(), 10.0);
        v.set_value(f32::NAN);
        assert_eq!(v.value(), 10.0);
    }

    #[test]
    fn constructor_clamps_and_rejects_inverted_bounds() {
        assert_eq!(RangeValue::new(99.0, 0.0, 1.0).unwrap().value(), 1.0);
        assert!(RangeValue::new(0.0, 1.0, 0.0).is_err());
        assert!(RangeValue::new(0.0, f32::NEG_INFINITY, 0.0).is_err());
    }

    #[test]
    fn copies_are_independent() {
        let original = RangeValue::new(3.0, 0.0, 10.0).unwrap();
        let mut copy = original;
        copy.set_value(7.0);
        assert_eq!(original.value(), 3.0);
        assert_eq!(copy.value(), 7.0);
        assert_eq!(copy.from(), original.from());
    }

    #[test]
    fn fuzzed_writes_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let from: f32 = rng.gen_range(-500.0..500.0);
            let to = from + rng.gen_range(0.0..300.0);
            let mut v = RangeValue::random(from, to, &mut rng).unwrap();
            assert!(v.from() <= v.value() && v.value() <= v.to());
            for _ in 0..20 {
                let raw: f32 = rng.gen_range(-1e6..1e6);
                v.set_value(raw);
                assert!(v.from() <= v.value() && v.value() <= v.to());
                assert_eq!(v.is_in_range(raw), raw == v.value());
            }
        }
    }
}
