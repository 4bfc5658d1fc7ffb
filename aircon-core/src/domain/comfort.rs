//! User comfort: a Gaussian bump over the user's acceptable temperature range.

use crate::core::error::{AirconError, Result};
use serde::{Deserialize, Serialize};

/// Inclusive temperature range a user accepts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TempRange {
    pub from: f32,
    pub to: f32,
}

impl TempRange {
    pub fn new(from: f32, to: f32) -> Result<Self> {
        if !from.is_finite() || !to.is_finite() || from > to {
            return Err(AirconError::config(format!(
                "invalid temperature range [{}, {}]",
                from, to
            )));
        }
        Ok(TempRange { from, to })
    }

    pub fn contains(&self, temp: f32) -> bool {
        temp >= self.from && temp <= self.to
    }

    pub fn midpoint(&self) -> f32 {
        (self.from + self.to) / 2.0
    }
}

/// Maps a temperature to a satisfaction score in `[0, 1]`.
///
/// Peaks at 1.0 on the range midpoint, equals `min_value` on both edges and
/// is zero outside the range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComfortFunction {
    user_id: String,
    range: TempRange,
    mean: f32,
    variance: f32,
}

impl ComfortFunction {
    pub fn new(user_id: impl Into<String>, range: TempRange, min_value: f32) -> Result<Self> {
        if !(min_value > 0.0 && min_value < 1.0) {
            return Err(AirconError::config(format!(
                "comfort min_value {} must be in (0, 1)",
                min_value
            )));
        }
        let mean = range.midpoint();
        let half = range.to - mean;
        let variance = -(half * half) / (2.0 * min_value.ln());
        Ok(ComfortFunction {
            user_id: user_id.into(),
            range,
            mean,
            variance,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn range(&self) -> TempRange {
        self.range
    }

    pub fn comfort(&self, temperature: f32) -> f32 {
        if !self.range.contains(temperature) {
            return 0.0;
        }
        // Zero-width range: the only admissible temperature is the peak.
        if self.variance <= 0.0 {
            return 1.0;
        }
        let d = temperature - self.mean;
        (-(d * d) / (2.0 * self.variance)).exp()
    }

    pub fn meets_minimum(&self, temperature: f32) -> bool {
        self.range.contains(temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(from: f32, to: f32) -> ComfortFunction {
        ComfortFunction::new("u1", TempRange::new(from, to).unwrap(), 0.2).unwrap()
    }

    #[test]
    fn peaks_at_midpoint() {
        let f = user(24.0, 28.0);
        assert!((f.comfort(26.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn edges_equal_min_value() {
        let f = user(24.0, 28.0);
        assert!((f.comfort(24.0) - 0.2).abs() < 1e-5);
        assert!((f.comfort(28.0) - 0.2).abs() < 1e-5);
    }

    #[test]
    fn zero_outside_range() {
        let f = user(22.0, 26.0);
        assert_eq!(f.comfort(21.9), 0.0);
        assert_eq!(f.comfort(26.1), 0.0);
        assert!(!f.meets_minimum(30.0));
        assert!(f.meets_minimum(25.0));
    }

    #[test]
    fn symmetric_around_mean() {
        let f = user(20.0, 24.0);
        assert!((f.comfort(21.0) - f.comfort(23.0)).abs() < 1e-6);
        assert!(f.comfort(21.5) > f.comfort(21.0));
    }

    #[test]
    fn degenerate_range_does_not_produce_nan() {
        let f = user(25.0, 25.0);
        assert_eq!(f.comfort(25.0), 1.0);
        assert_eq!(f.comfort(25.5), 0.0);
    }

    #[test]
    fn rejects_bad_min_value() {
        let range = TempRange::new(20.0, 24.0).unwrap();
        assert!(ComfortFunction::new("u", range, 0.0).is_err());
        assert!(ComfortFunction::new("u", range, 1.0).is_err());
    }
}
