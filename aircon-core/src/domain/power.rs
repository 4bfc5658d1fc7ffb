//! Power vectors: one bounded power value per air-conditioning unit.

use crate::core::error::{AirconError, Result};
use crate::core::range::RangeValue;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered power settings, each bounded by the site's power envelope.
///
/// Owned by value; particles and solutions never share one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PowerVector(Vec<RangeValue>);

impl PowerVector {
    /// Every unit at `min_power`.
    pub fn floor(unit_count: usize, min_power: f32, max_power: f32) -> Result<Self> {
        Self::from_values(&vec![min_power; unit_count], min_power, max_power)
    }

    pub fn uniform<R: Rng + ?Sized>(
        unit_count: usize,
        min_power: f32,
        max_power: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if unit_count == 0 {
            return Err(AirconError::config("power vector needs at least one unit"));
        }
        let values = (0..unit_count)
            .map(|_| RangeValue::random(min_power, max_power, rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(PowerVector(values))
    }

    /// Builds a vector from raw powers; out-of-range entries saturate.
    pub fn from_values(values: &[f32], min_power: f32, max_power: f32) -> Result<Self> {
        if values.is_empty() {
            return Err(AirconError::config("power vector needs at least one unit"));
        }
        let values = values
            .iter()
            .map(|&v| RangeValue::new(v, min_power, max_power))
            .collect::<Result<Vec<_>>>()?;
        Ok(PowerVector(values))
    }

    pub fn from_ranges(values: Vec<RangeValue>) -> Result<Self> {
        if values.is_empty() {
            return Err(AirconError::config("power vector needs at least one unit"));
        }
        Ok(PowerVector(values))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[RangeValue] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [RangeValue] {
        &mut self.0
    }

    pub fn values(&self) -> Vec<f32> {
        self.0.iter().map(RangeValue::value).collect()
    }

    pub fn total_power(&self) -> f32 {
        self.0.iter().map(RangeValue::value).sum()
    }
}

impl fmt::Display for PowerVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.2}", v.value())?;
        }
        write!(f, "]")
    }
}
