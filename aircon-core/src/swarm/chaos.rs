//! Chaotic position map for the improved particle.
//!
//! `newPos = (x + r*s) * exp((1 - exp(-10m)) * (3 - 7.5/r * (x + r*s))) - r*s + exp(-20*m*v)`
//!
//! `r` is one scale per dimension shared by every chaotic particle of a
//! scheduler and `s` is a fixed offset. Each particle keeps its own `m` and
//! `u` per dimension, and every `m` moves as `m = m^(u+1)` each round.

use crate::core::error::{AirconError, Result};
use rand::Rng;
use std::sync::Arc;

/// Per-dimension scale `r`, drawn once and never re-randomised.
#[derive(Clone, Debug, PartialEq)]
pub struct ChaosScale {
    r: Vec<f32>,
}

impl ChaosScale {
    /// Integer scales drawn from `[from, to)`.
    pub fn random<R: Rng + ?Sized>(dimensions: usize, from: u32, to: u32, rng: &mut R) -> Result<Self> {
        if from == 0 || from >= to {
            return Err(AirconError::config(format!(
                "chaos scale range [{}, {}) is empty or touches zero",
                from, to
            )));
        }
        let r = (0..dimensions).map(|_| rng.gen_range(from..to) as f32).collect();
        Ok(ChaosScale { r })
    }

    pub fn from_values(r: Vec<f32>) -> Result<Self> {
        if r.iter().any(|&v| !(v > 0.0) || !v.is_finite()) {
            return Err(AirconError::config("chaos scales must be positive"));
        }
        Ok(ChaosScale { r })
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn get(&self, dimension: usize) -> f32 {
        self.r[dimension]
    }
}

/// Chaotic state owned by one particle
#[derive(Clone, Debug)]
pub struct ChaosState {
    m: Vec<f32>,
    u: Vec<f32>,
    s: f32,
    scale: Arc<ChaosScale>,
}

impl ChaosState {
    /// Independent `m` and `u` draws in `[0, 1)` for every dimension.
    pub fn new<R: Rng + ?Sized>(scale: Arc<ChaosScale>, s: f32, rng: &mut R) -> Self {
        let dims = scale.len();
        let m = (0..dims).map(|_| rng.gen::<f32>()).collect();
        let u = (0..dims).map(|_| rng.gen::<f32>()).collect();
        ChaosState { m, u, s, scale }
    }

    pub fn with_state(scale: Arc<ChaosScale>, s: f32, m: Vec<f32>, u: Vec<f32>) -> Result<Self> {
        AirconError::check_len(scale.len(), m.len())?;
        AirconError::check_len(scale.len(), u.len())?;
        Ok(ChaosState { m, u, s, scale })
    }

    pub fn m(&self, dimension: usize) -> f32 {
        self.m[dimension]
    }

    pub fn dimensions(&self) -> usize {
        self.scale.len()
    }

    /// Advances every `m` once per round, before positions move.
    pub fn advance(&mut self) {
        for (m, u) in self.m.iter_mut().zip(&self.u) {
            *m = m.powf(u + 1.0);
        }
    }

    /// Unclamped next position for one dimension. May be non-finite.
    pub fn next_position(&self, dimension: usize, position: f32, velocity: f32) -> f32 {
        let r = self.scale.get(dimension) as f64;
        let rs = r * self.s as f64;
        let m = self.m[dimension] as f64;
        let shifted = position as f64 + rs;
        let growth = (1.0 - (-10.0 * m).exp()) * (3.0 - 7.5 / r * shifted);
        (shifted * growth.exp() - rs + (-20.0 * m * velocity as f64).exp()) as f32
    }
}
