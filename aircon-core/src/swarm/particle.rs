//! A single swarm member.
//!
//! Each particle owns its position, velocity, personal best and RNG, so a
//! round can update particles in parallel without sharing mutable state.

use super::chaos::ChaosState;
use super::objective::Objective;
use crate::core::config::PsoConfig;
use crate::core::error::{AirconError, Result};
use crate::core::range::{copy_values, RangeValue};
use rand::rngs::StdRng;
use rand::Rng;

/// Position update rule
#[derive(Clone, Debug)]
pub enum Motion {
    /// `x = x + v`
    Standard,
    /// Logistic-style chaotic map
    Chaotic(ChaosState),
}

#[derive(Clone, Debug)]
pub struct Particle {
    location: Vec<RangeValue>,
    velocity: Vec<RangeValue>,
    best_location: Vec<RangeValue>,
    best_value: f32,
    iteration: usize,
    motion: Motion,
    rng: StdRng,
}

impl Particle {
    /// Random position inside `bounds` and random velocity inside
    /// `± span * max_speed_location_rate`, scored once by `objective`.
    pub fn new<O: Objective + ?Sized>(
        bounds: &[RangeValue],
        config: &PsoConfig,
        motion: Motion,
        mut rng: StdRng,
        objective: &O,
    ) -> Result<Self> {
        if bounds.is_empty() {
            return Err(AirconError::config("particle needs at least one dimension"));
        }
        if let Motion::Chaotic(state) = &motion {
            AirconError::check_len(bounds.len(), state.dimensions())?;
        }

        let location = bounds
            .iter()
            .map(|b| RangeValue::random(b.from(), b.to(), &mut rng))
            .collect::<Result<Vec<_>>>()?;
        let velocity = bounds
            .iter()
            .map(|b| {
                let max_speed = b.span() * config.max_speed_location_rate;
                RangeValue::random(-max_speed, max_speed, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;
        let best_value = objective.fitness(&location);

        Ok(Particle {
            best_location: location.clone(),
            location,
            velocity,
            best_value,
            iteration: 0,
            motion,
            rng,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.location.len()
    }

    pub fn location(&self) -> &[RangeValue] {
        &self.location
    }

    pub fn velocity(&self) -> &[RangeValue] {
        &self.velocity
    }

    pub fn best_location(&self) -> &[RangeValue] {
        &self.best_location
    }

    pub fn best_value(&self) -> f32 {
        self.best_value
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn is_chaotic(&self) -> bool {
        matches!(self.motion, Motion::Chaotic(_))
    }

    /// One round: velocity, position, evaluation, personal best.
    ///
    /// `global_best` is read-only for the whole round.
    pub fn update<O: Objective + ?Sized>(
        &mut self,
        global_best: &[RangeValue],
        inertia: f32,
        config: &PsoConfig,
        objective: &O,
    ) {
        if let Motion::Chaotic(state) = &mut self.motion {
            state.advance();
        }

        for i in 0..self.location.len() {
            let x = self.location[i].value();
            let r1: f32 = self.rng.gen();
            let r2: f32 = self.rng.gen();
            let v = inertia * self.velocity[i].value()
                + config.c1 * r1 * (self.best_location[i].value() - x)
                + config.c2 * r2 * (global_best[i].value() - x);

            let speed = &mut self.velocity[i];
            if speed.is_in_range(v) {
                speed.set_value(v);
            } else if self.rng.gen::<f32>() >= config.velocity_reset_threshold {
                speed.set_value(speed.from());
            } else {
                speed.set_value(speed.to());
            }
            let v = speed.value();

            let next = match &self.motion {
                Motion::Standard => x + v,
                Motion::Chaotic(state) => state.next_position(i, x, v),
            };
            self.location[i].set_value(next);
        }
        self.iteration += 1;

        let fitness = objective.fitness(&self.location);
        if fitness > self.best_value {
            self.best_value = fitness;
            copy_values(&mut self.best_location, &self.location);
        }
    }
}
