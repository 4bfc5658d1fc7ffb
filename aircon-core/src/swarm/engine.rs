//! Particle Swarm Engine
//!
//! Owns the population and the global best. Each round updates every
//! particle against a read-only snapshot of the global best (in parallel on
//! the rayon pool when enabled), then rescans the personal bests.

use super::chaos::{ChaosScale, ChaosState};
use super::objective::Objective;
use super::particle::{Motion, Particle};
use crate::core::config::PsoConfig;
use crate::core::error::{AirconError, Result};
use crate::core::range::RangeValue;
use crate::core::seed::rng_for;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

const PROGRESS_INTERVAL: usize = 100;

pub struct PsoEngine<O: Objective> {
    objective: O,
    config: PsoConfig,
    particles: Vec<Particle>,
    global_best_location: Vec<RangeValue>,
    global_best_value: f32,
    /// Global best value after each round
    history: Vec<f32>,
    round: usize,
}

/// Index of the first particle with the highest personal best.
fn best_particle(particles: &[Particle]) -> usize {
    let mut best = 0;
    for (i, p) in particles.iter().enumerate().skip(1) {
        if particles[best].best_value() < p.best_value() {
            best = i;
        }
    }
    best
}

impl<O: Objective> PsoEngine<O> {
    /// Random population of `particle_count` particles inside `bounds`.
    ///
    /// With a `chaos` scale every particle uses the chaotic position map.
    /// Particle `i` draws from its own generator derived from `seed`.
    pub fn new(
        objective: O,
        bounds: &[RangeValue],
        config: &PsoConfig,
        particle_count: usize,
        chaos: Option<Arc<ChaosScale>>,
        seed: Option<u64>,
    ) -> Result<Self> {
        if particle_count == 0 {
            return Err(AirconError::config("particle population is empty"));
        }
        if let Some(scale) = &chaos {
            AirconError::check_len(bounds.len(), scale.len())?;
        }

        let particles = (0..particle_count)
            .map(|i| {
                let mut rng = rng_for(seed, &format!("particle_{}", i));
                let motion = match &chaos {
                    Some(scale) => Motion::Chaotic(ChaosState::new(scale.clone(), config.chaos_s, &mut rng)),
                    None => Motion::Standard,
                };
                Particle::new(bounds, config, motion, rng, &objective)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_particles(objective, config, particles)
    }

    /// Wraps an existing population; all particles must share one dimensionality.
    pub fn from_particles(objective: O, config: &PsoConfig, particles: Vec<Particle>) -> Result<Self> {
        let first = particles
            .first()
            .ok_or_else(|| AirconError::config("particle population is empty"))?;
        let dims = first.dimensions();
        for p in &particles {
            AirconError::check_len(dims, p.dimensions())?;
        }

        let best = best_particle(&particles);
        let global_best_location = particles[best].best_location().to_vec();
        let global_best_value = particles[best].best_value();
        let chaotic = particles.iter().filter(|p| p.is_chaotic()).count();
        info!(
            "[PSO] Initialized {} particles ({} chaotic) over {} dimensions, initial best {:.4}",
            particles.len(),
            chaotic,
            dims,
            global_best_value
        );

        Ok(PsoEngine {
            objective,
            config: config.clone(),
            particles,
            global_best_location,
            global_best_value,
            history: Vec::new(),
            round: 0,
        })
    }

    /// Linearly annealed from `inertia_init` to `inertia_end` over the budget.
    pub fn inertia(&self, round: usize) -> f32 {
        let c = &self.config;
        let total = c.iterations.max(1) as f32;
        c.inertia_init - round as f32 * (c.inertia_init - c.inertia_end) / total
    }

    /// Runs one round over the whole population.
    pub fn step(&mut self) {
        let inertia = self.inertia(self.round);
        let global_best = &self.global_best_location;
        let config = &self.config;
        let objective = &self.objective;

        if config.parallel {
            self.particles
                .par_iter_mut()
                .for_each(|p| p.update(global_best, inertia, config, objective));
        } else {
            self.particles
                .iter_mut()
                .for_each(|p| p.update(global_best, inertia, config, objective));
        }

        let best = best_particle(&self.particles);
        let leader = &self.particles[best];
        if leader.best_value() > self.global_best_value {
            self.global_best_value = leader.best_value();
            self.global_best_location.copy_from_slice(leader.best_location());
        }

        self.round += 1;
        self.history.push(self.global_best_value);
        if self.round % PROGRESS_INTERVAL == 0 {
            debug!(
                "[PSO] Round {}/{}: best {:.4}",
                self.round, self.config.iterations, self.global_best_value
            );
        }
    }

    /// Runs the remaining rounds of the fixed budget and returns the best value.
    pub fn run(&mut self) -> f32 {
        while self.round < self.config.iterations {
            self.step();
        }
        info!(
            "[PSO] Finished {} rounds, best {:.4}",
            self.round, self.global_best_value
        );
        self.global_best_value
    }

    pub fn global_best_location(&self) -> &[RangeValue] {
        &self.global_best_location
    }

    pub fn global_best_value(&self) -> f32 {
        self.global_best_value
    }

    pub fn history(&self) -> &[f32] {
        &self.history
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn into_history(self) -> Vec<f32> {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swarm::objective::SumOfSquares;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bounds(n: usize) -> Vec<RangeValue> {
        vec![RangeValue::new(0.0, -10.0, 10.0).unwrap(); n]
    }

    fn config(iterations: usize) -> PsoConfig {
        PsoConfig {
            iterations,
            ..PsoConfig::default()
        }
    }

    #[test]
    fn global_best_is_max_of_personal_bests_and_never_drops() {
        let mut engine = PsoEngine::new(SumOfSquares, &bounds(4), &config(150), 30, None, Some(1)).unwrap();
        let mut last = engine.global_best_value();
        for _ in 0..150 {
            engine.step();
            let max = engine
                .particles()
                .iter()
                .map(Particle::best_value)
                .fold(f32::MIN, f32::max);
            assert_eq!(engine.global_best_value(), max);
            assert!(engine.global_best_value() >= last);
            last = engine.global_best_value();
        }
        assert_eq!(engine.history().len(), 150);
        assert!(engine.history().windows(2).all(|w| w[0] <= w[1]));
        // Corner of the box is 4 * 100.
        assert!(engine.global_best_value() > 300.0);
    }

    #[test]
    fn seeded_runs_are_identical() {
        let run = |parallel: bool| {
            let cfg = PsoConfig {
                parallel,
                ..config(80)
            };
            let mut engine = PsoEngine::new(SumOfSquares, &bounds(3), &cfg, 20, None, Some(77)).unwrap();
            engine.run();
            (engine.global_best_value(), engine.global_best_location().to_vec())
        };
        let a = run(true);
        assert_eq!(a, run(true));
        assert_eq!(a, run(false));
    }

    #[test]
    fn chaotic_population_runs_in_range() {
        let scale = Arc::new(ChaosScale::random(3, 10, 20, &mut StdRng::seed_from_u64(4)).unwrap());
        let mut engine =
            PsoEngine::new(SumOfSquares, &bounds(3), &config(100), 15, Some(scale), Some(9)).unwrap();
        let best = engine.run();
        assert!(best.is_finite());
        assert!(engine.particles().iter().all(Particle::is_chaotic));
        for p in engine.particles() {
            assert!(p.location().iter().all(|x| (-10.0..=10.0).contains(&x.value())));
        }
        assert_eq!(engine.round(), 100);
    }

    #[test]
    fn inertia_anneals_linearly() {
        let engine = PsoEngine::new(SumOfSquares, &bounds(1), &config(1000), 1, None, Some(0)).unwrap();
        assert!((engine.inertia(0) - 0.9).abs() < 1e-6);
        assert!((engine.inertia(500) - 0.65).abs() < 1e-6);
        assert!((engine.inertia(1000) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn malformed_populations_are_rejected() {
        assert!(matches!(
            PsoEngine::new(SumOfSquares, &bounds(2), &config(10), 0, None, None),
            Err(AirconError::Configuration(_))
        ));
        assert!(PsoEngine::from_particles(SumOfSquares, &config(10), Vec::new()).is_err());

        let cfg = config(10);
        let a = Particle::new(&bounds(2), &cfg, Motion::Standard, StdRng::seed_from_u64(1), &SumOfSquares).unwrap();
        let b = Particle::new(&bounds(3), &cfg, Motion::Standard, StdRng::seed_from_u64(2), &SumOfSquares).unwrap();
        assert!(matches!(
            PsoEngine::from_particles(SumOfSquares, &cfg, vec![a, b]),
            Err(AirconError::DimensionMismatch { expected: 2, actual: 3 })
        ));

        let scale = Arc::new(ChaosScale::from_values(vec![10.0; 5]).unwrap());
        assert!(PsoEngine::new(SumOfSquares, &bounds(2), &cfg, 3, Some(scale), None).is_err());
    }

    #[test]
    fn first_particle_wins_ties() {
        struct Flat;
        impl Objective for Flat {
            fn fitness(&self, _: &[RangeValue]) -> f32 {
                0.0
            }
        }
        let engine = PsoEngine::new(Flat, &bounds(2), &config(5), 6, None, Some(3)).unwrap();
        assert_eq!(engine.global_best_location(), engine.particles()[0].best_location());
    }
}
