//! Power scheduling entry point.
//!
//! Runs a PSO search over the site's power envelope with the evaluator as
//! objective. Runs share nothing mutable, so standard and chaotic searches
//! may execute concurrently on one scheduler.

use super::chaos::ChaosScale;
use super::engine::PsoEngine;
use crate::core::config::AppConfig;
use crate::core::error::Result;
use crate::core::seed::{derive_seed, rng_for};
use crate::domain::PowerVector;
use crate::evaluate::Evaluator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Outcome of one scheduling run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScheduleRun {
    pub power: PowerVector,
    pub best_value: f32,
    pub use_chaos: bool,
    /// Global best after each round
    pub history: Vec<f32>,
}

pub struct PsoScheduler {
    evaluator: Arc<Evaluator>,
    config: Arc<AppConfig>,
    /// Drawn once per scheduler; every chaotic run reuses it
    chaos_scale: Arc<ChaosScale>,
}

impl PsoScheduler {
    pub fn new(config: Arc<AppConfig>, evaluator: Arc<Evaluator>) -> Result<Self> {
        config.validate()?;
        let mut rng = rng_for(config.seed, "chaos_scale");
        let chaos_scale = Arc::new(ChaosScale::random(
            config.site.unit_count,
            config.pso.chaos_scale_from,
            config.pso.chaos_scale_to,
            &mut rng,
        )?);
        Ok(PsoScheduler {
            evaluator,
            config,
            chaos_scale,
        })
    }

    pub fn chaos_scale(&self) -> &ChaosScale {
        &self.chaos_scale
    }

    /// Best power vector found with `particle_count` particles.
    pub fn schedule(&self, particle_count: usize, use_chaos: bool) -> Result<PowerVector> {
        Ok(self.run(particle_count, use_chaos)?.power)
    }

    pub fn run(&self, particle_count: usize, use_chaos: bool) -> Result<ScheduleRun> {
        let site = &self.config.site;
        let started = Instant::now();
        let bounds = PowerVector::floor(site.unit_count, site.min_power, site.max_power)?;
        let label = if use_chaos { "pso_chaos" } else { "pso" };
        let seed = self.config.seed.map(|s| derive_seed(s, label));
        let chaos = use_chaos.then(|| self.chaos_scale.clone());

        let mut engine = PsoEngine::new(
            self.evaluator.clone(),
            bounds.as_slice(),
            &self.config.pso,
            particle_count,
            chaos,
            seed,
        )?;
        let best_value = engine.run();
        let power = PowerVector::from_ranges(engine.global_best_location().to_vec())?;

        info!(
            "[Scheduler] {} run: fitness {:.4}, total power {:.1} in {:?}",
            label,
            best_value,
            power.total_power(),
            started.elapsed()
        );
        Ok(ScheduleRun {
            power,
            best_value,
            use_chaos,
            history: engine.into_history(),
        })
    }
}
