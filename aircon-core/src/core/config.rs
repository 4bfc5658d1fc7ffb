use super::error::{AirconError, Result};
use crate::surrogate::ModelKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Physical site: population sizes, area and power/temperature envelopes
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub user_count: usize,
    pub sensor_count: usize,
    /// Number of air-conditioning units, i.e. the power vector length
    pub unit_count: usize,
    pub area_length: f32,
    pub area_width: f32,
    pub outside_temp: f32,
    pub min_temp: f32,
    pub max_temp: f32,
    pub min_power: f32,
    pub max_power: f32,
    pub power_price: f32,
    pub power_utility_unit: f32,
    /// Radius within which a sensor counts as "near" a user
    pub max_distance: f32,
}

impl SiteConfig {
    /// Radius of a circle holding three sensors' share of the area.
    pub fn default_max_distance(area_length: f32, area_width: f32, sensor_count: usize) -> f32 {
        let share = (area_length * area_width / sensor_count.max(1) as f32).floor();
        ((share * 3.0) / std::f32::consts::PI).sqrt()
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            user_count: 16,
            sensor_count: 10,
            unit_count: 8,
            area_length: 10.0,
            area_width: 10.0,
            outside_temp: 35.0,
            min_temp: 15.0,
            max_temp: 35.0,
            min_power: 0.0,
            max_power: 400.0,
            power_price: 1.0,
            power_utility_unit: 1000.0,
            max_distance: Self::default_max_distance(10.0, 10.0, 10),
        }
    }
}

/// Particle swarm hyperparameters
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PsoConfig {
    pub particle_count: usize,
    pub iterations: usize,
    pub inertia_init: f32,
    pub inertia_end: f32,
    /// Velocity bound as a fraction of each dimension's span
    pub max_speed_location_rate: f32,
    pub c1: f32,
    pub c2: f32,
    /// Coin-flip threshold for an out-of-range velocity: draws at or above it
    /// reset to the lower bound, draws below it to the upper bound
    pub velocity_reset_threshold: f32,
    pub chaos_s: f32,
    pub chaos_scale_from: u32,
    pub chaos_scale_to: u32,
    /// Update particles of one round on the rayon pool
    pub parallel: bool,
}

impl Default for PsoConfig {
    fn default() -> Self {
        PsoConfig {
            particle_count: 100,
            iterations: 1000,
            inertia_init: 0.9,
            inertia_end: 0.4,
            max_speed_location_rate: 0.1,
            c1: 2.0,
            c2: 2.0,
            velocity_reset_threshold: 0.5,
            chaos_s: 0.3,
            chaos_scale_from: 10,
            chaos_scale_to: 20,
            parallel: true,
        }
    }
}

/// Backpropagation network hyperparameters
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BpConfig {
    pub model_kind: ModelKind,
    pub learning_rate: f32,
    /// Epoch budget per sensor
    pub max_iterations: usize,
    pub min_error: f32,
    /// Consecutive non-improving epochs tolerated before stopping
    pub patience: usize,
    pub learning_rate_decay: f32,
    pub weight_init: f32,
    pub bias_init: f32,
    pub output_count: usize,
    /// Worker threads for the training pool (None = one per sensor)
    pub worker_threads: Option<usize>,
}

impl Default for BpConfig {
    fn default() -> Self {
        BpConfig {
            model_kind: ModelKind::Bpnn,
            learning_rate: 0.6,
            max_iterations: 1000,
            min_error: 1e-6,
            patience: 20,
            learning_rate_decay: 0.95,
            weight_init: 1.0,
            bias_init: 0.5,
            output_count: 1,
            worker_threads: None,
        }
    }
}

/// Comfort and objective weights
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ComfortConfig {
    /// Comfort value at the edges of a user's acceptable range
    pub min_value: f32,
    pub satisfy_weight: f32,
    pub power_cost_weight: f32,
}

impl Default for ComfortConfig {
    fn default() -> Self {
        ComfortConfig {
            min_value: 0.2,
            satisfy_weight: 0.5,
            power_cost_weight: 0.5,
        }
    }
}

/// Top-level configuration passed explicitly to trainers, evaluator and scheduler
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub pso: PsoConfig,
    pub bp: BpConfig,
    pub comfort: ComfortConfig,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Rejects configurations no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        let site = &self.site;
        if site.unit_count == 0 {
            return Err(AirconError::config("unit_count must be positive"));
        }
        if !(site.min_power < site.max_power) {
            return Err(AirconError::config(format!(
                "power range [{}, {}] is empty",
                site.min_power, site.max_power
            )));
        }
        if !(site.min_temp < site.max_temp) {
            return Err(AirconError::config(format!(
                "temperature range [{}, {}] is empty",
                site.min_temp, site.max_temp
            )));
        }

        let pso = &self.pso;
        if pso.particle_count == 0 {
            return Err(AirconError::config("particle_count must be positive"));
        }
        if !(pso.max_speed_location_rate > 0.0 && pso.max_speed_location_rate.is_finite()) {
            return Err(AirconError::config("max_speed_location_rate must be positive"));
        }
        for (name, value) in [
            ("c1", pso.c1),
            ("c2", pso.c2),
            ("inertia_init", pso.inertia_init),
            ("inertia_end", pso.inertia_end),
            ("chaos_s", pso.chaos_s),
            ("velocity_reset_threshold", pso.velocity_reset_threshold),
        ] {
            if !value.is_finite() {
                return Err(AirconError::config(format!("{} must be finite, got {}", name, value)));
            }
        }
        if pso.chaos_scale_from == 0 || pso.chaos_scale_from >= pso.chaos_scale_to {
            return Err(AirconError::config("chaos scale range must be [from, to) with 0 < from < to"));
        }

        let bp = &self.bp;
        if !(bp.learning_rate > 0.0 && bp.learning_rate.is_finite()) {
            return Err(AirconError::config("learning_rate must be positive"));
        }
        if bp.max_iterations == 0 {
            return Err(AirconError::config("max_iterations must be positive"));
        }
        if !(bp.learning_rate_decay > 0.0 && bp.learning_rate_decay <= 1.0) {
            return Err(AirconError::config("learning_rate_decay must be in (0, 1]"));
        }
        for (name, value) in [("weight_init", bp.weight_init), ("bias_init", bp.bias_init)] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(AirconError::config(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        if bp.output_count == 0 {
            return Err(AirconError::config("output_count must be positive"));
        }
        if bp.worker_threads == Some(0) {
            return Err(AirconError::config("worker_threads must be positive"));
        }

        if !(self.comfort.min_value > 0.0 && self.comfort.min_value < 1.0) {
            return Err(AirconError::config("comfort min_value must be in (0, 1)"));
        }
        Ok(())
    }
}
