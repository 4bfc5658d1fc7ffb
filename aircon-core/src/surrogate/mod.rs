//! Surrogate temperature models
//!
//! A surrogate maps a power vector to the temperature one sensor would read.
//! Models are trained once per sensor and outside temperature, then shared
//! read-only behind `Arc`.

pub mod bpnn;
pub mod linear;
pub mod network;
pub mod registry;
pub mod trainer;

use crate::core::config::{AppConfig, SiteConfig};
use crate::core::error::Result;
use crate::domain::TrainingSample;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub use bpnn::{BpnnModel, StopReason, TrainingReport};
pub use linear::LinearModel;
pub use registry::ModelRegistry;
pub use trainer::MultiThreadTrainer;

/// A trained power-to-temperature regression
pub trait Regressor: Send + Sync + fmt::Debug {
    fn kind(&self) -> ModelKind;

    /// Number of power channels the model expects
    fn input_len(&self) -> usize;

    /// Fails with `DimensionMismatch` when `features.len() != input_len()`.
    fn predict(&self, features: &[f32]) -> Result<f32>;
}

type TrainFn = fn(&[TrainingSample], &AppConfig, &mut StdRng) -> Result<Arc<dyn Regressor>>;

fn train_bpnn(samples: &[TrainingSample], config: &AppConfig, rng: &mut StdRng) -> Result<Arc<dyn Regressor>> {
    Ok(Arc::new(BpnnModel::fit(samples, config, rng)?))
}

fn train_linear(samples: &[TrainingSample], config: &AppConfig, _rng: &mut StdRng) -> Result<Arc<dyn Regressor>> {
    Ok(Arc::new(LinearModel::fit(samples, &config.site)?))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    #[default]
    Bpnn,
    LinearRegression,
}

impl ModelKind {
    fn trainer(self) -> TrainFn {
        match self {
            ModelKind::Bpnn => train_bpnn,
            ModelKind::LinearRegression => train_linear,
        }
    }

    pub fn train(
        self,
        samples: &[TrainingSample],
        config: &AppConfig,
        rng: &mut StdRng,
    ) -> Result<Arc<dyn Regressor>> {
        (self.trainer())(samples, config, rng)
    }
}

/// Affine maps between raw values and the `[0, 1]` range models work in
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Normalizer {
    pub min_power: f32,
    pub max_power: f32,
    pub min_temp: f32,
    pub max_temp: f32,
}

impl Normalizer {
    pub fn from_site(site: &SiteConfig) -> Self {
        Normalizer {
            min_power: site.min_power,
            max_power: site.max_power,
            min_temp: site.min_temp,
            max_temp: site.max_temp,
        }
    }

    pub fn features(&self, raw: &[f32]) -> Vec<f32> {
        let span = self.max_power - self.min_power;
        raw.iter().map(|v| (v - self.min_power) / span).collect()
    }

    pub fn target(&self, temperature: f32) -> f32 {
        (temperature - self.min_temp) / (self.max_temp - self.min_temp)
    }

    /// Inverse of [`Normalizer::target`], clamped to the temperature range.
    pub fn temperature(&self, normalized: f32) -> f32 {
        let t = self.min_temp + normalized * (self.max_temp - self.min_temp);
        if t.is_nan() {
            return self.min_temp;
        }
        t.clamp(self.min_temp, self.max_temp)
    }
}

/// A trained model bound to the sensor and condition it was trained for
#[derive(Clone, Debug)]
pub struct SurrogateModel {
    pub sensor_id: String,
    pub outside_temp: f32,
    regressor: Arc<dyn Regressor>,
}

impl SurrogateModel {
    pub fn new(sensor_id: impl Into<String>, outside_temp: f32, regressor: Arc<dyn Regressor>) -> Self {
        SurrogateModel {
            sensor_id: sensor_id.into(),
            outside_temp,
            regressor,
        }
    }

    pub fn predict(&self, features: &[f32]) -> Result<f32> {
        self.regressor.predict(features)
    }

    pub fn kind(&self) -> ModelKind {
        self.regressor.kind()
    }

    pub fn input_len(&self) -> usize {
        self.regressor.input_len()
    }
}
