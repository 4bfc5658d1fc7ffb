//! Ordinary least squares surrogate.
//!
//! Solves the normal equations `(XᵀX + λI) w = Xᵀy` over normalised
//! features with an intercept column.

use super::{ModelKind, Normalizer, Regressor};
use crate::core::config::SiteConfig;
use crate::core::error::{AirconError, Result};
use crate::domain::TrainingSample;
use nalgebra::{DMatrix, DVector};

/// Keeps the system solvable when channels are collinear or samples are few.
const RIDGE: f64 = 1e-6;

#[derive(Clone, Debug)]
pub struct LinearModel {
    /// Intercept first, then one coefficient per channel
    weights: Vec<f64>,
    normalizer: Normalizer,
}

/// LU solve of `a x = b`; `None` when `a` is singular.
fn solve(a: DMatrix<f64>, b: DVector<f64>) -> Option<Vec<f64>> {
    let x = a.lu().solve(&b)?;
    x.iter().all(|w| w.is_finite()).then(|| x.iter().copied().collect())
}

impl LinearModel {
    pub fn fit(samples: &[TrainingSample], site: &SiteConfig) -> Result<Self> {
        let first = samples.first().ok_or(AirconError::EmptyTrainingSet)?;
        let inputs = first.features.len();
        let normalizer = Normalizer::from_site(site);
        let p = inputs + 1;

        let mut xtx = DMatrix::<f64>::zeros(p, p);
        let mut xty = DVector::<f64>::zeros(p);
        for sample in samples {
            AirconError::check_len(inputs, sample.features.len())?;
            let row: Vec<f64> = std::iter::once(1.0)
                .chain(normalizer.features(&sample.features).into_iter().map(f64::from))
                .collect();
            let y = normalizer.target(sample.target_temperature) as f64;
            for i in 0..p {
                xty[i] += row[i] * y;
                for j in 0..p {
                    xtx[(i, j)] += row[i] * row[j];
                }
            }
        }
        for i in 0..p {
            xtx[(i, i)] += RIDGE;
        }

        let weights = solve(xtx, xty).ok_or_else(|| AirconError::Training {
            sensor_id: first.sensor_id.clone(),
            reason: "normal equations are singular".to_string(),
        })?;
        Ok(LinearModel {
            weights,
            normalizer,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

impl Regressor for LinearModel {
    fn kind(&self) -> ModelKind {
        ModelKind::LinearRegression
    }

    fn input_len(&self) -> usize {
        self.weights.len() - 1
    }

    fn predict(&self, features: &[f32]) -> Result<f32> {
        AirconError::check_len(self.input_len(), features.len())?;
        let normalized = self.normalizer.features(features);
        let y = self.weights[0]
            + self.weights[1..]
                .iter()
                .zip(&normalized)
                .map(|(w, &x)| w * x as f64)
                .sum::<f64>();
        Ok(self.normalizer.temperature(y as f32))
    }
}
