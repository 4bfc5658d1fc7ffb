//! Backpropagation network trained per sensor.
//!
//! Epoch training over the whole sample set: shuffle, then forward, backward
//! and update once per sample. Stops when the running MSE drops below
//! `min_error`, when the epoch budget is spent, or after `patience`
//! non-improving epochs (each of which decays the learning rate).

use super::network::NeuralGraph;
use super::{ModelKind, Normalizer, Regressor};
use crate::core::config::{AppConfig, BpConfig};
use crate::core::error::{AirconError, Result};
use crate::domain::TrainingSample;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Empirical hidden-layer size for `inputs` inputs and `outputs` outputs.
pub fn hidden_cell_count(inputs: usize, outputs: usize) -> usize {
    let n = inputs as f64;
    let o = outputs as f64;
    ((0.43 * n * n + 0.12 * o * o + 2.54 * n + 0.77 * o + 0.35).sqrt() + 0.51).round() as usize
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Converged,
    MaxIterations,
    EarlyStopped,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingReport {
    pub epochs: usize,
    pub final_mse: f32,
    pub best_mse: f32,
    pub final_learning_rate: f32,
    pub stop_reason: StopReason,
}

#[derive(Clone, Debug)]
pub struct BpnnModel {
    graph: NeuralGraph,
    normalizer: Normalizer,
    report: Option<TrainingReport>,
}

impl BpnnModel {
    /// Untrained network sized for `input_count` power channels.
    pub fn new<R: Rng + ?Sized>(input_count: usize, config: &AppConfig, rng: &mut R) -> Result<Self> {
        let bp = &config.bp;
        let hidden = hidden_cell_count(input_count, bp.output_count);
        let graph = NeuralGraph::new(
            input_count,
            hidden,
            bp.output_count,
            bp.weight_init,
            bp.bias_init,
            rng,
        )?;
        Ok(BpnnModel {
            graph,
            normalizer: Normalizer::from_site(&config.site),
            report: None,
        })
    }

    /// Builds and trains a network in one step.
    pub fn fit<R: Rng + ?Sized>(samples: &[TrainingSample], config: &AppConfig, rng: &mut R) -> Result<Self> {
        let first = samples.first().ok_or(AirconError::EmptyTrainingSet)?;
        let mut model = Self::new(first.features.len(), config, rng)?;
        model.train(samples, &config.bp, rng)?;
        Ok(model)
    }

    pub fn train<R: Rng + ?Sized>(
        &mut self,
        samples: &[TrainingSample],
        bp: &BpConfig,
        rng: &mut R,
    ) -> Result<TrainingReport> {
        if samples.is_empty() {
            return Err(AirconError::EmptyTrainingSet);
        }
        if bp.learning_rate <= 0.0 || bp.max_iterations == 0 {
            return Err(AirconError::config("learning parameters must be positive"));
        }

        let outputs = self.graph.output_count();
        let mut data = Vec::with_capacity(samples.len());
        for sample in samples {
            AirconError::check_len(self.graph.input_count(), sample.features.len())?;
            let features = self.normalizer.features(&sample.features);
            let target = vec![self.normalizer.target(sample.target_temperature); outputs];
            data.push((features, target));
        }

        let mut order: Vec<usize> = (0..data.len()).collect();
        let mut learning_rate = bp.learning_rate;
        let mut best_mse = f32::INFINITY;
        let mut final_mse = f32::INFINITY;
        let mut stale = 0;
        let mut epochs = 0;
        let mut stop_reason = StopReason::MaxIterations;

        while epochs < bp.max_iterations {
            epochs += 1;
            order.shuffle(rng);
            let mut squared = 0.0f32;
            for &i in &order {
                let (features, target) = &data[i];
                self.graph.feed_forward(features)?;
                squared += self
                    .graph
                    .outputs()
                    .iter()
                    .zip(target)
                    .map(|(o, t)| (t - o) * (t - o))
                    .sum::<f32>();
                self.graph.back_propagate(target)?;
                self.graph.adjust(learning_rate);
            }
            final_mse = squared / (data.len() * outputs) as f32;

            if final_mse < bp.min_error {
                best_mse = best_mse.min(final_mse);
                stop_reason = StopReason::Converged;
                break;
            }
            if final_mse < best_mse {
                best_mse = final_mse;
                stale = 0;
            } else {
                stale += 1;
                learning_rate *= bp.learning_rate_decay;
                if stale >= bp.patience {
                    stop_reason = StopReason::EarlyStopped;
                    break;
                }
            }
        }

        let report = TrainingReport {
            epochs,
            final_mse,
            best_mse,
            final_learning_rate: learning_rate,
            stop_reason,
        };
        debug!(
            "[BPNN] Stopped after {} epochs ({:?}), mse {:.3e}",
            report.epochs, report.stop_reason, report.final_mse
        );
        self.report = Some(report.clone());
        Ok(report)
    }

    /// Predicted temperature, clamped to the site's temperature range.
    pub fn use_model(&self, features: &[f32]) -> Result<f32> {
        AirconError::check_len(self.graph.input_count(), features.len())?;
        let outputs = self.graph.evaluate(&self.normalizer.features(features))?;
        Ok(self.normalizer.temperature(outputs[0]))
    }

    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    pub fn graph(&self) -> &NeuralGraph {
        &self.graph
    }
}

impl Regressor for BpnnModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Bpnn
    }

    fn input_len(&self) -> usize {
        self.graph.input_count()
    }

    fn predict(&self, features: &[f32]) -> Result<f32> {
        self.use_model(features)
    }
}
