//! Aircon Core - power scheduling for air-conditioning fleets
//!
//! Learns per-sensor surrogate temperature models from historical
//! power/temperature samples, then searches the power space with a
//! (optionally chaotic) particle swarm for the schedule that best balances
//! user comfort against power cost.

pub mod core;
pub mod domain;
pub mod evaluate;
pub mod surrogate;
pub mod swarm;

// Re-export key types
pub use crate::core::config::AppConfig;
pub use crate::core::error::{AirconError, Result};
pub use crate::core::range::RangeValue;
pub use crate::core::storage::{InMemoryDataStore, TrainingDataSource, UserGeoSource};
pub use domain::{ComfortFunction, GeoPoint, PowerVector, TempRange, TrainingSample};
pub use evaluate::{Evaluation, EvaluationReport, Evaluator, Solution};
pub use surrogate::{ModelKind, ModelRegistry, MultiThreadTrainer, SurrogateModel};
pub use swarm::{Objective, PsoEngine, PsoScheduler, ScheduleRun};

/// Initialize tracing for the library.
///
/// `level` is an `EnvFilter` directive such as `"debug"` or
/// `"aircon_core=debug"`; defaults to `info`. Safe to call more than once.
pub fn setup_logging(level: Option<String>) {
    let filter = level.unwrap_or_else(|| "info".to_string());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
