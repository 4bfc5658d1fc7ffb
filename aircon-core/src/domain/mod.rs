//! Domain types shared by the trainer, evaluator and scheduler.

pub mod comfort;
pub mod geo;
pub mod power;
pub mod sample;

pub use comfort::{ComfortFunction, TempRange};
pub use geo::GeoPoint;
pub use power::PowerVector;
pub use sample::TrainingSample;
