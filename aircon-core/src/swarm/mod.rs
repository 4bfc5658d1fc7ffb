//! Particle Swarm Optimisation
//!
//! Standard and chaotic particle swarms over bounded search spaces, and the
//! scheduler that points them at the satisfaction/cost objective.

pub mod chaos;
pub mod engine;
pub mod objective;
pub mod particle;
pub mod scheduler;


pub use chaos::{ChaosScale, ChaosState};
pub use engine::PsoEngine;
pub use objective::{Objective, SumOfSquares};
pub use particle::{Motion, Particle};
pub use scheduler::{PsoScheduler, ScheduleRun};
