//! Objective evaluation of power vectors against trained surrogates.

pub mod evaluator;
pub mod report;

pub use evaluator::{Evaluation, Evaluator};
pub use report::{EvaluationReport, Solution, SOLUTION_PSO, SOLUTION_PSO_CHAOS};
