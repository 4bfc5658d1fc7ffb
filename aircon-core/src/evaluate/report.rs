//! Named solutions and their JSON evaluation reports.

use super::evaluator::Evaluation;
use crate::core::error::Result;
use crate::domain::PowerVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SOLUTION_PSO: &str = "solution_pso";
pub const SOLUTION_PSO_CHAOS: &str = "solution_pso_chaos";

/// A named power schedule
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub name: String,
    pub power: PowerVector,
}

impl Solution {
    pub fn new(name: impl Into<String>, power: PowerVector) -> Self {
        Solution {
            name: name.into(),
            power,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub solution: Solution,
    pub satisfaction: f32,
    pub cost: f32,
    pub fitness: f32,
    /// Satisfaction per `power_utility_unit` of cost
    pub power_utility: f32,
    pub generated_at: DateTime<Utc>,
}

impl EvaluationReport {
    pub fn new(solution: Solution, evaluation: Evaluation, fitness: f32, power_utility_unit: f32) -> Self {
        let power_utility = if evaluation.cost > 0.0 {
            evaluation.satisfaction / evaluation.cost * power_utility_unit
        } else {
            0.0
        };
        EvaluationReport {
            solution,
            satisfaction: evaluation.satisfaction,
            cost: evaluation.cost,
            fitness,
            power_utility,
            generated_at: Utc::now(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution() -> Solution {
        Solution::new(SOLUTION_PSO, PowerVector::from_values(&[100.0, 300.0], 0.0, 400.0).unwrap())
    }

    #[test]
    fn power_utility_per_unit_cost() {
        let report = EvaluationReport::new(
            solution(),
            Evaluation { satisfaction: 8.0, cost: 400.0 },
            3.0,
            1000.0,
        );
        assert!((report.power_utility - 20.0).abs() < 1e-4);

        let idle = EvaluationReport::new(solution(), Evaluation { satisfaction: 1.0, cost: 0.0 }, 0.5, 1000.0);
        assert_eq!(idle.power_utility, 0.0);
    }

    #[test]
    fn serialises_with_solution_name() {
        let report = EvaluationReport::new(solution(), Evaluation { satisfaction: 2.0, cost: 10.0 }, 0.9, 1000.0);
        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("\"solution_pso\""));
        let back: EvaluationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.solution, report.solution);
        assert_eq!(back.generated_at, report.generated_at);
    }
}
