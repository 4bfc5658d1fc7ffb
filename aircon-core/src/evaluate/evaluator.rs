//! Satisfaction/cost evaluation of power vectors.
//!
//! Each user is bound at construction to the models of their nearby sensors,
//! or to every model when none of the nearby sensors was trained. Evaluation
//! itself keeps no state between calls.

use super::report::{EvaluationReport, Solution};
use crate::core::config::AppConfig;
use crate::core::error::{AirconError, Result};
use crate::core::range::RangeValue;
use crate::core::storage::UserGeoSource;
use crate::domain::{ComfortFunction, PowerVector};
use crate::surrogate::{ModelRegistry, SurrogateModel};
use crate::swarm::objective::Objective;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub satisfaction: f32,
    pub cost: f32,
}

#[derive(Debug)]
struct UserBinding {
    comfort: ComfortFunction,
    /// Indices into `Evaluator::models`
    models: Vec<usize>,
}

#[derive(Debug)]
pub struct Evaluator {
    config: Arc<AppConfig>,
    models: Vec<SurrogateModel>,
    users: Vec<UserBinding>,
}

impl Evaluator {
    pub fn new(config: Arc<AppConfig>, registry: &ModelRegistry, geo: &dyn UserGeoSource) -> Result<Self> {
        let mut models: Vec<SurrogateModel> = registry.snapshot().into_values().collect();
        if models.is_empty() {
            return Err(AirconError::EmptyModelSet);
        }
        models.sort_by(|a, b| a.sensor_id.cmp(&b.sensor_id));
        for model in &models {
            AirconError::check_len(config.site.unit_count, model.input_len())?;
        }

        let comfort: BTreeMap<String, ComfortFunction> = geo.user_comfort_functions().into_iter().collect();
        let mut fallbacks = 0;
        let users = comfort
            .into_iter()
            .map(|(user_id, comfort)| {
                let near = geo.sensor_ids_near_user(&user_id);
                let mut bound: Vec<usize> = models
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| near.contains(&m.sensor_id))
                    .map(|(i, _)| i)
                    .collect();
                if bound.is_empty() {
                    fallbacks += 1;
                    bound = (0..models.len()).collect();
                }
                debug!("[Evaluator] User {} bound to {} models", user_id, bound.len());
                UserBinding {
                    comfort,
                    models: bound,
                }
            })
            .collect::<Vec<_>>();

        info!(
            "[Evaluator] {} users over {} models ({} using the full model set)",
            users.len(),
            models.len(),
            fallbacks
        );
        Ok(Evaluator {
            config,
            models,
            users,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn evaluate(&self, power: &PowerVector) -> Result<Evaluation> {
        self.evaluate_values(&power.values())
    }

    /// Total satisfaction and total cost for raw unit powers.
    pub fn evaluate_values(&self, powers: &[f32]) -> Result<Evaluation> {
        AirconError::check_len(self.config.site.unit_count, powers.len())?;
        let predictions = self
            .models
            .iter()
            .map(|m| m.predict(powers))
            .collect::<Result<Vec<f32>>>()?;

        let satisfaction = self
            .users
            .iter()
            .map(|user| {
                let sum: f32 = user.models.iter().map(|&i| predictions[i]).sum();
                user.comfort.comfort(sum / user.models.len() as f32)
            })
            .sum();
        let cost = powers.iter().sum::<f32>() * self.config.site.power_price;
        Ok(Evaluation { satisfaction, cost })
    }

    /// Weighted satisfaction minus scaled power cost.
    pub fn score(&self, evaluation: &Evaluation) -> f32 {
        let site = &self.config.site;
        let weights = &self.config.comfort;
        let cost_scale = site.user_count as f32 / site.unit_count as f32;
        evaluation.satisfaction * weights.satisfy_weight
            - (evaluation.cost / site.max_power) * cost_scale * weights.power_cost_weight
    }

    pub fn fitness_of(&self, power: &PowerVector) -> Result<f32> {
        Ok(self.score(&self.evaluate(power)?))
    }

    /// Fitness difference `a - b`; positive when `a` is the better schedule.
    pub fn compare(&self, a: &PowerVector, b: &PowerVector) -> Result<f32> {
        Ok(self.fitness_of(a)? - self.fitness_of(b)?)
    }

    pub fn report(&self, solution: Solution) -> Result<EvaluationReport> {
        let evaluation = self.evaluate(&solution.power)?;
        let fitness = self.score(&evaluation);
        Ok(EvaluationReport::new(
            solution,
            evaluation,
            fitness,
            self.config.site.power_utility_unit,
        ))
    }
}

impl Objective for Evaluator {
    fn fitness(&self, position: &[RangeValue]) -> f32 {
        let powers: Vec<f32> = position.iter().map(RangeValue::value).collect();
        match self.evaluate_values(&powers) {
            Ok(evaluation) => self.score(&evaluation),
            Err(_) => f32::NEG_INFINITY,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::storage::InMemoryDataStore;
    use crate::domain::{GeoPoint, TempRange};
    use crate::surrogate::{ModelKind, Regressor};

    /// Temperature falls linearly with total power.
    #[derive(Debug)]
    pub(crate) struct LinearRoom {
        pub units: usize,
        pub base: f32,
    }

    impl Regressor for LinearRoom {
        fn kind(&self) -> ModelKind {
            ModelKind::LinearRegression
        }

        fn input_len(&self) -> usize {
            self.units
        }

        fn predict(&self, features: &[f32]) -> Result<f32> {
            AirconError::check_len(self.units, features.len())?;
            let total: f32 = features.iter().sum();
            Ok((self.base - total / 200.0).clamp(15.0, 35.0))
        }
    }

    /// Two users, three sensors; "s_far" is near nobody.
    pub(crate) fn fixture(units: usize) -> (Arc<AppConfig>, ModelRegistry, InMemoryDataStore) {
        let mut config = AppConfig::default();
        config.site.unit_count = units;
        let store = InMemoryDataStore::new(2.0);
        store.add_sensor("s_a", GeoPoint::new(0.0, 0.0));
        store.add_sensor("s_b", GeoPoint::new(9.0, 9.0));
        store.add_sensor("s_far", GeoPoint::new(5.0, 0.0));
        let near_a = ComfortFunction::new("alice", TempRange::new(22.0, 26.0).unwrap(), 0.2).unwrap();
        let near_b = ComfortFunction::new("bob", TempRange::new(24.0, 28.0).unwrap(), 0.2).unwrap();
        store.add_user(GeoPoint::new(0.5, 0.5), near_a);
        store.add_user(GeoPoint::new(8.5, 8.5), near_b);

        let registry = ModelRegistry::new();
        for (id, base) in [("s_a", 30.0), ("s_b", 32.0), ("s_far", 20.0)] {
            registry.register(SurrogateModel::new(id, 35.0, Arc::new(LinearRoom { units, base })));
        }
        (Arc::new(config), registry, store)
    }

    #[test]
    fn satisfaction_uses_nearby_sensors() {
        let (config, registry, store) = fixture(2);
        let evaluator = Evaluator::new(config, &registry, &store).unwrap();
        let power = PowerVector::from_values(&[400.0, 400.0], 0.0, 400.0).unwrap();

        // alice reads s_a: 30 - 4 = 26 (edge, 0.2). bob reads s_b: 32 - 4 = 28 (edge, 0.2).
        let e = evaluator.evaluate(&power).unwrap();
        assert!((e.satisfaction - 0.4).abs() < 1e-4);
        assert_eq!(e.cost, 800.0);

        // 0.4 * 0.5 - (800 / 400) * (16 / 2) * 0.5
        let fitness = evaluator.fitness_of(&power).unwrap();
        assert!((fitness - (0.2 - 8.0)).abs() < 1e-4);
    }

    #[test]
    fn falls_back_to_full_model_set() {
        let (config, registry, store) = fixture(2);
        let lonely = ComfortFunction::new("carol", TempRange::new(20.0, 30.0).unwrap(), 0.2).unwrap();
        store.add_user(GeoPoint::new(0.0, 9.5), lonely);
        let evaluator = Evaluator::new(config, &registry, &store).unwrap();
        assert_eq!(evaluator.user_count(), 3);

        let idle = PowerVector::from_values(&[0.0, 0.0], 0.0, 400.0).unwrap();
        // carol averages all three: (30 + 32 + 20) / 3 = 27.33, inside [20, 30]
        let e = evaluator.evaluate(&idle).unwrap();
        let carol = ComfortFunction::new("carol", TempRange::new(20.0, 30.0).unwrap(), 0.2).unwrap();
        let alice_and_bob = 0.0; // 30 and 32 are outside their ranges
        let expected = alice_and_bob + carol.comfort(82.0 / 3.0);
        assert!((e.satisfaction - expected).abs() < 1e-4);
        assert_eq!(e.cost, 0.0);
    }

    #[test]
    fn evaluation_is_pure() {
        let (config, registry, store) = fixture(2);
        let evaluator = Evaluator::new(config, &registry, &store).unwrap();
        let power = PowerVector::from_values(&[120.0, 310.0], 0.0, 400.0).unwrap();
        let first = evaluator.evaluate(&power).unwrap();
        let _ = evaluator.evaluate(&PowerVector::from_values(&[0.0, 5.0], 0.0, 400.0).unwrap());
        assert_eq!(evaluator.evaluate(&power).unwrap(), first);
    }

    #[test]
    fn construction_errors() {
        let (config, _, store) = fixture(2);
        assert!(matches!(
            Evaluator::new(config.clone(), &ModelRegistry::new(), &store),
            Err(AirconError::EmptyModelSet)
        ));

        let (_, wide_registry, _) = fixture(3);
        assert!(matches!(
            Evaluator::new(config, &wide_registry, &store),
            Err(AirconError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn objective_maps_bad_positions_to_negative_infinity() {
        let (config, registry, store) = fixture(2);
        let evaluator = Evaluator::new(config, &registry, &store).unwrap();
        let short = vec![RangeValue::new(1.0, 0.0, 400.0).unwrap()];
        assert_eq!(evaluator.fitness(&short), f32::NEG_INFINITY);

        let a = PowerVector::from_values(&[0.0, 0.0], 0.0, 400.0).unwrap();
        let b = PowerVector::from_values(&[400.0, 400.0], 0.0, 400.0).unwrap();
        let diff = evaluator.compare(&a, &b).unwrap();
        assert!((diff - (evaluator.fitness_of(&a).unwrap() - evaluator.fitness_of(&b).unwrap())).abs() < 1e-6);
        assert_eq!(evaluator.fitness(a.as_slice()), evaluator.fitness_of(&a).unwrap());
    }
}
