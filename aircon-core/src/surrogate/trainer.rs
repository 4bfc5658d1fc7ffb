//! Multi-threaded training orchestrator
//!
//! One task per sensor on a dedicated rayon pool. `train_all` returns once
//! every task has finished; a task that fails or panics leaves its sensor
//! out of the result.

use super::SurrogateModel;
use crate::core::config::AppConfig;
use crate::core::error::{AirconError, Result};
use crate::core::seed::rng_for;
use crate::core::storage::TrainingDataSource;
use dashmap::DashMap;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

pub struct MultiThreadTrainer {
    pool: rayon::ThreadPool,
    config: Arc<AppConfig>,
    source: Arc<dyn TrainingDataSource>,
}

impl MultiThreadTrainer {
    pub fn new(config: Arc<AppConfig>, source: Arc<dyn TrainingDataSource>) -> Result<Self> {
        config.validate()?;
        let threads = config
            .bp
            .worker_threads
            .unwrap_or_else(|| config.site.sensor_count.max(1));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("aircon-train-{}", i))
            .build()
            .map_err(|e| AirconError::config(format!("training pool: {}", e)))?;
        info!(
            "[Trainer] Initialized with {} worker threads ({:?})",
            threads, config.bp.model_kind
        );
        Ok(MultiThreadTrainer {
            pool,
            config,
            source,
        })
    }

    /// Trains a single sensor's model on the calling thread.
    pub fn train_sensor(&self, sensor_id: &str, outside_temp: f32) -> Result<SurrogateModel> {
        let samples = self.source.fetch_samples_by_sensor_id(sensor_id, outside_temp)?;
        if samples.is_empty() {
            return Err(AirconError::Training {
                sensor_id: sensor_id.to_string(),
                reason: AirconError::EmptyTrainingSet.to_string(),
            });
        }
        let label = format!("{}@{:.1}", sensor_id, outside_temp);
        let mut rng = rng_for(self.config.seed, &label);
        let regressor = self
            .config
            .bp
            .model_kind
            .train(&samples, &self.config, &mut rng)
            .map_err(|e| AirconError::Training {
                sensor_id: sensor_id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(SurrogateModel::new(sensor_id, outside_temp, regressor))
    }

    /// Trains every sensor in parallel and returns the models that succeeded.
    ///
    /// Each call collects into a fresh map, so the trainer can be reused
    /// across outside-temperature conditions.
    pub fn train_all(&self, sensor_ids: &[String], outside_temp: f32) -> HashMap<String, SurrogateModel> {
        let started = Instant::now();
        let models: DashMap<String, SurrogateModel> = DashMap::with_capacity(sensor_ids.len());

        self.pool.scope(|scope| {
            for sensor_id in sensor_ids {
                let models = &models;
                scope.spawn(move |_| {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        self.train_sensor(sensor_id, outside_temp)
                    }));
                    match outcome {
                        Ok(Ok(model)) => {
                            models.insert(sensor_id.clone(), model);
                        }
                        Ok(Err(e)) => warn!("[Trainer] Sensor {} skipped: {}", sensor_id, e),
                        Err(_) => error!("[Trainer] Training task for sensor {} panicked", sensor_id),
                    }
                });
            }
        });

        let trained: HashMap<String, SurrogateModel> = models.into_iter().collect();
        info!(
            "[Trainer] Trained {}/{} sensors at {:.1} in {:?}",
            trained.len(),
            sensor_ids.len(),
            outside_temp,
            started.elapsed()
        );
        trained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::synthetic::generate_site;
    use crate::core::storage::UserGeoSource;
    use crate::domain::TrainingSample;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.seed = Some(2024);
        config.bp.max_iterations = 50;
        config
    }

    #[test]
    fn trains_one_model_per_sensor() {
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(8);
        let site = generate_site(&config, &mut rng).unwrap();
        site.generate_samples(&config, 10, 0.2, &mut rng).unwrap();
        let sensors = site.store.sensor_ids();

        let trainer = MultiThreadTrainer::new(Arc::new(config), Arc::new(site.store)).unwrap();
        let models = trainer.train_all(&sensors, 35.0);
        assert_eq!(models.len(), sensors.len());
        for id in &sensors {
            assert_eq!(&models[id].sensor_id, id);
            assert_eq!(models[id].input_len(), 8);
        }

        // Reusable: a condition with no data trains nothing.
        assert!(trainer.train_all(&sensors, 20.0).is_empty());
    }

    /// One healthy sample per sensor, except for a few broken ids.
    struct FlakySource;

    impl TrainingDataSource for FlakySource {
        fn fetch_samples_by_sensor_id(&self, sensor_id: &str, outside_temp: f32) -> Result<Vec<TrainingSample>> {
            match sensor_id {
                "boom" => panic!("disk on fire"),
                "empty" => Ok(Vec::new()),
                "wrong" => Ok(vec![
                    TrainingSample::new(sensor_id, vec![1.0; 8], 25.0, outside_temp),
                    TrainingSample::new(sensor_id, vec![1.0; 3], 25.0, outside_temp),
                ]),
                _ => Ok(vec![TrainingSample::new(sensor_id, vec![100.0; 8], 24.0, outside_temp)]),
            }
        }
    }

    #[test]
    fn failures_are_contained_per_sensor() {
        let config = small_config();
        let trainer = MultiThreadTrainer::new(Arc::new(config), Arc::new(FlakySource)).unwrap();
        let ids: Vec<String> = ["ok_1", "boom", "empty", "wrong", "ok_2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let models = trainer.train_all(&ids, 35.0);
        let mut trained: Vec<&String> = models.keys().collect();
        trained.sort();
        assert_eq!(trained, vec!["ok_1", "ok_2"]);

        assert!(matches!(
            trainer.train_sensor("empty", 35.0),
            Err(AirconError::Training { .. })
        ));
    }

    #[test]
    fn seeded_runs_agree() {
        let config = Arc::new(small_config());
        let trainer = MultiThreadTrainer::new(config.clone(), Arc::new(FlakySource)).unwrap();
        let a = trainer.train_sensor("ok_1", 35.0).unwrap();
        let b = trainer.train_sensor("ok_1", 35.0).unwrap();
        let power = [50.0, 150.0, 250.0, 350.0, 0.0, 400.0, 10.0, 90.0];
        assert_eq!(a.predict(&power).unwrap(), b.predict(&power).unwrap());
    }
}
