//! Data sources for training and evaluation
//!
//! Provides the boundary contracts the core consumes:
//! - Training samples per sensor and outside temperature
//! - User comfort functions and user/sensor geography
//!
//! `InMemoryDataStore` implements both and is filled by the synthetic
//! generator in [`synthetic`].

pub mod synthetic;

use super::error::{AirconError, Result};
use crate::domain::{ComfortFunction, GeoPoint, TrainingSample};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Source of historical power/temperature samples
pub trait TrainingDataSource: Send + Sync {
    /// Samples collected for `sensor_id` at the given outside temperature
    fn fetch_samples_by_sensor_id(
        &self,
        sensor_id: &str,
        outside_temp: f32,
    ) -> Result<Vec<TrainingSample>>;
}

/// Source of users, their comfort preferences and nearby sensors
pub trait UserGeoSource: Send + Sync {
    fn user_comfort_functions(&self) -> HashMap<String, ComfortFunction>;

    /// Sensors close enough to count for this user, sorted by id
    fn sensor_ids_near_user(&self, user_id: &str) -> Vec<String>;

    /// Every known sensor id, sorted
    fn sensor_ids(&self) -> Vec<String>;
}

#[derive(Clone, Debug)]
struct UserRecord {
    location: GeoPoint,
    comfort: ComfortFunction,
}

/// Outside temperatures are bucketed at 0.1 degree resolution.
fn temp_key(outside_temp: f32) -> i32 {
    (outside_temp * 10.0).round() as i32
}

/// Thread-safe in-memory store for users, sensors and samples
#[derive(Debug, Default)]
pub struct InMemoryDataStore {
    max_distance: f32,
    users: RwLock<BTreeMap<String, UserRecord>>,
    sensors: RwLock<BTreeMap<String, GeoPoint>>,
    samples: RwLock<HashMap<(String, i32), Vec<TrainingSample>>>,
}

impl InMemoryDataStore {
    pub fn new(max_distance: f32) -> Self {
        InMemoryDataStore {
            max_distance,
            ..Default::default()
        }
    }

    pub fn add_user(&self, location: GeoPoint, comfort: ComfortFunction) {
        let id = comfort.user_id().to_string();
        self.users.write().insert(id, UserRecord { location, comfort });
    }

    pub fn add_sensor(&self, sensor_id: impl Into<String>, location: GeoPoint) {
        self.sensors.write().insert(sensor_id.into(), location);
    }

    pub fn sensor_location(&self, sensor_id: &str) -> Option<GeoPoint> {
        self.sensors.read().get(sensor_id).copied()
    }

    pub fn add_sample(&self, sample: TrainingSample) {
        let key = (sample.sensor_id.clone(), temp_key(sample.outside_temp));
        self.samples.write().entry(key).or_default().push(sample);
    }

    pub fn add_samples(&self, samples: impl IntoIterator<Item = TrainingSample>) {
        let mut map = self.samples.write();
        for sample in samples {
            let key = (sample.sensor_id.clone(), temp_key(sample.outside_temp));
            map.entry(key).or_default().push(sample);
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.read().values().map(Vec::len).sum()
    }

    /// Sensor ids within `max_distance` of the user, sorted.
    ///
    /// Unknown users have no nearby sensors.
    pub fn sensors_near_user(&self, user_id: &str) -> Vec<String> {
        let users = self.users.read();
        let Some(user) = users.get(user_id) else {
            return Vec::new();
        };
        let near: Vec<String> = self
            .sensors
            .read()
            .iter()
            .filter(|(_, location)| user.location.distance(location) <= self.max_distance)
            .map(|(id, _)| id.clone())
            .collect();
        debug!(
            "[Storage] User {} has {} sensors within {:.2}",
            user_id,
            near.len(),
            self.max_distance
        );
        near
    }
}

impl TrainingDataSource for InMemoryDataStore {
    fn fetch_samples_by_sensor_id(
        &self,
        sensor_id: &str,
        outside_temp: f32,
    ) -> Result<Vec<TrainingSample>> {
        if !self.sensors.read().contains_key(sensor_id) {
            return Err(AirconError::Storage(format!("unknown sensor '{}'", sensor_id)));
        }
        let key = (sensor_id.to_string(), temp_key(outside_temp));
        Ok(self.samples.read().get(&key).cloned().unwrap_or_default())
    }
}

impl UserGeoSource for InMemoryDataStore {
    fn user_comfort_functions(&self) -> HashMap<String, ComfortFunction> {
        self.users
            .read()
            .iter()
            .map(|(id, user)| (id.clone(), user.comfort.clone()))
            .collect()
    }

    fn sensor_ids_near_user(&self, user_id: &str) -> Vec<String> {
        self.sensors_near_user(user_id)
    }

    fn sensor_ids(&self) -> Vec<String> {
        self.sensors.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TempRange;

    fn store() -> InMemoryDataStore {
        let store = InMemoryDataStore::new(3.0);
        let comfort = ComfortFunction::new("u1", TempRange::new(22.0, 26.0).unwrap(), 0.2).unwrap();
        store.add_user(GeoPoint::new(0.0, 0.0), comfort);
        store.add_sensor("s_far", GeoPoint::new(5.0, 5.0));
        store.add_sensor("s_near", GeoPoint::new(1.0, 1.0));
        store.add_sensor("s_edge", GeoPoint::new(3.0, 0.0));
        store
    }

    #[test]
    fn nearby_sensors_are_filtered_and_sorted() {
        let store = store();
        assert_eq!(store.sensors_near_user("u1"), vec!["s_edge", "s_near"]);
        assert!(store.sensors_near_user("nobody").is_empty());
        assert_eq!(store.sensor_ids(), vec!["s_edge", "s_far", "s_near"]);
    }

    #[test]
    fn samples_are_bucketed_by_outside_temp() {
        let store = store();
        store.add_sample(TrainingSample::new("s_near", vec![1.0], 25.0, 35.0));
        store.add_sample(TrainingSample::new("s_near", vec![2.0], 24.0, 35.04));
        store.add_sample(TrainingSample::new("s_near", vec![3.0], 23.0, 30.0));

        let at_35 = store.fetch_samples_by_sensor_id("s_near", 35.0).unwrap();
        assert_eq!(at_35.len(), 2);
        let at_30 = store.fetch_samples_by_sensor_id("s_near", 30.0).unwrap();
        assert_eq!(at_30.len(), 1);
        assert!(store.fetch_samples_by_sensor_id("s_far", 35.0).unwrap().is_empty());
        assert_eq!(store.sample_count(), 3);
    }

    #[test]
    fn unknown_sensor_is_a_storage_error() {
        let err = store().fetch_samples_by_sensor_id("ghost", 35.0).unwrap_err();
        assert!(matches!(err, AirconError::Storage(_)));
    }

    #[test]
    fn comfort_functions_keyed_by_user() {
        let functions = store().user_comfort_functions();
        assert_eq!(functions.len(), 1);
        assert_eq!(functions["u1"].user_id(), "u1");
    }
}
