//! Trained Model Registry
//!
//! Holds the surrogate models the evaluator reads from, keyed by sensor id.

use super::SurrogateModel;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Shared, cheaply clonable registry of per-sensor models
#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    models: Arc<RwLock<HashMap<String, SurrogateModel>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a batch of models, replacing any with the same sensor id.
    pub fn register_models(&self, models: HashMap<String, SurrogateModel>) -> usize {
        let count = models.len();
        let mut map = self.models.write();
        map.extend(models);
        info!(
            "[Registry] Registered {} models ({} total)",
            count,
            map.len()
        );
        count
    }

    pub fn register(&self, model: SurrogateModel) {
        self.models.write().insert(model.sensor_id.clone(), model);
    }

    pub fn get_model(&self, sensor_id: &str) -> Option<SurrogateModel> {
        self.models.read().get(sensor_id).cloned()
    }

    /// Point-in-time copy of every registered model
    pub fn snapshot(&self) -> HashMap<String, SurrogateModel> {
        self.models.read().clone()
    }

    pub fn sensor_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.models.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }

    pub fn clear(&self) {
        self.models.write().clear();
    }
}
