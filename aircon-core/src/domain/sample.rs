use serde::{Deserialize, Serialize};

/// One historical observation: unit powers and the temperature a sensor read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSample {
    pub sensor_id: String,
    /// Power per unit, in unit order
    pub features: Vec<f32>,
    pub target_temperature: f32,
    /// Outside temperature the sample was collected at
    pub outside_temp: f32,
}

impl TrainingSample {
    pub fn new(
        sensor_id: impl Into<String>,
        features: Vec<f32>,
        target_temperature: f32,
        outside_temp: f32,
    ) -> Self {
        TrainingSample {
            sensor_id: sensor_id.into(),
            features,
            target_temperature,
            outside_temp,
        }
    }
}
