use serde::{Deserialize, Serialize};

/// Planar position inside the site area, in metres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f32,
    pub y: f32,
}

impl GeoPoint {
    pub fn new(x: f32, y: f32) -> Self {
        GeoPoint { x, y }
    }

    pub fn distance(&self, other: &GeoPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}
