use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::math::geodesy::haversine_distance;
use crate::prelude::PipelineResult;

/// One raw GPS sample as delivered by the location source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
    /// Radius of uncertainty in meters; negative means the sensor had no estimate.
    pub horizontal_accuracy: f64,
    /// Meters per second; negative means unavailable.
    pub speed: f64,
    pub timestamp: DateTime<Utc>,
}

impl Fix {
    pub fn new(
        latitude: f64,
        longitude: f64,
        altitude: f64,
        horizontal_accuracy: f64,
        speed: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            horizontal_accuracy,
            speed,
            timestamp,
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Fix) -> f64 {
        haversine_distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Decodes a JSON array of fixes, the batch shape the source hands over.
pub fn parse_fix_batch(json: &str) -> PipelineResult<Vec<Fix>> {
    let batch: Vec<Fix> = serde_json::from_str(json)?;
    Ok(batch)
}
