//! Picks one linear scale factor per trajectory from the spread of its
//! distances, using a discrete bucket table.

use astralis_config::{ScaleBucket, ScaleConfig};
use glam::DVec3;
use serde::Serialize;

use crate::error::TrajectoryError;
use crate::sample::ValidSampleSet;

/// Factor converting kilometer coordinates into scene units.
///
/// Computed once per trajectory and shared by the trail and the moving body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn value(self) -> f64 {
        self.0
    }

    /// Scales a kilometer position into scene units.
    pub fn apply(self, position: DVec3) -> DVec3 {
        position * self.0
    }
}

/// `max(|p|) - min(|p|)` over the valid positions, `0.0` when empty.
pub fn distance_range(valid: &ValidSampleSet) -> f64 {
    valid
        .distance_bounds()
        .map(|(min, max)| max - min)
        .unwrap_or(0.0)
}

/// Bucket table ordered from the largest threshold down.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleTable {
    buckets: Vec<ScaleBucket>,
    default_factor: f64,
}

impl ScaleTable {
    /// Builds the table from configuration, rejecting tables where a larger
    /// range could map to a larger factor.
    pub fn from_config(config: &ScaleConfig) -> Result<Self, TrajectoryError> {
        config
            .validate()
            .map_err(|e| TrajectoryError::InvalidScaleTable(e.to_string()))?;
        Ok(Self {
            buckets: config.sorted_buckets(),
            default_factor: config.default_factor,
        })
    }

    /// Factor for a distance range: the first bucket the range strictly
    /// exceeds, otherwise the default. A NaN range gets the default.
    pub fn select(&self, distance_range: f64) -> ScaleFactor {
        let factor = self
            .buckets
            .iter()
            .find(|bucket| distance_range > bucket.above_km)
            .map(|bucket| bucket.factor)
            .unwrap_or(self.default_factor);
        ScaleFactor(factor)
    }

    /// Factor for a whole trajectory.
    pub fn select_for(&self, valid: &ValidSampleSet) -> ScaleFactor {
        self.select(distance_range(valid))
    }
}

impl Default for ScaleTable {
    fn default() -> Self {
        let config = ScaleConfig::default();
        Self {
            buckets: config.sorted_buckets(),
            default_factor: config.default_factor,
        }
    }
}
