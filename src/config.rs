use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::point::Point3;

/// Occupancy prior of an unobserved voxel in log-odds (probability 0.5).
pub const DEFAULT_LOG_ODDS: f64 = 0.0;

/// Sensor model in log-odds form.
///
/// The evidence deltas (`hit_log_odds`, `miss_log_odds`) are added to a voxel
/// per observation; the saturation bounds (`occupied_log_odds`,
/// `free_log_odds`) clamp the accumulated value so stale evidence can still be
/// overturned by new observations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OccupancyParams {
    /// Evidence added when a beam reflects inside a voxel. Positive.
    pub hit_log_odds: f64,
    /// Evidence added when a beam passes through a voxel. Negative.
    pub miss_log_odds: f64,
    /// Upper clamp; a leaf at this value counts as occupied.
    pub occupied_log_odds: f64,
    /// Lower clamp; a leaf at this value counts as free.
    pub free_log_odds: f64,
}

impl Default for OccupancyParams {
    /// Laser range-finder model from the OctoMap paper (section 5.1).
    fn default() -> Self {
        OccupancyParams {
            hit_log_odds: 0.85,
            miss_log_odds: -0.4,
            occupied_log_odds: 0.85,
            free_log_odds: -0.4,
        }
    }
}

impl OccupancyParams {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !self.hit_log_odds.is_finite() || self.hit_log_odds <= 0.0 {
            return Err(Error::InvalidArgument(
                "hit_log_odds must be finite and positive",
            ));
        }
        if !self.miss_log_odds.is_finite() || self.miss_log_odds >= 0.0 {
            return Err(Error::InvalidArgument(
                "miss_log_odds must be finite and negative",
            ));
        }
        if !self.occupied_log_odds.is_finite() || self.occupied_log_odds <= 0.0 {
            return Err(Error::InvalidArgument(
                "occupied_log_odds must be finite and positive",
            ));
        }
        if !self.free_log_odds.is_finite() || self.free_log_odds >= 0.0 {
            return Err(Error::InvalidArgument(
                "free_log_odds must be finite and negative",
            ));
        }
        Ok(())
    }
}

/// Geometry frame and sensor model of an [`crate::OctoTree`].
///
/// The mapped volume is a cube of edge `resolution * 2^max_depth` centered at
/// `center`; `resolution` is the edge length of a voxel at maximum depth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub center: Point3,
    pub resolution: f64,
    pub max_depth: u32,
    pub occupancy: OccupancyParams,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            center: Point3::new(0.0, 0.0, 0.0),
            resolution: 4.0,
            max_depth: 6,
            occupancy: OccupancyParams::default(),
        }
    }
}

impl MapConfig {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !self.center.is_finite() {
            return Err(Error::InvalidArgument("center must be finite"));
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(Error::InvalidArgument(
                "resolution must be finite and positive",
            ));
        }
        if self.max_depth == 0 || self.max_depth > 31 {
            return Err(Error::InvalidArgument("max_depth must be in 1..=31"));
        }
        self.occupancy.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::{MapConfig, OccupancyParams};

    #[test]
    fn default_is_valid() {
        assert!(MapConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_geometry() {
        let mut config = MapConfig::default();
        config.resolution = 0.0;
        assert!(config.validate().is_err());

        let mut config = MapConfig::default();
        config.max_depth = 0;
        assert!(config.validate().is_err());

        let mut config = MapConfig::default();
        config.center.x = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_sensor_model() {
        let mut params = OccupancyParams::default();
        params.miss_log_odds = 0.4;
        assert!(params.validate().is_err());

        let mut params = OccupancyParams::default();
        params.hit_log_odds = f64::INFINITY;
        assert!(params.validate().is_err());

        let mut params = OccupancyParams::default();
        params.free_log_odds = 0.0;
        assert!(params.validate().is_err());
    }
}
