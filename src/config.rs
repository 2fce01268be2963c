//! Race configuration chosen by the selection screens
//!
//! Validated once at race start; the simulation treats it as trusted.

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::consts::{MIN_TIME_LIMIT_SECS, TIME_LIMIT_STEP_SECS};
use crate::error::ConfigError;
use crate::sim::VehicleProfile;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    pub vehicle: VehicleProfile,
    /// Level number, 1-based
    pub level: u32,
    pub time_limit_secs: u32,
    /// RNG seed for traffic, power-ups and weather
    pub seed: u64,
}

impl RaceConfig {
    pub fn new(
        vehicle: VehicleProfile,
        level: u32,
        time_limit_secs: u32,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            vehicle,
            level,
            time_limit_secs,
            seed,
        };
        config.validate()?;
        Ok(config)
    }

    /// Build from catalog ids, using the track's time limit
    pub fn from_catalog(
        vehicle_id: &str,
        track_id: &str,
        level: u32,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let vehicle = catalog::find_vehicle(vehicle_id).ok_or_else(|| ConfigError::UnknownVehicle {
            id: vehicle_id.to_string(),
        })?;
        let track = catalog::find_track(track_id).ok_or_else(|| ConfigError::UnknownTrack {
            id: track_id.to_string(),
        })?;
        Self::new(vehicle, level, track.time_limit_secs, seed)
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level == 0 {
            return Err(ConfigError::LevelOutOfRange { level: self.level });
        }
        if self.time_limit_secs == 0 {
            return Err(ConfigError::TimeLimitOutOfRange {
                secs: self.time_limit_secs,
            });
        }
        let invalid = |reason| ConfigError::InvalidVehicle {
            id: self.vehicle.id.clone(),
            reason,
        };
        if !self.vehicle.max_speed.is_finite() || self.vehicle.max_speed <= 0.0 {
            return Err(invalid("top speed must be positive"));
        }
        if !self.vehicle.acceleration.is_finite() || self.vehicle.acceleration <= 0.0 {
            return Err(invalid("acceleration must be positive"));
        }
        Ok(())
    }

    /// Config for the following level: shorter clock (never under 20 s), same car
    pub fn next_level(&self, seed: u64) -> Self {
        Self {
            vehicle: self.vehicle.clone(),
            level: self.level + 1,
            time_limit_secs: self
                .time_limit_secs
                .saturating_sub(TIME_LIMIT_STEP_SECS)
                .max(MIN_TIME_LIMIT_SECS),
            seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_catalog() {
        let config = RaceConfig::from_catalog("truck", "highway", 1, 42).unwrap();
        assert_eq!(config.vehicle.name, "Pickup Truck");
        assert_eq!(config.time_limit_secs, 45);

        assert_eq!(
            RaceConfig::from_catalog("tank", "highway", 1, 42),
            Err(ConfigError::UnknownVehicle { id: "tank".into() })
        );
        assert_eq!(
            RaceConfig::from_catalog("truck", "ocean", 1, 42),
            Err(ConfigError::UnknownTrack { id: "ocean".into() })
        );
    }

    #[test]
    fn test_validation() {
        let car = catalog::find_vehicle("sports").unwrap();
        assert!(matches!(
            RaceConfig::new(car.clone(), 0, 60, 1),
            Err(ConfigError::LevelOutOfRange { level: 0 })
        ));
        assert!(matches!(
            RaceConfig::new(car.clone(), 1, 0, 1),
            Err(ConfigError::TimeLimitOutOfRange { .. })
        ));

        let mut broken = car;
        broken.max_speed = f32::NAN;
        assert!(matches!(
            RaceConfig::new(broken, 1, 60, 1),
            Err(ConfigError::InvalidVehicle { .. })
        ));
    }

    #[test]
    fn test_json() {
        let config = RaceConfig::from_catalog("sports", "city", 3, 7).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(RaceConfig::from_json(&json).unwrap(), config);

        let err = RaceConfig::from_json("{\"level\": 1}").unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
        assert!(err.to_string().starts_with("malformed config"));
    }

    #[test]
    fn test_next_level_shrinks_clock() {
        let config = RaceConfig::from_catalog("sports", "city", 1, 7).unwrap();
        let next = config.next_level(8);
        assert_eq!(next.level, 2);
        assert_eq!(next.time_limit_secs, 55);
        assert_eq!(next.seed, 8);

        let hard = RaceConfig::from_catalog("sports", "mountain", 5, 7).unwrap();
        assert_eq!(hard.next_level(1).time_limit_secs, 25);
        assert_eq!(hard.next_level(1).next_level(1).time_limit_secs, 20);
        assert_eq!(
            hard.next_level(1).next_level(1).next_level(1).time_limit_secs,
            20
        );
    }
}
