use async_trait::async_trait;
use std::fmt::Debug;

use crate::{config::GeolocationConfig, error::GeolocationError, model::Coordinates};

/// Host-provided "where am I" lookup.
#[async_trait]
pub trait GeolocationSource: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Position taken from the `[geolocation]` config section.
#[derive(Debug, Clone)]
pub struct ConfiguredLocation {
    enabled: bool,
    coordinates: Option<Coordinates>,
}

impl ConfiguredLocation {
    pub fn new(enabled: bool, coordinates: Option<Coordinates>) -> Self {
        Self {
            enabled,
            coordinates,
        }
    }

    pub fn from_config(config: &GeolocationConfig) -> Self {
        Self::new(config.enabled, config.coordinates())
    }
}

#[async_trait]
impl GeolocationSource for ConfiguredLocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        if !self.enabled {
            return Err(GeolocationError::PermissionDenied);
        }

        self.coordinates
            .filter(Coordinates::is_valid)
            .ok_or(GeolocationError::Unsupported)
    }
}
