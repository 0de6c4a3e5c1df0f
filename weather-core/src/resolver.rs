use std::sync::Arc;

use crate::{
    error::ResolutionError,
    model::{Coordinates, LocationQuery},
    provider::Geocoder,
};

/// Turns a [`LocationQuery`] into coordinates. Coordinate queries never hit the network.
#[derive(Debug, Clone)]
pub struct Resolver {
    geocoder: Arc<dyn Geocoder>,
}

impl Resolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    pub async fn resolve(&self, query: &LocationQuery) -> Result<Coordinates, ResolutionError> {
        match query {
            LocationQuery::Coordinates { coordinates, .. } => Ok(*coordinates),
            LocationQuery::City(name) => {
                let coordinates = self.geocoder.locate(name).await?;
                if !coordinates.is_valid() {
                    return Err(ResolutionError::NoCoordinates);
                }
                tracing::debug!(city = %name, %coordinates, "resolved city");
                Ok(coordinates)
            }
        }
    }
}
