use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, sync::Arc};

use crate::{
    Config,
    error::{FetchError, ResolutionError},
    model::{Coordinates, CurrentWeather, DaySunTimes},
    provider::{geocodexyz::GeocodeXyz, openmeteo::OpenMeteo},
};

pub mod geocodexyz;
pub mod openmeteo;

const USER_AGENT: &str = concat!("weather-lookup/", env!("CARGO_PKG_VERSION"));

/// City-name lookups against a geocoding service.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Coordinates of the best match for `place`.
    async fn locate(&self, place: &str) -> Result<Coordinates, ResolutionError>;

    /// Candidate city names for partially typed input.
    async fn candidates(&self, partial: &str) -> anyhow::Result<Vec<String>>;
}

/// Current conditions and today's sun times for a coordinate pair.
#[async_trait]
pub trait Forecaster: Send + Sync + Debug {
    async fn fetch_weather(
        &self,
        coordinates: Coordinates,
    ) -> Result<(CurrentWeather, DaySunTimes), FetchError>;
}

/// HTTP client shared by both providers, with the configured timeout.
pub fn http_client(config: &Config) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(config.lookup.request_timeout())
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Construct the geocoder and forecaster from config endpoints.
pub fn providers_from_config(
    config: &Config,
) -> anyhow::Result<(Arc<dyn Geocoder>, Arc<dyn Forecaster>)> {
    let http = http_client(config)?;

    let geocoder = GeocodeXyz::with_client(&config.endpoints.geocode_url, http.clone())?;
    let forecaster = OpenMeteo::with_client(&config.endpoints.forecast_url, http)?;

    Ok((Arc::new(geocoder), Arc::new(forecaster)))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
