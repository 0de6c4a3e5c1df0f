use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    error::FetchError,
    model::{Coordinates, CurrentWeather, DaySunTimes},
};

use super::{Forecaster, truncate_body};

/// Open-Meteo forecast endpoint, current weather plus daily sun times.
#[derive(Debug, Clone)]
pub struct OpenMeteo {
    base: Url,
    http: Client,
}

impl OpenMeteo {
    pub fn new(base: &str) -> Result<Self> {
        Self::with_client(base, Client::new())
    }

    pub fn with_client(base: &str, http: Client) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("Invalid forecast URL: {base}"))?;
        Ok(Self { base, http })
    }
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    #[serde(default)]
    current_weather: Option<OmCurrent>,
    #[serde(default)]
    daily: Option<OmDaily>,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature: f64,
    #[serde(alias = "weather_code")]
    weathercode: i32,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    #[serde(default)]
    sunrise: Vec<String>,
    #[serde(default)]
    sunset: Vec<String>,
}

impl OmResponse {
    fn into_parts(self) -> std::result::Result<(CurrentWeather, DaySunTimes), FetchError> {
        let current = self
            .current_weather
            .ok_or_else(|| malformed("missing current_weather"))?;
        let daily = self.daily.ok_or_else(|| malformed("missing daily"))?;

        let sunrise = first_instant(&daily.sunrise, "sunrise")?;
        let sunset = first_instant(&daily.sunset, "sunset")?;

        Ok((
            CurrentWeather {
                temperature_c: current.temperature,
                weather_code: current.weathercode,
            },
            DaySunTimes { sunrise, sunset },
        ))
    }
}

fn malformed(detail: impl Into<String>) -> FetchError {
    FetchError::MalformedResponse(detail.into())
}

fn first_instant(
    values: &[String],
    field: &str,
) -> std::result::Result<DateTime<Utc>, FetchError> {
    let raw = values
        .first()
        .ok_or_else(|| malformed(format!("missing daily.{field}")))?;

    parse_instant(raw).ok_or_else(|| malformed(format!("invalid daily.{field} value '{raw}'")))
}

/// Open-Meteo returns `YYYY-MM-DDTHH:MM` in the requested zone (GMT here).
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[async_trait]
impl Forecaster for OpenMeteo {
    async fn fetch_weather(
        &self,
        coordinates: Coordinates,
    ) -> std::result::Result<(CurrentWeather, DaySunTimes), FetchError> {
        let latitude = coordinates.latitude.to_string();
        let longitude = coordinates.longitude.to_string();

        let res = self
            .http
            .get(self.base.clone())
            .query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("current_weather", "true"),
                ("daily", "sunrise,sunset"),
                ("timezone", "GMT"),
            ])
            .send()
            .await
            .map_err(|e| FetchError::ProviderUnavailable(format!("failed to send request: {e}")))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            FetchError::ProviderUnavailable(format!("failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(FetchError::ProviderUnavailable(format!(
                "status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let parsed: OmResponse =
            serde_json::from_str(&body).map_err(|e| malformed(format!("invalid JSON: {e}")))?;

        parsed.into_parts()
    }
}
