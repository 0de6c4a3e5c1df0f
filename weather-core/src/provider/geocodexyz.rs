use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::{error::ResolutionError, model::Coordinates};

use super::{Geocoder, truncate_body};

/// geocode.xyz forward geocoding: `GET {base}/{place}?json=1`.
#[derive(Debug, Clone)]
pub struct GeocodeXyz {
    base: Url,
    http: Client,
}

impl GeocodeXyz {
    pub fn new(base: &str) -> Result<Self> {
        Self::with_client(base, Client::new())
    }

    pub fn with_client(base: &str, http: Client) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("Invalid geocoding URL: {base}"))?;
        if base.cannot_be_a_base() {
            bail!("Invalid geocoding URL: {base} cannot take a place path");
        }

        Ok(Self { base, http })
    }

    fn place_url(&self, place: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(place);
        }
        url.query_pairs_mut().append_pair("json", "1");
        url
    }

    /// Body of a successful response, or a description of why there is none.
    async fn fetch_body(&self, place: &str) -> std::result::Result<String, String> {
        let res = self
            .http
            .get(self.place_url(place))
            .send()
            .await
            .map_err(|e| format!("failed to send request: {e}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| format!("failed to read response body: {e}"))?;

        if !status.is_success() {
            return Err(format!("status {}: {}", status, truncate_body(&body)));
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct XyzLocation {
    #[serde(default)]
    latt: Option<Value>,
    #[serde(default)]
    longt: Option<Value>,
}

impl XyzLocation {
    fn coordinates(&self) -> Option<Coordinates> {
        let latitude = self.latt.as_ref().and_then(numeric)?;
        let longitude = self.longt.as_ref().and_then(numeric)?;
        Some(Coordinates::new(latitude, longitude))
    }
}

#[derive(Debug, Deserialize)]
struct XyzSuggestions {
    #[serde(default)]
    standard: Option<XyzStandard>,
}

#[derive(Debug, Deserialize)]
struct XyzStandard {
    #[serde(default)]
    city: Option<CityField>,
}

/// `standard.city` is a bare string for a single match and a list otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CityField {
    One(String),
    Many(Vec<String>),
}

impl CityField {
    fn into_names(self) -> Vec<String> {
        let names = match self {
            CityField::One(name) => vec![name],
            CityField::Many(names) => names,
        };

        names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

/// geocode.xyz encodes numbers as strings; accept both forms.
fn numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

#[async_trait]
impl Geocoder for GeocodeXyz {
    async fn locate(&self, place: &str) -> std::result::Result<Coordinates, ResolutionError> {
        let body = self
            .fetch_body(place)
            .await
            .map_err(ResolutionError::ProviderUnavailable)?;

        let parsed: XyzLocation =
            serde_json::from_str(&body).map_err(|_| ResolutionError::NoCoordinates)?;

        parsed.coordinates().ok_or(ResolutionError::NoCoordinates)
    }

    async fn candidates(&self, partial: &str) -> Result<Vec<String>> {
        let body = self
            .fetch_body(partial)
            .await
            .map_err(|detail| anyhow!("Geocoding suggestions failed: {detail}"))?;

        let parsed: XyzSuggestions =
            serde_json::from_str(&body).context("Failed to parse geocode.xyz suggestion JSON")?;

        Ok(parsed
            .standard
            .and_then(|standard| standard.city)
            .map(CityField::into_names)
            .unwrap_or_default())
    }
}
