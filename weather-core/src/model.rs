use chrono::{DateTime, Utc};

/// Label shown for lookups that started from the host location service.
pub const CURRENT_LOCATION_LABEL: &str = "Your Location";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// What the user asked for: a place name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates {
        coordinates: Coordinates,
        label: Option<String>,
    },
}

impl LocationQuery {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City(name.into())
    }

    pub fn coordinates(coordinates: Coordinates) -> Self {
        Self::Coordinates {
            coordinates,
            label: None,
        }
    }

    /// Text for the city label of the rendered result.
    pub fn label(&self) -> &str {
        match self {
            Self::City(name) => name,
            Self::Coordinates {
                label: Some(label), ..
            } => label,
            Self::Coordinates { label: None, .. } => CURRENT_LOCATION_LABEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentWeather {
    pub temperature_c: f64,
    pub weather_code: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// Named icon from the host's asset set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Clear,
    Cloudy,
    RainLight,
    RainModerate,
    RainHeavy,
    Thunderstorm,
    Default,
}

impl Icon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::Clear => "clear",
            Icon::Cloudy => "cloudy",
            Icon::RainLight => "rain_light",
            Icon::RainModerate => "rain_moderate",
            Icon::RainHeavy => "rain_heavy",
            Icon::Thunderstorm => "thunderstorm",
            Icon::Default => "default",
        }
    }

    pub const fn all() -> &'static [Icon] {
        &[
            Icon::Clear,
            Icon::Cloudy,
            Icon::RainLight,
            Icon::RainModerate,
            Icon::RainHeavy,
            Icon::Thunderstorm,
            Icon::Default,
        ]
    }

    /// Relative path of the image the host renders for this icon.
    pub fn asset_path(&self) -> String {
        format!("icons/{}.png", self.as_str())
    }
}

impl std::fmt::Display for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCodeInfo {
    pub description: &'static str,
    pub icon: Icon,
}

/// Display-ready fields of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFields {
    pub city: String,
    pub temperature: String,
    pub description: String,
    pub icon: Icon,
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Success {
        fields: DisplayFields,
        attempts: u32,
    },
    Failure { message: String, attempts: u32 },
}

impl LookupOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LookupOutcome::Success { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            LookupOutcome::Success { attempts, .. } | LookupOutcome::Failure { attempts, .. } => {
                *attempts
            }
        }
    }
}
