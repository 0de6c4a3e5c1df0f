//! Pure formatting: weather codes to text/icon pairs and instants to
//! time-of-day strings.

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};

use crate::model::{CurrentWeather, DaySunTimes, DisplayFields, Icon, WeatherCodeInfo};

const UNKNOWN: WeatherCodeInfo = WeatherCodeInfo {
    description: "Unknown weather",
    icon: Icon::Default,
};

/// WMO weather codes as reported by Open-Meteo.
const WEATHER_CODES: &[(i32, WeatherCodeInfo)] = &[
    (0, info("Clear sky", Icon::Clear)),
    (1, info("Mainly clear", Icon::Clear)),
    (2, info("Partly cloudy", Icon::Cloudy)),
    (3, info("Overcast", Icon::Cloudy)),
    (45, info("Fog", Icon::Cloudy)),
    (48, info("Depositing rime fog", Icon::Cloudy)),
    (51, info("Light drizzle", Icon::RainLight)),
    (53, info("Moderate drizzle", Icon::RainModerate)),
    (55, info("Heavy drizzle", Icon::RainHeavy)),
    (61, info("Light rain", Icon::RainLight)),
    (63, info("Moderate rain", Icon::RainModerate)),
    (65, info("Heavy rain", Icon::RainHeavy)),
    (66, info("Very heavy rain", Icon::RainHeavy)),
    (67, info("Extreme rain", Icon::RainHeavy)),
    (80, info("Showers of rain", Icon::RainModerate)),
    (81, info("Heavy showers of rain", Icon::RainHeavy)),
    (82, info("Violent showers of rain", Icon::RainHeavy)),
    (95, info("Thunderstorms", Icon::Thunderstorm)),
    (96, info("Thunderstorms with light hail", Icon::Thunderstorm)),
    (99, info("Thunderstorms with heavy hail", Icon::Thunderstorm)),
];

const fn info(description: &'static str, icon: Icon) -> WeatherCodeInfo {
    WeatherCodeInfo {
        description,
        icon,
    }
}

/// Description and icon for a weather code. Unknown codes get the fallback entry.
pub fn describe(code: i32) -> WeatherCodeInfo {
    WEATHER_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, info)| *info)
        .unwrap_or(UNKNOWN)
}

/// Codes that have a registered entry.
pub fn known_codes() -> impl Iterator<Item = i32> {
    WEATHER_CODES.iter().map(|(code, _)| *code)
}

pub fn format_temperature(celsius: f64) -> String {
    format!("{celsius}°C")
}

/// Time zone the viewer reads times in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Presenter {
    zone: ViewerZone,
}

impl Presenter {
    pub fn new(zone: ViewerZone) -> Self {
        Self { zone }
    }

    pub fn local() -> Self {
        Self::new(ViewerZone::Local)
    }

    pub fn zone(&self) -> ViewerZone {
        self.zone
    }

    pub fn describe(&self, code: i32) -> WeatherCodeInfo {
        describe(code)
    }

    /// `HH:MM:SS` for the live clock.
    pub fn format_clock(&self, instant: DateTime<Utc>) -> String {
        self.format(instant, "%H:%M:%S")
    }

    /// `HH:MM` for sunrise and sunset.
    pub fn format_time(&self, instant: DateTime<Utc>) -> String {
        self.format(instant, "%H:%M")
    }

    pub fn present(
        &self,
        city: &str,
        weather: &CurrentWeather,
        sun: &DaySunTimes,
    ) -> DisplayFields {
        let info = self.describe(weather.weather_code);

        DisplayFields {
            city: city.to_string(),
            temperature: format_temperature(weather.temperature_c),
            description: info.description.to_string(),
            icon: info.icon,
            sunrise: self.format_time(sun.sunrise),
            sunset: self.format_time(sun.sunset),
        }
    }

    fn format(&self, instant: DateTime<Utc>, pattern: &str) -> String {
        match self.zone {
            ViewerZone::Local => format_in(&Local, instant, pattern),
            ViewerZone::Fixed(offset) => format_in(&offset, instant, pattern),
        }
    }
}

fn format_in<Tz>(zone: &Tz, instant: DateTime<Utc>, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    instant.with_timezone(zone).format(pattern).to_string()
}
