use thiserror::Error;

/// Failures while turning a place name into coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolutionError {
    #[error("Geocoding API failed: {0}")]
    ProviderUnavailable(String),

    #[error("Invalid coordinates returned from geocoding API")]
    NoCoordinates,
}

/// Failures while fetching current weather for coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("Weather API request failed: {0}")]
    ProviderUnavailable(String),

    #[error("Malformed weather API response: {0}")]
    MalformedResponse(String),
}

/// Failures of the host location service. Never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Failed to get location.")]
    PermissionDenied,

    #[error("Geolocation is not supported on this system.")]
    Unsupported,
}

/// Error of a single resolve + fetch attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
