//! Core library for the `weather-lookup` widget.
//!
//! This crate defines:
//! - Configuration handling
//! - Geocoding and forecast providers behind small traits
//! - The resolve → fetch → present lookup workflow with its retry budget
//! - Best-effort city suggestions
//! - The widget controller that drives an injected display surface
//!
//! It is used by `weather-lookup-cli`, but any host that implements
//! [`DisplaySurface`] can drive a [`Widget`].

pub mod config;
pub mod display;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod presenter;
pub mod provider;
pub mod resolver;
pub mod suggest;
pub mod widget;
pub mod workflow;

pub use config::Config;
pub use display::DisplaySurface;
pub use error::{FetchError, GeolocationError, LookupError, ResolutionError};
pub use geolocation::{ConfiguredLocation, GeolocationSource};
pub use model::{
    Coordinates, CurrentWeather, DaySunTimes, DisplayFields, Icon, LocationQuery, LookupOutcome,
    WeatherCodeInfo,
};
pub use presenter::{Presenter, ViewerZone, describe};
pub use provider::{Forecaster, Geocoder, providers_from_config};
pub use resolver::Resolver;
pub use suggest::SuggestionService;
pub use widget::Widget;
pub use workflow::{LookupState, WeatherLookupWorkflow};
