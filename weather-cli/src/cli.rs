use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use weather_core::{
    Config, ConfiguredLocation, Coordinates, GeolocationSource, LocationQuery, LookupOutcome,
    Widget,
};

use crate::terminal::{TerminalDisplay, print_fields};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-lookup", version, about = "Current weather for a city or your location")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather for a city.
    Show {
        city: String,

        /// Extra attempts after a failed one; defaults to the configured budget.
        #[arg(long)]
        retries: Option<u32>,
    },

    /// Show current weather for explicit coordinates or the configured location.
    Here {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// List city suggestions for partial input.
    Suggest { text: String },

    /// Type cities, pick suggestions, repeat.
    Interactive,

    /// Live clock until Ctrl-C.
    Clock,

    /// Edit endpoints, retry budget and location interactively.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let Cli {
            command,
            config: config_path,
            ..
        } = self;

        let config = match &config_path {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match command {
            Command::Show { city, retries } => {
                let widget = Widget::from_config(&config, Arc::new(TerminalDisplay))?;
                let retries = retries.unwrap_or(config.lookup.retries);
                let outcome = widget
                    .workflow()
                    .lookup_with_retries(&LocationQuery::city(city), retries)
                    .await;
                report(outcome)
            }
            Command::Here { lat, lon } => {
                let coordinates = match (lat, lon) {
                    (Some(lat), Some(lon)) => Coordinates::new(
                        check_degrees("Latitude", lat, 90.0)?,
                        check_degrees("Longitude", lon, 180.0)?,
                    ),
                    _ => {
                        ConfiguredLocation::from_config(&config.geolocation)
                            .current_position()
                            .await?
                    }
                };

                let widget = Widget::from_config(&config, Arc::new(TerminalDisplay))?;
                let outcome = widget
                    .workflow()
                    .lookup(&LocationQuery::coordinates(coordinates))
                    .await;
                report(outcome)
            }
            Command::Suggest { text } => {
                let widget = Widget::from_config(&config, Arc::new(TerminalDisplay))?;
                let names = widget.on_text_changed(&text).await.unwrap_or_default();

                if names.is_empty() {
                    println!("No suggestions.");
                }
                for name in names {
                    println!("{name}");
                }
                Ok(())
            }
            Command::Interactive => interactive(&config).await,
            Command::Clock => {
                let widget = Widget::from_config(&config, Arc::new(TerminalDisplay))?;
                let clock = widget.spawn_clock(config.lookup.clock_period());

                tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
                clock.abort();
                println!();
                Ok(())
            }
            Command::Configure => configure(config, config_path.as_deref()),
        }
    }
}

fn report(outcome: LookupOutcome) -> Result<()> {
    match outcome {
        LookupOutcome::Success { fields, .. } => {
            print_fields(&fields);
            Ok(())
        }
        LookupOutcome::Failure { message, attempts } => {
            tracing::debug!(attempts, "lookup gave up");
            bail!("{message}")
        }
    }
}

/// `Ok(None)` when the user cancelled the prompt.
fn answer<T>(result: std::result::Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Prompt failed"),
    }
}

async fn interactive(config: &Config) -> Result<()> {
    let widget = Widget::from_config(config, Arc::new(TerminalDisplay))?;

    println!("Type a city and press Enter. `:here` uses your location, an empty line quits.");

    loop {
        let Some(input) = answer(Text::new("City:").prompt())? else {
            break;
        };
        let input = input.trim();

        if input.is_empty() {
            break;
        }

        if input == ":here" {
            // failures were already shown on the banner
            let _ = widget.on_use_my_location().await;
            continue;
        }

        let suggestions = widget.on_text_changed(input).await.unwrap_or_default();
        if suggestions.is_empty() {
            widget.on_submit(input).await;
            continue;
        }

        let mut options = vec![input.to_string()];
        options.extend(suggestions.into_iter().filter(|name| name != input));

        let Some(choice) = answer(Select::new("Did you mean:", options).prompt())? else {
            continue;
        };

        if choice == input {
            widget.on_submit(&choice).await;
        } else {
            widget.on_suggestion_clicked(&choice).await;
        }
    }

    Ok(())
}

fn configure(mut config: Config, path: Option<&Path>) -> Result<()> {
    config.endpoints.geocode_url = Text::new("Geocoding URL:")
        .with_default(&config.endpoints.geocode_url)
        .prompt()?;

    config.endpoints.forecast_url = Text::new("Forecast URL:")
        .with_default(&config.endpoints.forecast_url)
        .prompt()?;

    config.lookup.retries = CustomType::<u32>::new("Retries after a failed attempt:")
        .with_default(config.lookup.retries)
        .with_error_message("Please type a whole number")
        .prompt()?;

    config.geolocation.enabled = Confirm::new("Allow \"use my location\"?")
        .with_default(config.geolocation.enabled)
        .prompt()?;

    if config.geolocation.enabled {
        let latitude = prompt_degrees("Latitude", config.geolocation.latitude, 90.0)?;
        let longitude = prompt_degrees("Longitude", config.geolocation.longitude, 180.0)?;
        config.geolocation.set_coordinates(Coordinates::new(latitude, longitude));
    }

    let saved_to = match path {
        Some(path) => {
            config.save_to(path)?;
            path.to_path_buf()
        }
        None => config.save()?,
    };

    println!("Saved configuration to {}", saved_to.display());
    Ok(())
}

fn prompt_degrees(label: &str, current: Option<f64>, limit: f64) -> Result<f64> {
    let message = format!("{label}:");
    let mut prompt =
        CustomType::<f64>::new(&message).with_error_message("Please type decimal degrees");
    if let Some(current) = current {
        prompt = prompt.with_default(current);
    }

    check_degrees(label, prompt.prompt()?, limit)
}

/// Rejects values outside `-limit..=limit`, NaN included.
fn check_degrees(label: &str, value: f64, limit: f64) -> Result<f64> {
    if !(-limit..=limit).contains(&value) {
        bail!("{label} {value} is outside -{limit}..{limit}");
    }
    Ok(value)
}
