//! Input event wiring: text changes, submit, "use my location", suggestion
//! clicks, the error banner and the live clock.

use chrono::Utc;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::{
    Config,
    display::DisplaySurface,
    error::GeolocationError,
    geolocation::{ConfiguredLocation, GeolocationSource},
    model::{LocationQuery, LookupOutcome},
    presenter::Presenter,
    provider::providers_from_config,
    suggest::SuggestionService,
    workflow::WeatherLookupWorkflow,
};

pub const EMPTY_CITY_MESSAGE: &str = "Please enter a city.";
pub const DEFAULT_BANNER_DURATION: Duration = Duration::from_secs(3);

pub struct Widget {
    display: Arc<dyn DisplaySurface>,
    workflow: WeatherLookupWorkflow,
    suggestions: SuggestionService,
    geolocation: Arc<dyn GeolocationSource>,
    banner_duration: Duration,
    /// Sequence number of the latest text-changed event.
    keystrokes: AtomicU64,
    /// Sequence number of the latest banner shown.
    banners: Arc<AtomicU64>,
}

impl Widget {
    pub fn new(
        display: Arc<dyn DisplaySurface>,
        workflow: WeatherLookupWorkflow,
        suggestions: SuggestionService,
        geolocation: Arc<dyn GeolocationSource>,
    ) -> Self {
        Self {
            display,
            workflow,
            suggestions,
            geolocation,
            banner_duration: DEFAULT_BANNER_DURATION,
            keystrokes: AtomicU64::new(0),
            banners: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Wire the HTTP providers, config-backed geolocation and the local time zone.
    pub fn from_config(config: &Config, display: Arc<dyn DisplaySurface>) -> anyhow::Result<Self> {
        let (geocoder, forecaster) = providers_from_config(config)?;

        let workflow = WeatherLookupWorkflow::new(geocoder.clone(), forecaster, Presenter::local())
            .with_retries(config.lookup.retries);
        let suggestions =
            SuggestionService::with_min_chars(geocoder, config.lookup.suggest_min_chars);
        let geolocation = Arc::new(ConfiguredLocation::from_config(&config.geolocation));

        Ok(Self::new(display, workflow, suggestions, geolocation)
            .with_banner_duration(config.lookup.error_banner()))
    }

    pub fn with_banner_duration(mut self, duration: Duration) -> Self {
        self.banner_duration = duration;
        self
    }

    pub fn workflow(&self) -> &WeatherLookupWorkflow {
        &self.workflow
    }

    /// Refresh suggestions for the current input.
    ///
    /// Returns the rendered list, or `None` when a newer keystroke arrived
    /// while the request was in flight and the response was dropped.
    pub async fn on_text_changed(&self, text: &str) -> Option<Vec<String>> {
        let ticket = self.keystrokes.fetch_add(1, Ordering::SeqCst) + 1;
        let text = text.trim();

        if text.is_empty() {
            self.display.render_suggestions(&[]);
            return Some(Vec::new());
        }

        let names = self.suggestions.suggest(text).await;

        if self.keystrokes.load(Ordering::SeqCst) != ticket {
            tracing::debug!(text, "dropping stale suggestions");
            return None;
        }

        self.display.render_suggestions(&names);
        Some(names)
    }

    /// "Get weather" pressed. `None` when the input was empty.
    pub async fn on_submit(&self, text: &str) -> Option<LookupOutcome> {
        let city = text.trim();
        if city.is_empty() {
            self.show_error(EMPTY_CITY_MESSAGE);
            return None;
        }

        Some(self.run_lookup(&LocationQuery::city(city)).await)
    }

    /// "Use my location" pressed. Geolocation failures are shown at once and not retried.
    pub async fn on_use_my_location(&self) -> Result<LookupOutcome, GeolocationError> {
        let coordinates = match self.geolocation.current_position().await {
            Ok(coordinates) => coordinates,
            Err(err) => {
                tracing::warn!("geolocation failed: {err}");
                self.show_error(&err.to_string());
                return Err(err);
            }
        };

        Ok(self.run_lookup(&LocationQuery::coordinates(coordinates)).await)
    }

    pub async fn on_suggestion_clicked(&self, city: &str) -> LookupOutcome {
        // in-flight suggestion responses are now stale
        self.keystrokes.fetch_add(1, Ordering::SeqCst);

        self.display.set_input(city);
        self.display.render_suggestions(&[]);

        self.run_lookup(&LocationQuery::city(city)).await
    }

    /// Render the clock every `period` until the handle is aborted.
    pub fn spawn_clock(&self, period: Duration) -> JoinHandle<()> {
        let display = Arc::clone(&self.display);
        let presenter = *self.workflow.presenter();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                display.render_clock(&presenter.format_clock(Utc::now()));
            }
        })
    }

    async fn run_lookup(&self, query: &LocationQuery) -> LookupOutcome {
        let outcome = self.workflow.lookup(query).await;

        match &outcome {
            LookupOutcome::Success { fields, .. } => {
                self.banners.fetch_add(1, Ordering::SeqCst);
                self.display.render(fields);
                self.display.hide_error();
            }
            LookupOutcome::Failure { message, .. } => self.show_error(message),
        }

        outcome
    }

    /// Show the banner and hide it after the banner duration, unless a newer one replaced it.
    fn show_error(&self, message: &str) {
        let banner = self.banners.fetch_add(1, Ordering::SeqCst) + 1;
        self.display.show_error(message);

        let display = Arc::clone(&self.display);
        let banners = Arc::clone(&self.banners);
        let duration = self.banner_duration;

        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if banners.load(Ordering::SeqCst) == banner {
                display.hide_error();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::FetchError,
        model::{Coordinates, DisplayFields, Icon},
        provider::Geocoder,
        resolver::tests::ScriptedGeocoder,
        workflow::tests::{ScriptedForecaster, clear_sky, utc_presenter},
    };
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq)]
    enum Shown {
        Fields(DisplayFields),
        Error(String),
        HideError,
        Suggestions(Vec<String>),
        Clock(String),
        Input(String),
    }

    #[derive(Default)]
    struct RecordingDisplay {
        events: Mutex<Vec<Shown>>,
    }

    impl RecordingDisplay {
        fn events(&self) -> Vec<Shown> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, shown: Shown) {
            self.events.lock().unwrap().push(shown);
        }
    }

    impl DisplaySurface for RecordingDisplay {
        fn render(&self, fields: &DisplayFields) {
            self.push(Shown::Fields(fields.clone()));
        }

        fn show_error(&self, message: &str) {
            self.push(Shown::Error(message.to_string()));
        }

        fn hide_error(&self) {
            self.push(Shown::HideError);
        }

        fn render_suggestions(&self, suggestions: &[String]) {
            self.push(Shown::Suggestions(suggestions.to_vec()));
        }

        fn render_clock(&self, text: &str) {
            self.push(Shown::Clock(text.to_string()));
        }

        fn set_input(&self, text: &str) {
            self.push(Shown::Input(text.to_string()));
        }
    }

    struct Fixture {
        display: Arc<RecordingDisplay>,
        geocoder: Arc<ScriptedGeocoder>,
        forecaster: Arc<ScriptedForecaster>,
        widget: Widget,
    }

    fn fixture(
        geocoder: ScriptedGeocoder,
        forecaster: ScriptedForecaster,
        geolocation: ConfiguredLocation,
        retries: u32,
    ) -> Fixture {
        let display = Arc::new(RecordingDisplay::default());
        let geocoder = Arc::new(geocoder);
        let forecaster = Arc::new(forecaster);

        let workflow =
            WeatherLookupWorkflow::new(geocoder.clone(), forecaster.clone(), utc_presenter())
                .with_retries(retries);
        let suggestions = SuggestionService::new(geocoder.clone());
        let widget = Widget::new(display.clone(), workflow, suggestions, Arc::new(geolocation));

        Fixture {
            display,
            geocoder,
            forecaster,
            widget,
        }
    }

    fn berlin() -> Coordinates {
        Coordinates::new(52.52, 13.41)
    }

    fn no_location() -> ConfiguredLocation {
        ConfiguredLocation::new(true, None)
    }

    #[tokio::test]
    async fn submit_renders_fields_and_hides_banner() {
        let fx = fixture(
            ScriptedGeocoder::always(Ok(berlin())),
            ScriptedForecaster::always(Ok(clear_sky())),
            no_location(),
            20,
        );

        let outcome = fx.widget.on_submit("  Berlin ").await.expect("lookup ran");

        assert!(outcome.is_success());
        let events = fx.display.events();
        let Shown::Fields(fields) = &events[0] else {
            panic!("expected rendered fields first");
        };
        assert_eq!(fields.city, "Berlin");
        assert_eq!(fields.description, "Clear sky");
        assert_eq!(fields.icon, Icon::Clear);
        assert_eq!(events[1], Shown::HideError);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_submit_shows_banner_then_dismisses_it() {
        let fx = fixture(
            ScriptedGeocoder::default(),
            ScriptedForecaster::default(),
            no_location(),
            20,
        );

        assert!(fx.widget.on_submit("   ").await.is_none());
        assert_eq!(fx.display.events(), vec![Shown::Error(EMPTY_CITY_MESSAGE.into())]);
        assert_eq!(fx.geocoder.locate_calls(), 0);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(fx.display.events().len(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            fx.display.events(),
            vec![Shown::Error(EMPTY_CITY_MESSAGE.into()), Shown::HideError]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn newer_banner_is_not_hidden_by_older_timer() {
        let fx = fixture(
            ScriptedGeocoder::default(),
            ScriptedForecaster::default(),
            no_location(),
            0,
        );

        fx.widget.on_submit("").await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        fx.widget.on_submit("").await;

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!fx.display.events().contains(&Shown::HideError));

        tokio::time::sleep(Duration::from_secs(2)).await;
        let hides = fx.display.events().iter().filter(|e| **e == Shown::HideError).count();
        assert_eq!(hides, 1);
    }

    #[tokio::test]
    async fn failed_lookup_shows_last_error() {
        let fx = fixture(
            ScriptedGeocoder::always(Ok(berlin())),
            ScriptedForecaster::always(Err(FetchError::ProviderUnavailable("status 502".into()))),
            no_location(),
            2,
        );

        let outcome = fx.widget.on_submit("Berlin").await.expect("lookup ran");

        assert_eq!(outcome.attempts(), 3);
        assert_eq!(
            fx.display.events(),
            vec![Shown::Error("Weather API request failed: status 502".into())]
        );
    }

    #[tokio::test]
    async fn geolocation_failure_is_not_retried() {
        let fx = fixture(
            ScriptedGeocoder::always(Ok(berlin())),
            ScriptedForecaster::always(Ok(clear_sky())),
            ConfiguredLocation::new(false, Some(berlin())),
            20,
        );

        let err = fx.widget.on_use_my_location().await.unwrap_err();

        assert_eq!(err, GeolocationError::PermissionDenied);
        assert_eq!(fx.display.events(), vec![Shown::Error("Failed to get location.".into())]);
        assert_eq!(fx.geocoder.locate_calls(), 0);
        assert_eq!(fx.forecaster.calls(), 0);
    }

    #[tokio::test]
    async fn my_location_uses_coordinates_directly() {
        let here = Coordinates::new(-33.87, 151.21);
        let fx = fixture(
            ScriptedGeocoder::default(),
            ScriptedForecaster::always(Ok(clear_sky())),
            ConfiguredLocation::new(true, Some(here)),
            20,
        );

        let outcome = fx.widget.on_use_my_location().await.expect("location available");

        let LookupOutcome::Success { fields, .. } = outcome else {
            panic!("expected success");
        };
        assert_eq!(fields.city, "Your Location");
        assert_eq!(fx.geocoder.locate_calls(), 0);
        assert_eq!(fx.forecaster.seen.lock().unwrap().as_slice(), &[here]);
    }

    #[tokio::test]
    async fn text_changes_render_suggestions() {
        let fx = fixture(
            ScriptedGeocoder::with_candidates(Ok(vec!["Berlin".into(), "Bern".into()])),
            ScriptedForecaster::default(),
            no_location(),
            20,
        );

        assert_eq!(fx.widget.on_text_changed("be").await, Some(Vec::new()));
        assert_eq!(fx.geocoder.candidate_calls(), 0);

        let shown = fx.widget.on_text_changed("ber").await;
        assert_eq!(shown, Some(vec!["Berlin".to_string(), "Bern".to_string()]));
        assert_eq!(fx.geocoder.candidate_calls(), 1);

        fx.widget.on_text_changed("   ").await;
        assert_eq!(fx.display.events().last(), Some(&Shown::Suggestions(Vec::new())));
    }

    #[tokio::test]
    async fn suggestion_click_clears_list_and_looks_up() {
        let fx = fixture(
            ScriptedGeocoder::always(Ok(berlin())),
            ScriptedForecaster::always(Ok(clear_sky())),
            no_location(),
            20,
        );

        let outcome = fx.widget.on_suggestion_clicked("Bern").await;

        assert!(outcome.is_success());
        let events = fx.display.events();
        assert_eq!(events[0], Shown::Input("Bern".into()));
        assert_eq!(events[1], Shown::Suggestions(Vec::new()));
        assert!(matches!(&events[2], Shown::Fields(fields) if fields.city == "Bern"));
    }

    /// Holds back answers for "ber" until released, so a later keystroke finishes first.
    #[derive(Debug, Default)]
    struct GatedGeocoder {
        gate: Notify,
    }

    #[async_trait]
    impl Geocoder for GatedGeocoder {
        async fn locate(&self, _place: &str) -> Result<Coordinates, crate::error::ResolutionError> {
            Ok(berlin())
        }

        async fn candidates(&self, partial: &str) -> anyhow::Result<Vec<String>> {
            if partial == "ber" {
                self.gate.notified().await;
                return Ok(vec!["Bergen".into()]);
            }
            Ok(vec![format!("{partial}in")])
        }
    }

    #[tokio::test]
    async fn stale_suggestions_are_dropped() {
        let display = Arc::new(RecordingDisplay::default());
        let geocoder = Arc::new(GatedGeocoder::default());
        let workflow = WeatherLookupWorkflow::new(
            geocoder.clone(),
            Arc::new(ScriptedForecaster::default()),
            utc_presenter(),
        );
        let widget = Widget::new(
            display.clone(),
            workflow,
            SuggestionService::new(geocoder.clone()),
            Arc::new(no_location()),
        );

        let (older, newer) = tokio::join!(widget.on_text_changed("ber"), async {
            let shown = widget.on_text_changed("berl").await;
            geocoder.gate.notify_one();
            shown
        });

        assert_eq!(older, None);
        assert_eq!(newer, Some(vec!["berlin".to_string()]));
        assert_eq!(display.events(), vec![Shown::Suggestions(vec!["berlin".into()])]);
    }

    #[tokio::test(start_paused = true)]
    async fn clock_ticks_until_aborted() {
        let fx = fixture(
            ScriptedGeocoder::default(),
            ScriptedForecaster::default(),
            no_location(),
            20,
        );

        let handle = fx.widget.spawn_clock(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(3500)).await;
        handle.abort();
        let _ = handle.await;

        let ticks: Vec<_> = fx
            .display
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Shown::Clock(text) => Some(text),
                _ => None,
            })
            .collect();

        assert!(ticks.len() >= 3, "got {} ticks", ticks.len());
        assert!(ticks.iter().all(|t| t.len() == 8 && t.matches(':').count() == 2));
    }
}
