//! Resolve → fetch → present, wrapped in a flat bounded retry loop.
//!
//! Every failed attempt re-runs the whole pipeline from the resolver, with no
//! delay between attempts. `retries_remaining = n` means at most `n + 1`
//! attempts; the failure message is the one of the last attempt. A coordinate
//! query with a non-finite component fails before the first attempt.

use std::sync::Arc;

use crate::{
    error::LookupError,
    model::{DisplayFields, LocationQuery, LookupOutcome},
    presenter::Presenter,
    provider::{Forecaster, Geocoder},
    resolver::Resolver,
};

pub const DEFAULT_RETRIES: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    Resolving,
    Fetching,
    Presenting,
    Retrying,
    Succeeded,
    Failed,
}

impl LookupState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LookupState::Succeeded | LookupState::Failed)
    }
}

#[derive(Debug, Clone)]
pub struct WeatherLookupWorkflow {
    resolver: Resolver,
    forecaster: Arc<dyn Forecaster>,
    presenter: Presenter,
    retries: u32,
}

impl WeatherLookupWorkflow {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        forecaster: Arc<dyn Forecaster>,
        presenter: Presenter,
    ) -> Self {
        Self {
            resolver: Resolver::new(geocoder),
            forecaster,
            presenter,
            retries: DEFAULT_RETRIES,
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    /// Lookup with the configured retry budget.
    pub async fn lookup(&self, query: &LocationQuery) -> LookupOutcome {
        self.lookup_with_retries(query, self.retries).await
    }

    pub async fn lookup_with_retries(
        &self,
        query: &LocationQuery,
        retries_remaining: u32,
    ) -> LookupOutcome {
        if let LocationQuery::Coordinates { coordinates, .. } = query {
            if !coordinates.is_valid() {
                trace_state(LookupState::Failed, 0);
                tracing::warn!(%coordinates, "rejecting non-finite coordinates");
                return LookupOutcome::Failure {
                    message: format!("Invalid coordinates: {coordinates}"),
                    attempts: 0,
                };
            }
        }

        let mut retries_left = retries_remaining;
        let mut attempts = 0;

        loop {
            attempts += 1;

            let last_error = match self.attempt(query).await {
                Ok(fields) => {
                    trace_state(LookupState::Succeeded, attempts);
                    tracing::info!(city = %fields.city, attempts, "weather lookup succeeded");
                    return LookupOutcome::Success { fields, attempts };
                }
                Err(err) => err,
            };

            if retries_left == 0 {
                trace_state(LookupState::Failed, attempts);
                tracing::warn!(
                    city = query.label(),
                    attempts,
                    "weather lookup failed: {last_error}"
                );
                return LookupOutcome::Failure {
                    message: last_error.to_string(),
                    attempts,
                };
            }

            retries_left -= 1;
            trace_state(LookupState::Retrying, attempts);
            tracing::warn!("Attempt {attempts} failed: {last_error}. Retries left: {retries_left}");
        }
    }

    async fn attempt(&self, query: &LocationQuery) -> Result<DisplayFields, LookupError> {
        trace_state(LookupState::Resolving, 0);
        let coordinates = self.resolver.resolve(query).await?;

        trace_state(LookupState::Fetching, 0);
        let (weather, sun) = self.forecaster.fetch_weather(coordinates).await?;

        trace_state(LookupState::Presenting, 0);
        Ok(self.presenter.present(query.label(), &weather, &sun))
    }
}

fn trace_state(state: LookupState, attempts: u32) {
    if state.is_terminal() || state == LookupState::Retrying {
        tracing::debug!(?state, attempts, "lookup transition");
    } else {
        tracing::trace!(?state, "lookup transition");
    }
}
