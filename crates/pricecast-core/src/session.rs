//! Drives a [`DashboardState`] against a [`ForecastBackend`].

use tracing::{debug, info, warn};

use crate::backend::ForecastBackend;
use crate::dashboard::{Command, DashboardState, Event, reduce};

/// A single-user dashboard session.
///
/// Each dispatched event runs to completion: commands produced by the state
/// machine are executed one at a time and their outcomes fed back in until
/// nothing is left to do. Backend failures turn into failure events.
pub struct Session<B> {
    backend: B,
    state: DashboardState,
}

impl<B: ForecastBackend> Session<B> {
    pub fn new(backend: B) -> Self {
        Self::with_state(backend, DashboardState::new())
    }

    pub fn with_state(backend: B, state: DashboardState) -> Self {
        Self { backend, state }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Probes the service and computes the first prediction.
    pub async fn start(&mut self) -> &DashboardState {
        self.dispatch(Event::Started).await;
        self.dispatch(Event::Recalculate).await
    }

    /// Applies an event and runs every follow-up command.
    pub async fn dispatch(&mut self, event: Event) -> &DashboardState {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            let state = std::mem::take(&mut self.state);
            let (state, command) = reduce(state, event);
            self.state = state;
            if let Some(command) = command {
                next = Some(self.execute(command).await);
            }
        }
        &self.state
    }

    async fn execute(&self, command: Command) -> Event {
        match command {
            Command::CheckHealth => match self.backend.health().await {
                Ok(()) => {
                    info!("Prediction service is healthy");
                    Event::HealthChecked { ok: true }
                }
                Err(e) => {
                    warn!(error = %e, "Health check failed");
                    Event::HealthChecked { ok: false }
                }
            },
            Command::FetchLatestData => match self.backend.latest_data().await {
                Ok(data) => Event::ExternalDataLoaded(data),
                Err(e) => {
                    warn!(error = %e, "Failed to load latest data");
                    Event::ExternalDataFailed { message: e.to_string() }
                }
            },
            Command::RequestPrediction { request_id, request } => {
                debug!(request_id, "Requesting prediction");
                match self.backend.predict(&request).await {
                    Ok(result) => Event::PredictionSucceeded { request_id, result },
                    Err(e) => {
                        warn!(request_id, error = %e, "Prediction failed");
                        Event::PredictionFailed { request_id, message: e.to_string() }
                    }
                }
            }
        }
    }
}
