//! Dashboard state machine.
//!
//! All form state lives in [`DashboardState`] and changes only through
//! [`reduce`], which takes an [`Event`] and returns the next state plus at
//! most one [`Command`] for the caller to run. Commands that reach a backend
//! come back as events, so the whole dashboard can be exercised without a UI
//! or a network.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocation::CostAllocation;
use crate::category::{Category, Lag};
use crate::coefficients::CoefficientSet;
use crate::engine::PredictionRequest;
use crate::levels::{Level, level_to_numeric};
use crate::model::PredictionResult;
use crate::normalizer::{LatestData, normalize};
use crate::summary::{PredictionSummary, SummaryThresholds, summarize};

/// Result of the startup liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    #[default]
    Checking,
    Ok,
    Error,
}

/// Something that happened: a user edit or a backend reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Session opened; probes the service.
    Started,
    /// Re-run the prediction with the current inputs.
    Recalculate,
    AllocationChanged { category: Category, value: f64 },
    CoefficientChanged { category: Category, lag: Lag, value: f64 },
    /// A level was picked; the stored value keeps its previous sign.
    CoefficientLevelChanged { category: Category, lag: Lag, level: Level },
    CoefficientsReset,
    HealthChecked { ok: bool },
    ExternalDataRequested,
    ExternalDataLoaded(LatestData),
    ExternalDataFailed { message: String },
    PredictionSucceeded { request_id: u64, result: PredictionResult },
    PredictionFailed { request_id: u64, message: String },
}

/// Work the caller must perform and report back as an event.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CheckHealth,
    FetchLatestData,
    RequestPrediction { request_id: u64, request: PredictionRequest },
}

/// The request currently awaiting a reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingPrediction {
    pub request_id: u64,
    pub request: PredictionRequest,
}

/// In-memory dashboard session.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub allocation: CostAllocation,
    pub coefficients: CoefficientSet,
    pub prediction: Option<PredictionResult>,
    pub summary: Option<PredictionSummary>,
    /// Mean of the last applied prediction, for trend deltas.
    pub previous_mean: Option<f64>,
    /// Running total when the allocation does not add up to 100.
    pub allocation_error: Option<f64>,
    /// Last service failure shown to the user.
    pub status_message: Option<String>,
    pub health: HealthStatus,
    pub loading_external: bool,
    pub pending: Option<PendingPrediction>,
    pub thresholds: SummaryThresholds,
    next_request_id: u64,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::with_thresholds(SummaryThresholds::default())
    }

    pub fn with_thresholds(thresholds: SummaryThresholds) -> Self {
        Self {
            allocation: CostAllocation::uniform(),
            coefficients: CoefficientSet::dashboard_defaults(),
            prediction: None,
            summary: None,
            previous_mean: None,
            allocation_error: None,
            status_message: None,
            health: HealthStatus::Checking,
            loading_external: false,
            pending: None,
            thresholds,
            next_request_id: 1,
        }
    }

    /// External data can be loaded only against a healthy service, one load at a time.
    pub fn can_load_external(&self) -> bool {
        self.health == HealthStatus::Ok && !self.loading_external
    }

    fn clear_prediction(&mut self) {
        self.prediction = None;
        self.summary = None;
        self.pending = None;
    }

    /// Validates the inputs and either requests a prediction or clears the display.
    fn recalculate(&mut self) -> Option<Command> {
        match PredictionRequest::new(self.allocation, self.coefficients) {
            Ok(request) => {
                self.allocation_error = None;
                let request_id = self.next_request_id;
                self.next_request_id += 1;
                self.pending = Some(PendingPrediction { request_id, request });
                Some(Command::RequestPrediction { request_id, request })
            }
            Err(err) => {
                debug!(error = %err, "Allocation invalid, clearing prediction");
                self.allocation_error = Some(self.allocation.total());
                self.clear_prediction();
                None
            }
        }
    }

    /// Takes the pending request if `request_id` is the one in flight.
    fn settle(&mut self, request_id: u64) -> Option<PendingPrediction> {
        match self.pending {
            Some(pending) if pending.request_id == request_id => self.pending.take(),
            _ => {
                debug!(request_id, "Dropping stale prediction response");
                None
            }
        }
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies one event to the dashboard.
pub fn reduce(mut state: DashboardState, event: Event) -> (DashboardState, Option<Command>) {
    let command = match event {
        Event::Started => {
            state.health = HealthStatus::Checking;
            Some(Command::CheckHealth)
        }
        Event::Recalculate => state.recalculate(),
        Event::AllocationChanged { category, value } => {
            state.allocation.set_clamped(category, value);
            state.recalculate()
        }
        Event::CoefficientChanged { category, lag, value } => {
            if value.is_finite() {
                state.coefficients.set(category, lag, value);
            }
            state.recalculate()
        }
        Event::CoefficientLevelChanged { category, lag, level } => {
            let current = state.coefficients.get(category, lag);
            state.coefficients.set(category, lag, level_to_numeric(level, current));
            state.recalculate()
        }
        Event::CoefficientsReset => {
            state.coefficients = CoefficientSet::dashboard_defaults();
            state.recalculate()
        }
        Event::HealthChecked { ok } => {
            state.health = if ok { HealthStatus::Ok } else { HealthStatus::Error };
            if !ok {
                state.status_message = Some("Prediction service is unavailable".to_string());
            }
            None
        }
        Event::ExternalDataRequested => {
            if state.can_load_external() {
                state.loading_external = true;
                Some(Command::FetchLatestData)
            } else {
                debug!(health = ?state.health, loading = state.loading_external, "Ignoring external data request");
                None
            }
        }
        Event::ExternalDataLoaded(data) => {
            state.loading_external = false;
            state.allocation = normalize(&data);
            state.status_message = None;
            state.recalculate()
        }
        Event::ExternalDataFailed { message } => {
            state.loading_external = false;
            state.status_message = Some(format!("Failed to load external data: {}", message));
            None
        }
        Event::PredictionSucceeded { request_id, result } => {
            if let Some(pending) = state.settle(request_id) {
                let summary = summarize(
                    &result,
                    state.previous_mean,
                    &pending.request.allocation,
                    &pending.request.coefficients,
                    &state.thresholds,
                );
                state.previous_mean = Some(result.mean);
                state.prediction = Some(result);
                state.summary = Some(summary);
                state.status_message = None;
            }
            None
        }
        Event::PredictionFailed { request_id, message } => {
            if state.settle(request_id).is_some() {
                state.clear_prediction();
                state.status_message = Some(message);
            }
            None
        }
    };
    (state, command)
}
