//! Session driver behaviour against scripted backends.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pricecast_core::{
    Category, CostAllocation, Event, ForecastBackend, ForecastError, HealthStatus, History,
    InProcessBackend, LatestData, PredictionRequest, PredictionResult, Result, Session,
};

/// Backend whose replies are fixed up front.
struct ScriptedBackend {
    healthy: bool,
    latest: Option<LatestData>,
    predictions: AtomicUsize,
    last_request: Mutex<Option<PredictionRequest>>,
    mean: f64,
}

impl ScriptedBackend {
    fn healthy(mean: f64) -> Self {
        Self {
            healthy: true,
            latest: Some(LatestData { labor: 3.0, energy: 1.0, ..LatestData::default() }),
            predictions: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            mean,
        }
    }

    fn offline() -> Self {
        Self { healthy: false, latest: None, ..Self::healthy(0.0) }
    }
}

#[async_trait]
impl ForecastBackend for ScriptedBackend {
    async fn health(&self) -> Result<()> {
        if self.healthy { Ok(()) } else { Err(ForecastError::Backend("connection refused".to_string())) }
    }

    async fn latest_data(&self) -> Result<LatestData> {
        self.latest.clone().ok_or_else(|| ForecastError::Backend("HTTP 500".to_string()))
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        self.predictions.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(*request);
        if self.healthy {
            Ok(PredictionResult::from_mean(self.mean))
        } else {
            Err(ForecastError::Backend("connection refused".to_string()))
        }
    }
}

#[tokio::test]
async fn test_start_checks_health_and_predicts() {
    let mut session = Session::new(ScriptedBackend::healthy(3.5));
    let state = session.start().await;
    assert_eq!(state.health, HealthStatus::Ok);
    assert_eq!(state.prediction.map(|p| p.mean), Some(3.5));
    assert_eq!(state.summary.as_ref().unwrap().price_label(), "Medium (2-8%)");
}

#[tokio::test]
async fn test_offline_backend_fails_soft() {
    let mut session = Session::new(ScriptedBackend::offline());
    let state = session.start().await;
    assert_eq!(state.health, HealthStatus::Error);
    assert!(state.prediction.is_none());
    assert!(state.status_message.as_deref().unwrap().contains("connection refused"));

    let state = session.dispatch(Event::ExternalDataRequested).await;
    assert!(!state.loading_external);
}

#[tokio::test]
async fn test_invalid_allocation_never_reaches_backend() {
    let mut session = Session::new(ScriptedBackend::healthy(1.0));
    session.dispatch(Event::AllocationChanged { category: Category::Labor, value: 55.0 }).await;
    assert_eq!(session.backend().predictions.load(Ordering::SeqCst), 0);
    assert_eq!(session.state().allocation_error, Some(135.0));
}

#[tokio::test]
async fn test_external_data_flows_into_prediction() {
    let mut session = Session::new(ScriptedBackend::healthy(2.0));
    session.start().await;
    let state = session.dispatch(Event::ExternalDataRequested).await;
    assert_eq!(state.allocation, CostAllocation::new(75.0, 0.0, 0.0, 25.0, 0.0));
    assert!(!state.loading_external);

    let sent = session.backend().last_request.lock().unwrap().unwrap();
    assert_eq!(sent.allocation.labor, 75.0);
    assert_eq!(session.backend().predictions.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_in_process_backend_round() {
    let history = History::new().with_series(Category::Labor, vec![1.0, 2.0, 3.0, 4.0]);
    let mut session = Session::new(InProcessBackend::new(history));
    session.start().await;
    let state = session.dispatch(Event::AllocationChanged { category: Category::Labor, value: 20.0 }).await;
    let prediction = state.prediction.unwrap();
    assert!(prediction.is_consistent());
    assert!(state.summary.is_some());
    assert_eq!(state.summary.as_ref().unwrap().trend_label(), "Holding steady");
}
