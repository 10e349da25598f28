//! Backend seam used by the dashboard session.

use async_trait::async_trait;

use crate::engine::{self, History, PredictionRequest};
use crate::error::Result;
use crate::model::PredictionResult;
use crate::normalizer::LatestData;

/// The services the dashboard talks to.
///
/// Implemented over HTTP by the CLI and in-process by [`InProcessBackend`].
#[async_trait]
pub trait ForecastBackend: Send + Sync {
    /// Liveness probe.
    async fn health(&self) -> Result<()>;

    /// Latest per-category data for the normalizer.
    async fn latest_data(&self) -> Result<LatestData>;

    /// Evaluates the model for a validated request.
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult>;
}

/// Evaluates the model directly against a fixed history.
#[derive(Debug, Clone, Default)]
pub struct InProcessBackend {
    history: History,
}

impl InProcessBackend {
    pub fn new(history: History) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

#[async_trait]
impl ForecastBackend for InProcessBackend {
    async fn health(&self) -> Result<()> {
        Ok(())
    }

    async fn latest_data(&self) -> Result<LatestData> {
        Ok(self.history.latest_data())
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        engine::predict(request, &self.history).map(|report| report.result)
    }
}
