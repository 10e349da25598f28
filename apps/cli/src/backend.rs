//! Backend selection for commands.

use async_trait::async_trait;
use pricecast_core::{
    CoefficientSet, ForecastBackend, InProcessBackend, LatestData, PredictionRequest, PredictionResult,
};
use pricecast_server::{CsvHistorySource, HistorySource};

use crate::client::HttpBackend;

/// Where commands send their requests.
#[derive(Debug, Clone)]
pub enum Backend {
    /// The HTTP service.
    Remote(HttpBackend),
    /// In-process evaluation against a compiled CSV.
    Local(InProcessBackend),
}

impl Backend {
    /// Builds the backend from the global flags.
    pub fn from_args(api_url: &str, offline: bool, data: &std::path::Path) -> anyhow::Result<Self> {
        if offline {
            let history = CsvHistorySource::new(data).load()?;
            Ok(Self::Local(InProcessBackend::new(history)))
        } else {
            Ok(Self::Remote(HttpBackend::new(api_url)?))
        }
    }

    pub async fn default_coefficients(&self) -> anyhow::Result<CoefficientSet> {
        match self {
            Self::Remote(http) => Ok(http.default_coefficients().await?),
            Self::Local(_) => Ok(CoefficientSet::model_defaults()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Remote(http) => http.base_url().to_string(),
            Self::Local(_) => "offline".to_string(),
        }
    }
}

#[async_trait]
impl ForecastBackend for Backend {
    async fn health(&self) -> pricecast_core::Result<()> {
        match self {
            Self::Remote(http) => http.health().await,
            Self::Local(local) => local.health().await,
        }
    }

    async fn latest_data(&self) -> pricecast_core::Result<LatestData> {
        match self {
            Self::Remote(http) => http.latest_data().await,
            Self::Local(local) => local.latest_data().await,
        }
    }

    async fn predict(&self, request: &PredictionRequest) -> pricecast_core::Result<PredictionResult> {
        match self {
            Self::Remote(http) => http.predict(request).await,
            Self::Local(local) => local.predict(request).await,
        }
    }
}
