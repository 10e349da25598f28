//! HTTP client for the Pricecast API.

use std::time::Duration;

use async_trait::async_trait;
use pricecast_core::{
    CoefficientSet, ForecastBackend, ForecastError, LatestData, PredictionRequest, PredictionResult,
};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors talking to the prediction service.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response
    #[error("Service error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl From<ClientError> for ForecastError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api { message, .. } => Self::Backend(message),
            ClientError::Http(e) => Self::Backend(e.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: String,
}

/// [`ForecastBackend`] over the JSON API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorPayload>(&body)
            .map(|payload| payload.error)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("request failed").to_string());
        Err(ClientError::Api { status: status.as_u16(), message })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        debug!(url = %self.url(path), "GET");
        let response = self.client.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    /// Fetches the model's default coefficients.
    pub async fn default_coefficients(&self) -> Result<CoefficientSet, ClientError> {
        self.get_json("/api/coefficients/default").await
    }
}

#[async_trait]
impl ForecastBackend for HttpBackend {
    async fn health(&self) -> pricecast_core::Result<()> {
        let _: serde_json::Value = self.get_json("/api/health").await?;
        Ok(())
    }

    async fn latest_data(&self) -> pricecast_core::Result<LatestData> {
        Ok(self.get_json("/api/data/latest").await?)
    }

    async fn predict(&self, request: &PredictionRequest) -> pricecast_core::Result<PredictionResult> {
        let url = self.url("/api/predict");
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .json(&request.to_body())
            .send()
            .await
            .map_err(ClientError::from)?;
        Ok(Self::decode(response).await?)
    }
}
