//! reqwest-backed client for the diet chart backend.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::{GenerationError, ServiceError};
use crate::plan::{DietChart, validate_weekly_plan};
use crate::profile::{PrakritiAttributes, Profile};

use super::{DoshaClassifier, PatientStore, PlanGenerator, SaveReceipt};

const GENERATE_PATH: &str = "/generate-diet-chart";
const PREDICT_PATH: &str = "/predict";
const SAVE_PATH: &str = "/save-patient";

/// Talks to the backend over HTTP. One instance serves all three endpoints.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl PlanGenerator for HttpBackend {
    async fn generate(
        &self,
        profile: &Profile,
        cancel: CancellationToken,
    ) -> Result<DietChart, GenerationError> {
        let url = self.url(GENERATE_PATH);
        debug!(url = %url, "Requesting diet chart");

        let exchange = async {
            let response = self
                .client
                .post(&url)
                .header(ACCEPT, "application/json")
                .json(profile)
                .send()
                .await
                .map_err(|e| GenerationError::NetworkUnavailable(e.to_string()))?;

            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| GenerationError::NetworkUnavailable(e.to_string()))?;

            decode_generation(status, &body)
        };

        // Dropping `exchange` aborts the in-flight request.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenerationError::Cancelled),
            result = exchange => result,
        }
    }
}

#[async_trait]
impl DoshaClassifier for HttpBackend {
    async fn classify(&self, attributes: &PrakritiAttributes) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(self.url(PREDICT_PATH))
            .json(attributes)
            .send()
            .await
            .map_err(|e| network("predict", e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| network("predict", e))?;

        if !status.is_success() {
            return Err(server("predict", status, &body));
        }

        let prediction: PredictBody =
            serde_json::from_slice(&body).map_err(|e| ServiceError::InvalidResponse {
                endpoint: "predict".to_string(),
                reason: e.to_string(),
            })?;

        prediction
            .dosha
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| ServiceError::InvalidResponse {
                endpoint: "predict".to_string(),
                reason: "response has no dosha".to_string(),
            })
    }
}

#[async_trait]
impl PatientStore for HttpBackend {
    async fn save(
        &self,
        profile: &Profile,
        chart: Option<&DietChart>,
    ) -> Result<SaveReceipt, ServiceError> {
        let body = patient_document(profile, chart).map_err(|e| ServiceError::InvalidResponse {
            endpoint: "save-patient".to_string(),
            reason: format!("cannot encode patient: {e}"),
        })?;

        let response = self
            .client
            .post(self.url(SAVE_PATH))
            .json(&body)
            .send()
            .await
            .map_err(|e| network("save-patient", e))?;

        let status = response.status();
        let raw = response
            .bytes()
            .await
            .map_err(|e| network("save-patient", e))?;

        if !status.is_success() {
            return Err(server("save-patient", status, &raw));
        }

        serde_json::from_slice(&raw).map_err(|e| ServiceError::InvalidResponse {
            endpoint: "save-patient".to_string(),
            reason: e.to_string(),
        })
    }
}

/// The stored document: the profile's own fields plus `dietChart`.
pub fn patient_document(
    profile: &Profile,
    chart: Option<&DietChart>,
) -> Result<serde_json::Value, serde_json::Error> {
    let mut document = serde_json::to_value(profile)?;
    if let (Some(object), Some(chart)) = (document.as_object_mut(), chart) {
        object.insert("dietChart".to_string(), serde_json::to_value(chart)?);
    }
    Ok(document)
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    #[serde(rename = "dietChart")]
    diet_chart: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PredictBody {
    dosha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Map a generation response onto a chart or an attempt failure.
pub fn decode_generation(status: StatusCode, body: &[u8]) -> Result<DietChart, GenerationError> {
    if !status.is_success() {
        return Err(GenerationError::ServerError {
            status: status.as_u16(),
            message: error_message(status, body),
        });
    }

    let envelope: GenerateBody = serde_json::from_slice(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("body is not JSON: {e}")))?;

    let raw = envelope
        .diet_chart
        .ok_or_else(|| GenerationError::InvalidResponse("response has no dietChart".into()))?;

    let chart: DietChart = serde_json::from_value(raw)
        .map_err(|e| GenerationError::InvalidResponse(format!("malformed dietChart: {e}")))?;

    validate_weekly_plan(&chart).map_err(|violation| {
        warn!(%violation, "Generated chart failed validation");
        GenerationError::InvalidResponse(violation.to_string())
    })?;

    Ok(chart)
}

fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Server error: {}", status.as_u16()))
}

fn network(endpoint: &str, error: reqwest::Error) -> ServiceError {
    ServiceError::Network {
        endpoint: endpoint.to_string(),
        reason: error.to_string(),
    }
}

fn server(endpoint: &str, status: StatusCode, body: &[u8]) -> ServiceError {
    ServiceError::Server {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message: error_message(status, body),
    }
}
