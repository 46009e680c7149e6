use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::types::{
    AnalyzeCaseRequest, EvidenceUploadResponse, HealthStatus, PayloadField, PrecedentRequest,
    RiskRequest, StrengthRequest, TimelineRequest,
};
use crate::config::{EndpointConfig, RequestConfig, ServiceConfig};
use crate::error::{ServiceError, ServiceResult};

/// The remote analysis API, one method per endpoint.
///
/// Stage methods return the raw payload field from the response envelope,
/// undecoded. Every method makes exactly one attempt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Stage 1: classify the case text.
    async fn analyze_case(&self, request: &AnalyzeCaseRequest) -> ServiceResult<Value>;

    /// Stage 2: risk assessment.
    async fn calculate_risk(&self, request: &RiskRequest) -> ServiceResult<Value>;

    /// Stage 3: case strength assessment.
    async fn case_strength(&self, request: &StrengthRequest) -> ServiceResult<Value>;

    /// Stage 4: similar precedents.
    async fn find_precedents(&self, request: &PrecedentRequest) -> ServiceResult<Value>;

    /// Stage 5: expected procedural timeline.
    async fn generate_timeline(&self, request: &TimelineRequest) -> ServiceResult<Value>;

    /// Upload one evidence file for analysis.
    async fn upload_evidence(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> ServiceResult<EvidenceUploadResponse>;

    /// Probe the service and its model backend.
    async fn health(&self) -> ServiceResult<HealthStatus>;
}

/// HTTP client for the analysis service
#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    endpoints: EndpointConfig,
    request_config: RequestConfig,
}

impl AnalysisClient {
    /// Create a new analysis service client
    pub fn new(
        config: &ServiceConfig,
        endpoints: EndpointConfig,
        request_config: RequestConfig,
    ) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(ServiceError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            endpoints,
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout {
                timeout_ms: self.request_config.timeout_ms,
            }
        } else if e.is_connect() {
            ServiceError::Unavailable {
                message: e.to_string(),
            }
        } else {
            ServiceError::Http(e)
        }
    }

    /// Send a request and parse the JSON body of a successful response.
    async fn execute(&self, builder: RequestBuilder, endpoint: &str) -> ServiceResult<Value> {
        let start = Instant::now();

        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(
                endpoint = %endpoint,
                status = status.as_u16(),
                latency_ms = start.elapsed().as_millis(),
                "Analysis service returned an error status"
            );
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse {
                message: format!("Failed to parse response from {}: {}", endpoint, e),
            })?;

        info!(
            endpoint = %endpoint,
            latency_ms = start.elapsed().as_millis(),
            "Analysis service call succeeded"
        );

        Ok(body)
    }

    async fn post_stage<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        field: PayloadField,
    ) -> ServiceResult<Value> {
        debug!(endpoint = %path, field = field.as_str(), "Calling analysis endpoint");

        let builder = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .json(body);

        let envelope = self.execute(builder, path).await?;
        Ok(field.extract(envelope))
    }
}

#[async_trait]
impl AnalysisService for AnalysisClient {
    async fn analyze_case(&self, request: &AnalyzeCaseRequest) -> ServiceResult<Value> {
        self.post_stage(&self.endpoints.analyze, request, PayloadField::Analysis)
            .await
    }

    async fn calculate_risk(&self, request: &RiskRequest) -> ServiceResult<Value> {
        self.post_stage(&self.endpoints.risk, request, PayloadField::RiskAnalysis)
            .await
    }

    async fn case_strength(&self, request: &StrengthRequest) -> ServiceResult<Value> {
        self.post_stage(
            &self.endpoints.strength,
            request,
            PayloadField::StrengthAnalysis,
        )
        .await
    }

    async fn find_precedents(&self, request: &PrecedentRequest) -> ServiceResult<Value> {
        self.post_stage(&self.endpoints.precedents, request, PayloadField::Precedents)
            .await
    }

    async fn generate_timeline(&self, request: &TimelineRequest) -> ServiceResult<Value> {
        self.post_stage(&self.endpoints.timeline, request, PayloadField::Timeline)
            .await
    }

    async fn upload_evidence(
        &self,
        filename: &str,
        content: Vec<u8>,
    ) -> ServiceResult<EvidenceUploadResponse> {
        info!(filename = %filename, bytes = content.len(), "Uploading evidence");

        let part = multipart::Part::bytes(content).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);
        let builder = self
            .client
            .post(self.url(&self.endpoints.evidence))
            .multipart(form);

        let body = self.execute(builder, &self.endpoints.evidence).await?;
        serde_json::from_value(body).map_err(|e| ServiceError::InvalidResponse {
            message: format!("Failed to parse evidence upload response: {}", e),
        })
    }

    async fn health(&self) -> ServiceResult<HealthStatus> {
        let builder = self.client.get(self.url(&self.endpoints.health));
        let body = self.execute(builder, &self.endpoints.health).await?;
        serde_json::from_value(body).map_err(|e| ServiceError::InvalidResponse {
            message: format!("Failed to parse health response: {}", e),
        })
    }
}
