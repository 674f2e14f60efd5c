use crate::config::ApiSettings;
use crate::models::{
    AutomatedSearchResponse, HealthStatus, ImageSearchResponse, ImageUpload, SearchConfiguration,
    TextSearchResponse, ViennaClassification, ViennaPredictions,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur when calling the search service
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No image uploaded")]
    EmptyUpload,

    #[error("Search text is empty")]
    BlankQuery,

    #[error("Upload has an unusable content type: {0}")]
    InvalidUpload(String),

    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("API Error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether the error was raised before any request left the console
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            ApiError::EmptyUpload | ApiError::BlankQuery | ApiError::InvalidUpload(_)
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Connection(e) if e.is_timeout())
    }
}

/// Time bounds for each kind of call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApiTimeouts {
    pub image: Duration,
    pub automated: Duration,
    pub text: Duration,
    pub vienna: Duration,
    pub health: Duration,
}

impl Default for ApiTimeouts {
    fn default() -> Self {
        Self::from_settings(&ApiSettings::default())
    }
}

impl ApiTimeouts {
    pub fn from_settings(api: &ApiSettings) -> Self {
        Self {
            image: Duration::from_secs(api.image_timeout_secs),
            automated: Duration::from_secs(api.automated_timeout_secs),
            text: Duration::from_secs(api.text_timeout_secs),
            vienna: Duration::from_secs(api.vienna_timeout_secs),
            health: Duration::from_secs(api.health_timeout_secs),
        }
    }
}

/// Trademark search API client
///
/// All calls share one base endpoint and differ only in path, payload
/// shape and time bound. Nothing is retried: a failed call is reported
/// and the user repeats the action.
pub struct SearchApiClient {
    base_url: String,
    client: Client,
    timeouts: ApiTimeouts,
}

impl SearchApiClient {
    /// Create a new search API client
    pub fn new(base_url: impl Into<String>, timeouts: ApiTimeouts) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            timeouts,
        })
    }

    pub fn from_settings(api: &ApiSettings) -> Result<Self, ApiError> {
        Self::new(api.base_url.clone(), ApiTimeouts::from_settings(api))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Single-weight similarity search for an uploaded image
    pub async fn search_image(
        &self,
        config: &SearchConfiguration,
        image: &ImageUpload,
    ) -> Result<ImageSearchResponse, ApiError> {
        let form = image_form(image)?;
        let url = self.endpoint(
            "/search/image",
            &[
                ("top_n", config.result_count.to_string()),
                ("semantic_weight", config.semantic_weight.to_string()),
                ("use_ocr", config.ocr_enabled.to_string()),
                ("candidate_pool", config.candidate_pool.to_string()),
            ],
        );

        let request = self.client.post(&url).multipart(form).timeout(self.timeouts.image);
        let response = self.send("/search/image", request).await?;

        read_json(response).await
    }

    /// Batch search over the service's fixed weight set
    ///
    /// The service iterates its own weights, so `semantic_weight` is not sent.
    pub async fn search_automated(
        &self,
        config: &SearchConfiguration,
        image: &ImageUpload,
    ) -> Result<AutomatedSearchResponse, ApiError> {
        let form = image_form(image)?;
        let url = self.endpoint(
            "/search/automated",
            &[
                ("top_n", config.result_count.to_string()),
                ("use_ocr", config.ocr_enabled.to_string()),
                ("candidate_pool", config.candidate_pool.to_string()),
            ],
        );

        let request = self
            .client
            .post(&url)
            .multipart(form)
            .timeout(self.timeouts.automated);
        let response = self.send("/search/automated", request).await?;

        read_json(response).await
    }

    /// Text search; blank queries never reach the service
    pub async fn search_text(
        &self,
        config: &SearchConfiguration,
        query: &str,
    ) -> Result<TextSearchResponse, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("Rejected blank text query");
            return Err(ApiError::BlankQuery);
        }

        let url = self.endpoint(
            "/search/text",
            &[
                ("query", query.to_string()),
                ("top_n", config.result_count.to_string()),
            ],
        );

        let request = self.client.get(&url).timeout(self.timeouts.text);
        let response = self.send("/search/text", request).await?;

        read_json(response).await
    }

    /// Vienna class predictions above the configured probability
    pub async fn classify_vienna(
        &self,
        config: &SearchConfiguration,
        image: &ImageUpload,
    ) -> Result<ViennaPredictions, ApiError> {
        let form = image_form(image)?;
        let url = self.endpoint(
            "/predict/vienna-classes/",
            &[("threshold_probability", config.vienna_threshold.to_string())],
        );

        let request = self.client.post(&url).multipart(form).timeout(self.timeouts.vienna);
        let response = self.send("/predict/vienna-classes/", request).await?;

        let raw: Vec<Value> = read_json(response).await?;
        let predictions = raw
            .iter()
            .map(|value| serde_json::from_value::<ViennaClassification>(value.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse prediction: {}", e)))?;

        Ok(ViennaPredictions { predictions, raw })
    }

    /// Probe the service once; every failure collapses into a non-healthy status
    pub async fn health(&self) -> HealthStatus {
        let url = self.endpoint("/health", &[]);

        let response = match self.client.get(&url).timeout(self.timeouts.health).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Health check could not reach {}: {}", self.base_url, e);
                return HealthStatus::Unreachable(e.to_string());
            }
        };

        if response.status() != StatusCode::OK {
            tracing::warn!("Health check returned {}", response.status());
            return HealthStatus::Unhealthy(response.status().as_u16());
        }

        match response.json::<Value>().await {
            Ok(payload) => HealthStatus::Healthy(payload),
            Err(e) => {
                tracing::warn!("Health check payload unreadable: {}", e);
                HealthStatus::Unreachable(e.to_string())
            }
        }
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}{}", self.base_url.trim_end_matches('/'), path);

        if !params.is_empty() {
            let query = params
                .iter()
                .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }

        url
    }

    async fn send(
        &self,
        path: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Response, ApiError> {
        let started = Instant::now();

        match request.send().await {
            Ok(response) => {
                tracing::info!(
                    "{} answered {} in {}ms",
                    path,
                    response.status(),
                    started.elapsed().as_millis()
                );
                Ok(response)
            }
            Err(e) => {
                tracing::error!(
                    "{} failed after {}ms (timeout: {}): {}",
                    path,
                    started.elapsed().as_millis(),
                    e.is_timeout(),
                    e
                );
                Err(ApiError::Connection(e))
            }
        }
    }
}

fn image_form(image: &ImageUpload) -> Result<Form, ApiError> {
    if image.is_empty() {
        return Err(ApiError::EmptyUpload);
    }

    let mut part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
    if let Some(content_type) = &image.content_type {
        part = part
            .mime_str(content_type)
            .map_err(|_| ApiError::InvalidUpload(content_type.clone()))?;
    }

    Ok(Form::new().part("file", part))
}

/// Read the body, surfacing any non-2xx status together with the raw text
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
}
