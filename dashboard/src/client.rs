//! Serving API Client
//!
//! HTTP client for the banknote authentication API.

use std::time::Duration;

use serde::Deserialize;

/// API client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

// Response types

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub index: usize,
    pub prediction: i64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictFileResponse {
    pub filename: String,
    pub predictions: Vec<Prediction>,
    pub total_samples: usize,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub models_loaded: bool,
    pub expected_columns: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

/// Anything that can score an uploaded CSV
pub trait PredictionService {
    async fn predict_file(&self, filename: &str, contents: Vec<u8>) -> Result<PredictFileResponse, ClientError>;
}

/// Serving API client
pub struct ApiClient {
    config: ApiConfig,
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create new API client
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        Ok(Self { config, http_client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http_client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        parse_response(response).await
    }
}

impl PredictionService for ApiClient {
    async fn predict_file(&self, filename: &str, contents: Vec<u8>) -> Result<PredictFileResponse, ClientError> {
        let url = self.url("/predict_file");
        log::info!("Uploading {} ({} bytes) to {}", filename, contents.len(), url);

        let part = reqwest::multipart::Part::bytes(contents)
            .file_name(filename.to_string())
            .mime_str("text/csv")
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self.http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        parse_response(response).await
    }
}

async fn parse_response<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return response.json().await
            .map_err(|e| ClientError::ParseError(e.to_string()));
    }

    let error_text = response.text().await.unwrap_or_default();
    log::error!("API request failed ({}): {}", status.as_u16(), error_text);
    match serde_json::from_str::<ErrorResponse>(&error_text) {
        Ok(body) => Err(ClientError::ServerError {
            status: body.status,
            message: Some(body.error),
        }),
        Err(_) => Err(ClientError::ServerError {
            status: status.as_u16(),
            message: None,
        }),
    }
}

/// API client errors
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    NetworkError(String),
    ServerError { status: u16, message: Option<String> },
    ParseError(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError(e) => write!(f, "Connection error: {}", e),
            Self::ServerError { status, message: Some(msg) } => write!(f, "API error ({}): {}", status, msg),
            Self::ServerError { status, message: None } => write!(f, "API error: {}", status),
            Self::ParseError(e) => write!(f, "Invalid API response: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}
