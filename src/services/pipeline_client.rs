//! Pipeline API client.
//!
//! HTTP client for the backend that serves build and project listings. List
//! endpoints wrap their payload in a status envelope; an `ERROR` envelope is
//! surfaced as a typed error carrying the upstream message.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::models::{Build, NewProject, Project, TestResults};

/// Number of times a failed GET is retried before giving up.
const MAX_GET_RETRIES: u32 = 2;

/// Envelope wrapping every list response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Upstream verdict for the request.
    pub status: ApiStatus,

    /// Human-readable message; meaningful mainly for errors.
    #[serde(default)]
    pub message: String,

    /// The payload, when `status` is `SUCCESS`.
    pub data: Option<T>,
}

/// Upstream verdict inside an [`ApiEnvelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiStatus {
    Success,
    Error,
}

/// Pipeline API client.
#[derive(Debug, Clone)]
pub struct PipelineClient {
    client: Client,
    config: ApiConfig,
}

impl PipelineClient {
    /// Create a new client from an injected configuration.
    pub fn new(config: ApiConfig) -> Result<Self, AppError> {
        let mut headers = reqwest::header::HeaderMap::new();

        let version_value = reqwest::header::HeaderValue::from_str(&config.api_version)
            .map_err(|_| AppError::invalid_input_field("Invalid api-version value", "api_version"))?;
        headers.insert("api-version", version_value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// URL of an endpoint under the pipeline API base path.
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    /// URL of an endpoint at the server root, outside the API base path.
    /// The project delete endpoint lives there.
    fn server_url(&self, path: &str) -> String {
        format!("http://{}:{}{}", self.config.host, self.config.port, path)
    }

    /// List all builds across projects.
    pub async fn list_builds(&self) -> Result<Vec<Build>, AppError> {
        self.get_enveloped("").await
    }

    /// List all projects.
    pub async fn list_projects(&self) -> Result<Vec<Project>, AppError> {
        self.get_enveloped("/projects").await
    }

    /// Fetch the test results for one build.
    pub async fn get_test_results(&self, build_id: &str) -> Result<TestResults, AppError> {
        let endpoint = format!("/builds/{}/test-results", urlencoding::encode(build_id));
        let url = self.api_url(&endpoint);
        let response = self.get_with_retry(&url, &endpoint).await?;
        self.handle_response(response, &endpoint).await
    }

    /// Create a project.
    pub async fn create_project(&self, new_project: &NewProject) -> Result<(), AppError> {
        let endpoint = "/projects";
        let url = self.api_url(endpoint);
        let response = self.client.post(&url).json(new_project).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.response_error(response, endpoint).await)
        }
    }

    /// Delete a project on the server.
    pub async fn delete_project(&self, project_id: &str) -> Result<(), AppError> {
        let endpoint = format!("/project/{}", urlencoding::encode(project_id));
        let url = self.server_url(&endpoint);
        let response = self.client.delete(&url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.response_error(response, &endpoint).await)
        }
    }

    /// GET an enveloped list endpoint and unwrap the payload.
    async fn get_enveloped<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, AppError> {
        let url = self.api_url(endpoint);
        let response = self.get_with_retry(&url, endpoint).await?;
        let envelope: ApiEnvelope<T> = self.handle_response(response, endpoint).await?;

        match envelope.status {
            ApiStatus::Success => envelope
                .data
                .ok_or_else(|| AppError::pipeline_api("Response envelope is missing data")),
            ApiStatus::Error => Err(AppError::pipeline_api(envelope.message)),
        }
    }

    /// Send a GET, retrying transient transport failures.
    async fn get_with_retry(&self, url: &str, endpoint: &str) -> Result<Response, AppError> {
        let mut attempt = 0;
        loop {
            match self.client.get(url).send().await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < MAX_GET_RETRIES => {
                    attempt += 1;
                    log::warn!(
                        "GET {} failed ({}), retry {}/{}",
                        endpoint,
                        err,
                        attempt,
                        MAX_GET_RETRIES
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Parse a response body or map the failure status to an error.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<T, AppError> {
        if response.status().is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| AppError::internal(format!("Failed to parse response: {}", e)))
        } else {
            Err(self.response_error(response, endpoint).await)
        }
    }

    /// Build the error for a non-success response.
    async fn response_error(&self, response: Response, endpoint: &str) -> AppError {
        let status = response.status();
        let status_code = status.as_u16();
        let body = response.text().await.unwrap_or_default();

        // The server reports errors as an envelope with a message field.
        let body_message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str().map(String::from)));

        let message = match (status, body_message) {
            (StatusCode::NOT_FOUND, _) => "Resource not found".to_string(),
            (_, Some(msg)) if !msg.is_empty() => msg,
            _ => format!("Request failed ({})", status_code),
        };

        AppError::pipeline_api_full(message, status_code, endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PipelineClient {
        PipelineClient::new(ApiConfig::default()).unwrap()
    }

    #[test]
    fn test_api_url_uses_base_path() {
        let client = client();
        assert_eq!(
            client.api_url("/projects"),
            "http://localhost:8000/api/pipeline/projects"
        );
        assert_eq!(client.api_url(""), "http://localhost:8000/api/pipeline");
    }

    #[test]
    fn test_server_url_skips_base_path() {
        let client = client();
        assert_eq!(
            client.server_url("/project/p1"),
            "http://localhost:8000/project/p1"
        );
    }

    #[test]
    fn test_envelope_success_deserializes() {
        let json = r#"{"status": "SUCCESS", "message": "ok", "data": [1, 2, 3]}"#;
        let envelope: ApiEnvelope<Vec<i64>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, ApiStatus::Success);
        assert_eq!(envelope.data, Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_envelope_error_without_data() {
        let json = r#"{"status": "ERROR", "message": "pipeline backend unavailable", "data": null}"#;
        let envelope: ApiEnvelope<Vec<i64>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, ApiStatus::Error);
        assert_eq!(envelope.message, "pipeline backend unavailable");
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_build_id_is_percent_encoded() {
        let encoded = urlencoding::encode("build 001/a");
        assert_eq!(encoded, "build%20001%2Fa");
    }

    #[test]
    fn test_rejects_invalid_api_version_header() {
        let config = ApiConfig {
            api_version: "1.0\n".to_string(),
            ..ApiConfig::default()
        };
        assert!(PipelineClient::new(config).is_err());
    }
}
