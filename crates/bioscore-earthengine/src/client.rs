use crate::auth::{ServiceAccountCredentials, TokenSource};
use crate::expr::Expr;
use crate::ports::EarthEngine;
use async_trait::async_trait;
use bioscore_core::error::{BioscoreError, Result};
use serde::Deserialize;

/// Earth Engine REST client
pub struct EarthEngineClient {
    /// Base URL of the REST API (e.g., "https://earthengine.googleapis.com/v1")
    base_url: String,

    /// Cloud project billed for computations
    project: String,

    /// HTTP client
    http: reqwest::Client,

    tokens: TokenSource,
}

impl EarthEngineClient {
    /// Authenticate with a service account and return a ready client
    ///
    /// The project falls back to the key's `project_id` when none is given.
    pub async fn authenticate(
        credentials: ServiceAccountCredentials,
        base_url: impl Into<String>,
        project: Option<String>,
    ) -> Result<Self> {
        let project = project.or_else(|| credentials.project_id.clone()).ok_or_else(|| {
            BioscoreError::ConfigMissing { key: "earthengine_project".to_string() }
        })?;

        tracing::info!("Authenticating to Google Earth Engine...");

        let http = reqwest::Client::new();
        let tokens = TokenSource::new(credentials, http.clone());
        tokens.access_token().await?;

        tracing::info!(project = %project, "Authenticated to Google Earth Engine.");

        Ok(Self { base_url: base_url.into(), project, http, tokens })
    }

    /// Authenticate with the key found in the `ee_service_account` variable
    pub async fn from_env(base_url: impl Into<String>, project: Option<String>) -> Result<Self> {
        let credentials = ServiceAccountCredentials::from_env()?;
        Self::authenticate(credentials, base_url, project).await
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn service_account(&self) -> &str {
        &self.tokens.credentials().client_email
    }

    fn compute_url(&self) -> String {
        compute_url(&self.base_url, &self.project)
    }
}

fn compute_url(base_url: &str, project: &str) -> String {
    format!("{}/projects/{}/value:compute", base_url.trim_end_matches('/'), project)
}

#[async_trait]
impl EarthEngine for EarthEngineClient {
    async fn compute_value(&self, expr: &Expr) -> Result<serde_json::Value> {
        let token = self.tokens.access_token().await?;

        tracing::debug!(function = expr.function_name().unwrap_or("<constant>"), "Computing value");

        let response = self
            .http
            .post(self.compute_url())
            .bearer_auth(token)
            .json(&ComputeRequest { expression: expr.to_expression() })
            .send()
            .await
            .map_err(|e| {
                BioscoreError::RemoteCall(format!("failed to reach {}: {}", self.base_url, e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BioscoreError::RemoteCall(format!(
                "value:compute returned {}: {}",
                status,
                error_message(&error_text)
            )));
        }

        let body: ComputeResponse = response.json().await.map_err(|e| {
            BioscoreError::RemoteCall(format!("failed to parse value:compute response: {}", e))
        })?;

        Ok(body.result)
    }
}

/// Request body for `value:compute`
#[derive(Debug, serde::Serialize)]
struct ComputeRequest {
    expression: serde_json::Value,
}

/// Response from `value:compute`
#[derive(Debug, Deserialize)]
struct ComputeResponse {
    #[serde(default)]
    result: serde_json::Value,
}

/// Pull `error.message` out of a Google API error body, or return it whole
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}
