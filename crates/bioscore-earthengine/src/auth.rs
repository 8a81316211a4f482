//! Service-account authentication against Google OAuth

use bioscore_core::error::{BioscoreError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::Mutex;

/// Environment variable holding the service-account key JSON
pub const SERVICE_ACCOUNT_ENV: &str = "ee_service_account";

pub const EARTHENGINE_SCOPES: &str =
    "https://www.googleapis.com/auth/earthengine https://www.googleapis.com/auth/cloud-platform";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are refreshed this long before they expire
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Service-account key, as downloaded from the cloud console
#[derive(Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl ServiceAccountCredentials {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            BioscoreError::Authentication(format!("invalid service account key JSON: {}", e))
        })
    }

    /// Read the key JSON from the `ee_service_account` environment variable
    pub fn from_env() -> Result<Self> {
        let json = std::env::var(SERVICE_ACCOUNT_ENV)
            .map_err(|_| BioscoreError::ConfigMissing { key: SERVICE_ACCOUNT_ENV.to_string() })?;
        Self::from_json(&json)
    }

    /// RS256-signed JWT asserting this account, valid for one hour
    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: EARTHENGINE_SCOPES,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(|e| {
            BioscoreError::Authentication(format!("unreadable private key: {}", e))
        })?;

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| BioscoreError::Authentication(format!("failed to sign assertion: {}", e)))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

/// OAuth bearer token with its expiry
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Hands out access tokens, exchanging a fresh assertion when the cached one expires
pub struct TokenSource {
    credentials: ServiceAccountCredentials,
    http: reqwest::Client,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenSource {
    pub fn new(credentials: ServiceAccountCredentials, http: reqwest::Client) -> Self {
        Self { credentials, http, cached: Mutex::new(None) }
    }

    pub fn credentials(&self) -> &ServiceAccountCredentials {
        &self.credentials
    }

    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.token.clone());
        }

        let token = self.exchange().await?;
        let bearer = token.token.clone();
        *cached = Some(token);
        Ok(bearer)
    }

    async fn exchange(&self) -> Result<AccessToken> {
        let now = Utc::now();
        let assertion = self.credentials.signed_assertion(now)?;

        tracing::debug!(account = %self.credentials.client_email, "Exchanging service account assertion");

        let response = self
            .http
            .post(&self.credentials.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                BioscoreError::Authentication(format!(
                    "failed to reach token endpoint {}: {}",
                    self.credentials.token_uri, e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BioscoreError::Authentication(format!(
                "token endpoint returned {}: {}",
                status, error_text
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            BioscoreError::Authentication(format!("failed to parse token response: {}", e))
        })?;

        Ok(AccessToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
