// stowage-core/src/infrastructure/adapters/google_auth.rs
//
// OAuth2 access tokens for the Google REST APIs, minted from a service account
// key file (JWT bearer grant) or taken as-is from the configuration.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::domain::settings::IngestConfig;
use crate::error::StowageError;
use crate::infrastructure::adapters::http::ensure_success;
use crate::infrastructure::error::InfrastructureError;

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
// Refresh this long before the token actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a service account key file that matter for token minting.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, InfrastructureError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[derive(Debug, Clone)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    StaticToken(String),
}

impl Credentials {
    /// A pre-minted token wins over the key file.
    pub fn from_config(config: &IngestConfig) -> Result<Self, InfrastructureError> {
        if let Some(token) = &config.access_token {
            return Ok(Credentials::StaticToken(token.clone()));
        }
        match &config.credentials_path {
            Some(path) => Ok(Credentials::ServiceAccount(ServiceAccountKey::from_file(
                path,
            )?)),
            None => Err(InfrastructureError::Auth(
                "no service account key file or access token configured".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct TokenProvider {
    client: reqwest::Client,
    credentials: Credentials,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(client: reqwest::Client, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            cached: Mutex::new(None),
        }
    }

    /// Returns a bearer token, exchanging a fresh assertion when the cached one is stale.
    pub async fn access_token(&self) -> Result<String, StowageError> {
        let key = match &self.credentials {
            Credentials::StaticToken(token) => return Ok(token.clone()),
            Credentials::ServiceAccount(key) => key,
        };

        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Utc::now()
        {
            return Ok(token.value.clone());
        }

        let fresh = self.exchange(key).await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    #[instrument(skip(self, key), fields(client_email = %key.client_email))]
    async fn exchange(&self, key: &ServiceAccountKey) -> Result<CachedToken, StowageError> {
        let assertion = sign_assertion(key, Utc::now())?;

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let response = ensure_success(response).await.map_err(|e| match e {
            InfrastructureError::RemoteStatus { status, body, .. } => {
                InfrastructureError::Auth(format!("token endpoint answered {}: {}", status, body))
            }
            other => other,
        })?;
        let token: TokenResponse = response.json().await?;

        let lifetime = token.expires_in.unwrap_or(3600) - EXPIRY_MARGIN_SECS;
        debug!(lifetime, "Obtained access token");
        Ok(CachedToken {
            value: token.access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime.max(0)),
        })
    }
}

fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, InfrastructureError> {
    let claims = Claims {
        iss: &key.client_email,
        scope: CLOUD_PLATFORM_SCOPE,
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: (now + Duration::hours(1)).timestamp(),
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(jsonwebtoken::encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &encoding_key,
    )?)
}
