//! Google API credentials.
//!
//! Either a pre-issued access token or a service account key. Service
//! account keys are turned into access tokens with the JWT bearer grant and
//! cached until shortly before they expire.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::SheetsConfig;

use super::SheetError;

const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before the reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a service account key file that matter here.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, SheetError> {
        serde_json::from_str(json)
            .map_err(|e| SheetError::Credentials(format!("Invalid service account key: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self, SheetError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SheetError::Credentials(format!(
                "Failed to read service account key {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&json)
    }
}

/// How requests to the Sheets API are authorised.
#[derive(Debug, Clone)]
pub enum SheetsAuth {
    AccessToken(String),
    ServiceAccount(ServiceAccountKey),
}

impl SheetsAuth {
    /// Pick the credential source from configuration.
    ///
    /// Precedence: access token, inline key JSON, key file.
    pub fn from_config(config: &SheetsConfig) -> Result<Self, SheetError> {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        if let Some(token) = non_blank(&config.access_token) {
            return Ok(SheetsAuth::AccessToken(token));
        }
        if let Some(json) = non_blank(&config.credentials_json) {
            return ServiceAccountKey::from_json(&json).map(SheetsAuth::ServiceAccount);
        }
        if let Some(path) = &config.credentials_path {
            return ServiceAccountKey::from_file(path).map(SheetsAuth::ServiceAccount);
        }

        Err(SheetError::Credentials(
            "no Sheets credentials configured".to_string(),
        ))
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

/// Build the signed JWT exchanged for an access token.
fn build_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String, SheetError> {
    let iat = now.timestamp();
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SPREADSHEETS_SCOPE,
        aud: &key.token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECS,
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| SheetError::Credentials(format!("Invalid private key: {}", e)))?;

    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| SheetError::Credentials(format!("Failed to sign assertion: {}", e)))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Hands out bearer tokens, exchanging service account assertions as needed.
pub(crate) struct TokenProvider {
    auth: SheetsAuth,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub(crate) fn new(auth: SheetsAuth) -> Self {
        Self {
            auth,
            cached: Mutex::new(None),
        }
    }

    pub(crate) async fn bearer_token(&self, client: &Client) -> Result<String, SheetError> {
        let key = match &self.auth {
            SheetsAuth::AccessToken(token) => return Ok(token.clone()),
            SheetsAuth::ServiceAccount(key) => key,
        };

        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > now) {
            return Ok(token.token.clone());
        }

        debug!(client_email = %key.client_email, "Exchanging service account assertion");
        let assertion = build_assertion(key, now)?;
        let response = client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Credentials(format!(
                "Token exchange failed: HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SheetError::Parse(format!("Failed to parse token response: {}", e)))?;

        let expires_at = now + Duration::seconds(token.expires_in - EXPIRY_MARGIN_SECS);
        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }
}
