// File: crates/appointly_gcal/src/auth.rs
//! OAuth2 web-flow credentials for the calendar owner.
//!
//! A single [`TokenCache`] owns the access/refresh token pair. Reads and refreshes
//! go through one async mutex, so concurrent requests that find the token expired
//! wait for a single refresh and then share its result. Every change is written
//! back to the token file before the lock is released.

use appointly_config::GcalConfig;
use chrono::Utc;
use google_calendar3::{
    common::GetToken,
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    CalendarHub,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use yup_oauth2::{read_application_secret, ApplicationSecret};

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not authenticated with Google Calendar")]
    NotAuthenticated,
    #[error("Stored token is expired and has no refresh token")]
    MissingRefreshToken,
    #[error("Token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },
    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Token file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid OAuth client credentials: {0}")]
    Credentials(String),
}

/// The persisted token, in the same shape Google's client libraries write.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl StoredToken {
    /// A token without an expiry is treated as valid.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < now_ms)
    }
}

// Response body of Google's token endpoint for both grant types.
#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    token_type: Option<String>,
    scope: Option<String>,
}

impl TokenResponse {
    fn into_stored(self, now_ms: i64) -> StoredToken {
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expiry_date: self.expires_in.map(|secs| now_ms + secs * 1000),
            token_type: self.token_type,
            scope: self.scope,
        }
    }
}

struct TokenCacheInner {
    secret: ApplicationSecret,
    token_path: PathBuf,
    http: reqwest::Client,
    token: Mutex<Option<StoredToken>>,
}

/// Shared handle to the owner's OAuth credentials. Cloning is cheap.
#[derive(Clone)]
pub struct TokenCache {
    inner: Arc<TokenCacheInner>,
}

impl TokenCache {
    pub fn new(
        secret: ApplicationSecret,
        token_path: impl Into<PathBuf>,
        http: reqwest::Client,
        token: Option<StoredToken>,
    ) -> Self {
        Self {
            inner: Arc::new(TokenCacheInner {
                secret,
                token_path: token_path.into(),
                http,
                token: Mutex::new(token),
            }),
        }
    }

    /// Reads the client credentials and, when present, the previously stored token.
    pub async fn load(config: &GcalConfig, http: reqwest::Client) -> Result<Self, AuthError> {
        let secret = read_application_secret(&config.credentials_path)
            .await
            .map_err(|e| AuthError::Credentials(format!("{}: {}", config.credentials_path, e)))?;
        let token = read_token_file(Path::new(&config.token_path)).await?;
        match &token {
            Some(_) => info!("Loaded stored token from {}", config.token_path),
            None => info!("No stored token at {}; visit /auth to connect the calendar", config.token_path),
        }
        Ok(Self::new(secret, &config.token_path, http, token))
    }

    #[cfg(test)]
    pub(crate) async fn is_authenticated(&self) -> bool {
        self.inner.token.lock().await.is_some()
    }

    fn redirect_uri(&self) -> Result<&str, AuthError> {
        self.inner
            .secret
            .redirect_uris
            .first()
            .map(String::as_str)
            .ok_or_else(|| AuthError::Credentials("no redirect_uris configured".to_string()))
    }

    /// Consent URL requesting offline access, so Google hands out a refresh token.
    pub fn authorization_url(&self) -> Result<String, AuthError> {
        let query = serde_urlencoded::to_string([
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", CALENDAR_SCOPE),
            ("response_type", "code"),
            ("client_id", self.inner.secret.client_id.as_str()),
            ("redirect_uri", self.redirect_uri()?),
        ])
        .map_err(|e| AuthError::Credentials(e.to_string()))?;
        Ok(format!("{}?{}", self.inner.secret.auth_uri, query))
    }

    /// Trades an authorization code for tokens and persists them.
    pub async fn exchange_code(&self, code: &str) -> Result<(), AuthError> {
        let redirect_uri = self.redirect_uri()?;
        let fresh = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.inner.secret.client_id.as_str()),
                ("client_secret", self.inner.secret.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
            ])
            .await?;

        let mut guard = self.inner.token.lock().await;
        let merged = merge_refresh_token(fresh, guard.as_ref());
        self.persist(&merged).await?;
        *guard = Some(merged);
        info!("Stored new Google Calendar token");
        Ok(())
    }

    /// Returns a valid access token, refreshing it first when expired.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let mut guard = self.inner.token.lock().await;
        let current = guard.as_ref().ok_or(AuthError::NotAuthenticated)?;

        if !current.is_expired(Utc::now().timestamp_millis()) {
            return Ok(current.access_token.clone());
        }

        let refresh_token = current
            .refresh_token
            .clone()
            .ok_or(AuthError::MissingRefreshToken)?;
        debug!("Access token expired, refreshing");
        let fresh = self
            .request_token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
                ("client_id", self.inner.secret.client_id.as_str()),
                ("client_secret", self.inner.secret.client_secret.as_str()),
            ])
            .await?;

        let merged = merge_refresh_token(fresh, guard.as_ref());
        self.persist(&merged).await?;
        let access_token = merged.access_token.clone();
        *guard = Some(merged);
        info!("Refreshed Google Calendar access token");
        Ok(access_token)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<StoredToken, AuthError> {
        let response = self
            .inner
            .http
            .post(&self.inner.secret.token_uri)
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!("Token endpoint rejected request ({}): {}", status, body);
            return Err(AuthError::TokenEndpoint { status, body });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.into_stored(Utc::now().timestamp_millis()))
    }

    async fn persist(&self, token: &StoredToken) -> Result<(), AuthError> {
        let bytes = serde_json::to_vec_pretty(token)?;
        tokio::fs::write(&self.inner.token_path, bytes).await?;
        debug!("Token written to {}", self.inner.token_path.display());
        Ok(())
    }
}

/// Google omits the refresh token on most responses; keep the one we have.
fn merge_refresh_token(mut fresh: StoredToken, previous: Option<&StoredToken>) -> StoredToken {
    if fresh.refresh_token.is_none() {
        fresh.refresh_token = previous.and_then(|p| p.refresh_token.clone());
    }
    fresh
}

pub async fn read_token_file(path: &Path) -> Result<Option<StoredToken>, AuthError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl GetToken for TokenCache {
    fn get_token<'a>(
        &'a self,
        _scopes: &'a [&str],
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>> + Send + 'a>>
    {
        Box::pin(async move { Ok(Some(self.access_token().await?)) })
    }
}

pub fn create_calendar_hub(tokens: TokenCache) -> Result<HubType, AuthError> {
    let https = HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .build();

    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    Ok(CalendarHub::new(client, tokens))
}
