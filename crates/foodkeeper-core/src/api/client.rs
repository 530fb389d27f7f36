//! API client for the FoodKeeper backend.
//!
//! `ApiClient::execute` is the single way requests reach the backend. It
//! attaches the bearer token, unwraps the response envelope, and recovers from
//! an expired access token by refreshing once and retrying once. When the
//! refresh itself fails the stored credentials are cleared and a
//! [`SessionEvent::Expired`](crate::auth::SessionEvent) is broadcast.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::auth::{Credentials, SessionEvents, TokenStore};
use crate::config::Config;
use crate::models::auth::RefreshRequest;
use crate::models::TokenPair;

use super::envelope::Reply;
use super::{ApiError, ApiRequest};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds, unless a request overrides it.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Token reissue endpoint. Never refreshed or retried itself.
pub const REFRESH_PATH: &str = "/auth/reissue";

/// Header carrying the refresh token on the reissue call
pub const REFRESH_TOKEN_HEADER: &str = "Refresh-Token";

/// Error code the backend puts in a 200 envelope when the access token expired
pub const TOKEN_EXPIRED_CODE: &str = "TOKEN_EXPIRED";

/// API client for FoodKeeper.
/// Clone is cheap - clones share the connection pool, token store, event bus
/// and refresh lock.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    store: TokenStore,
    events: SessionEvents,
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a new API client with the default timeout
    pub fn new(base_url: &str, store: TokenStore, events: SessionEvents) -> Result<Self> {
        Self::with_timeout(
            base_url,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            store,
            events,
        )
    }

    pub fn from_config(config: &Config, store: TokenStore, events: SessionEvents) -> Result<Self> {
        Self::with_timeout(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
            store,
            events,
        )
    }

    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
        store: TokenStore,
        events: SessionEvents,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').into(),
            store,
            events,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Perform one logical API call and decode its payload.
    ///
    /// An expired access token (HTTP 401 or [`TOKEN_EXPIRED_CODE`]) on an
    /// authorized request triggers one refresh and one retry. The retry's
    /// outcome is returned as-is; a second expiry is reported as
    /// [`ApiError::Unauthorized`].
    pub async fn execute<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let token = self.bearer_token(request)?;
        let reply = self.send(request, token.as_deref()).await?;

        if !Self::may_refresh(request) || !reply.is_session_expired(TOKEN_EXPIRED_CODE) {
            return reply.into_payload();
        }

        debug!(
            path = %request.path,
            status = %reply.status,
            "Access token rejected, refreshing session"
        );
        self.refresh_session(token).await?;

        let token = self.bearer_token(request)?;
        let reply = self.send(request, token.as_deref()).await?;
        if reply.is_session_expired(TOKEN_EXPIRED_CODE) {
            warn!(path = %request.path, "Still unauthorized after token refresh");
            return Err(ApiError::Unauthorized);
        }
        reply.into_payload()
    }

    fn may_refresh(request: &ApiRequest) -> bool {
        request.requires_auth && request.refreshable && request.path != REFRESH_PATH
    }

    /// The access token to attach, if the request needs one.
    /// Public requests never touch the token store.
    fn bearer_token(&self, request: &ApiRequest) -> Result<Option<String>, ApiError> {
        if !request.requires_auth {
            return Ok(None);
        }
        self.store.access_token().map_err(ApiError::Storage)
    }

    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<Reply, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.requires_auth {
            // A missing token still goes out so the server answers 401
            builder = builder.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.unwrap_or_default()),
            );
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        debug!(method = %request.method, path = %request.path, "Sending API request");
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(method = %request.method, path = %request.path, status = %status, "Received API response");

        Ok(Reply::new(status, body))
    }

    /// Refresh the session after `rejected_token` was refused.
    ///
    /// Runs as its own task so a refresh that has started is persisted even if
    /// the caller stops waiting.
    async fn refresh_session(&self, rejected_token: Option<String>) -> Result<(), ApiError> {
        let client = self.clone();
        let task = tokio::spawn(async move { client.refresh_serialized(rejected_token).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(ApiError::Cancelled),
        }
    }

    /// One refresh at a time. Whoever waited on the lock first checks whether
    /// the work was already done.
    async fn refresh_serialized(&self, rejected_token: Option<String>) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.store.credentials().map_err(ApiError::Storage)?;
        match current {
            Some(credentials)
                if rejected_token.as_deref() != Some(credentials.access_token.as_str()) =>
            {
                debug!("Session already refreshed by a concurrent request");
                Ok(())
            }
            Some(credentials) => match self.reissue_tokens(&credentials).await {
                Ok(renewed) => {
                    self.store
                        .save_credentials(&renewed)
                        .map_err(ApiError::Storage)?;
                    info!("Access token refreshed");
                    Ok(())
                }
                Err(e) => {
                    warn!(error = %e, "Token refresh failed, ending session");
                    self.end_session();
                    Err(ApiError::SessionExpired)
                }
            },
            None if rejected_token.is_some() => {
                // Another request already ended the session and sent the signal
                debug!("Credentials cleared while waiting to refresh");
                Err(ApiError::SessionExpired)
            }
            None => {
                warn!("No refresh token stored, ending session");
                self.end_session();
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Exchange the refresh token for a new pair. Fields the server leaves out
    /// keep their current value.
    async fn reissue_tokens(&self, credentials: &Credentials) -> Result<Credentials, ApiError> {
        let request = ApiRequest::post(REFRESH_PATH)
            .public()
            .json(&RefreshRequest {
                refresh_token: &credentials.refresh_token,
            })?
            .header(REFRESH_TOKEN_HEADER, credentials.refresh_token.as_str());

        let pair: TokenPair = self.send(&request, None).await?.into_payload()?;

        Ok(Credentials {
            access_token: pair
                .access_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| credentials.access_token.clone()),
            refresh_token: pair
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| credentials.refresh_token.clone()),
        })
    }

    fn end_session(&self) {
        if let Err(e) = self.store.clear_credentials() {
            error!(error = %e, "Failed to clear stored credentials");
        }
        self.events.notify_expired();
    }
}
