//! Inbound token verification with bounded retries.

use std::sync::Arc;

use axum::http::{HeaderMap, Uri, header::AUTHORIZATION};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use userclient_core::{RemoteClient, User, UserClientError, UserClientResult};

use super::error::AccessError;
use super::scope::RequestScope;
use crate::config::RetryConfig;

/// Resolves caller tokens to principals through the user service.
///
/// Only [`UserClientError::ServiceUnavailable`] is retried. Every other
/// failure, and a successful answer without a principal, is reported as
/// [`AccessError::Unauthorized`].
pub struct AuthGate {
    remote: Arc<dyn RemoteClient>,
    retry: RetryConfig,
    shutdown: CancellationToken,
}

impl AuthGate {
    pub fn new(remote: Arc<dyn RemoteClient>, retry: RetryConfig) -> Self {
        Self {
            remote,
            retry,
            shutdown: CancellationToken::new(),
        }
    }

    /// Aborts pending retry waits once `shutdown` is cancelled.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn retry(&self) -> RetryConfig {
        self.retry
    }

    pub(crate) fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Verifies `token` and returns the scope for the request.
    pub async fn authenticate(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<RequestScope, AccessError> {
        if token.is_empty() {
            return Err(AccessError::unauthorized("Missing token"));
        }

        let user = self.fetch_with_retry(token, cancel).await.map_err(|e| {
            warn!(error = %e, "request authentication failed");
            AccessError::unauthorized(e.to_string())
        })?;

        match user {
            Some(user) => Ok(RequestScope::authenticated(Arc::new(user), token)),
            None => Err(AccessError::unauthorized("Unauthorized")),
        }
    }

    async fn fetch_with_retry(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> UserClientResult<Option<User>> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.remote.fetch_self(token).await {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    debug!(attempt, max_attempts, "user service unavailable, retrying");
                    tokio::select! {
                        () = cancel.cancelled() => return Err(UserClientError::Cancelled),
                        () = tokio::time::sleep(self.retry.wait()) => {}
                    }
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

/// Extracts the caller's token.
///
/// `Authorization: Bearer <token>` takes precedence over the `token` query
/// parameter. Empty values count as absent.
pub fn extract_token(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .filter(|t| !t.is_empty())
}
