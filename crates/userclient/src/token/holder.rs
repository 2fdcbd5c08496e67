//! Token holders.
//!
//! A holder hands out the service token used for user lookups. The lazy
//! variant authenticates on first use and again after the token has been
//! invalidated; concurrent callers share a single authentication.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use userclient_core::{RemoteClient, UserClientError, UserClientResult};

/// Source of the service token.
#[async_trait]
pub trait TokenHolder: Send + Sync {
    /// Returns the current token, authenticating through `remote` if needed.
    async fn token(&self, remote: &dyn RemoteClient) -> UserClientResult<String>;

    /// Drops the current token. The next [`token`](Self::token) call obtains a new one.
    async fn invalidate(&self);
}

/// Holder for a pre-issued token.
///
/// Never contacts the service. After [`invalidate`](TokenHolder::invalidate)
/// it hands out an empty token.
#[derive(Debug)]
pub struct StaticTokenHolder {
    token: RwLock<String>,
}

impl StaticTokenHolder {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(token.into()),
        }
    }
}

#[async_trait]
impl TokenHolder for StaticTokenHolder {
    async fn token(&self, _remote: &dyn RemoteClient) -> UserClientResult<String> {
        Ok(self.token.read().clone())
    }

    async fn invalidate(&self) {
        self.token.write().clear();
    }
}

/// Holder that authenticates with service-account credentials on demand.
pub struct LazyTokenHolder {
    username: String,
    password: String,
    token: ArcSwapOption<String>,
    // Serializes authentication and invalidation.
    auth_lock: Mutex<()>,
}

impl LazyTokenHolder {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            token: ArcSwapOption::const_empty(),
            auth_lock: Mutex::new(()),
        }
    }

    /// Returns `true` if a token is currently held.
    pub fn has_token(&self) -> bool {
        self.token.load().is_some()
    }
}

impl fmt::Debug for LazyTokenHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyTokenHolder")
            .field("username", &self.username)
            .field("has_token", &self.has_token())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenHolder for LazyTokenHolder {
    async fn token(&self, remote: &dyn RemoteClient) -> UserClientResult<String> {
        if let Some(token) = self.token.load_full() {
            return Ok(token.as_ref().clone());
        }

        let _guard = self.auth_lock.lock().await;
        // Another caller may have authenticated while we waited.
        if let Some(token) = self.token.load_full() {
            return Ok(token.as_ref().clone());
        }

        debug!(username = %self.username, "authenticating service account");
        let token = match remote.authenticate(&self.username, &self.password).await {
            Ok(token) => token,
            Err(e) => {
                warn!(
                    username = %self.username,
                    error = %e,
                    "service account authentication failed"
                );
                return Err(e);
            }
        };
        if token.is_empty() {
            return Err(UserClientError::MissingToken);
        }

        self.token.store(Some(Arc::new(token.clone())));
        Ok(token)
    }

    async fn invalidate(&self) {
        let _guard = self.auth_lock.lock().await;
        if self.token.swap(None).is_some() {
            debug!(username = %self.username, "service token invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::test_support::MockRemoteClient;
    use userclient_core::ErrorKind;

    #[tokio::test]
    async fn test_static_holder() {
        let remote = MockRemoteClient::new();
        let holder = StaticTokenHolder::new("fixed");

        assert_eq!(holder.token(&remote).await.unwrap(), "fixed");
        assert_eq!(holder.token(&remote).await.unwrap(), "fixed");
        assert_eq!(remote.calls("authenticate"), 0);
    }

    #[tokio::test]
    async fn test_static_holder_invalidate_clears() {
        let remote = MockRemoteClient::new();
        let holder = StaticTokenHolder::new("fixed");

        holder.invalidate().await;
        assert_eq!(holder.token(&remote).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_lazy_holder_authenticates_once() {
        let remote = MockRemoteClient::new().with_authenticate(|user, pass| {
            assert_eq!(user, "svc");
            assert_eq!(pass, "secret");
            Ok("tok-1".to_string())
        });
        let holder = LazyTokenHolder::new("svc", "secret");
        assert!(!holder.has_token());

        assert_eq!(holder.token(&remote).await.unwrap(), "tok-1");
        assert_eq!(holder.token(&remote).await.unwrap(), "tok-1");
        assert_eq!(remote.calls("authenticate"), 1);
        assert!(holder.has_token());
    }

    #[tokio::test]
    async fn test_lazy_holder_reauthenticates_after_invalidate() {
        let issued = Arc::new(AtomicUsize::new(0));
        let counter = issued.clone();
        let remote = MockRemoteClient::new().with_authenticate(move |_, _| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("tok-{n}"))
        });
        let holder = LazyTokenHolder::new("svc", "secret");

        assert_eq!(holder.token(&remote).await.unwrap(), "tok-1");
        holder.invalidate().await;
        assert!(!holder.has_token());
        assert_eq!(holder.token(&remote).await.unwrap(), "tok-2");
        assert_eq!(remote.calls("authenticate"), 2);
    }

    #[tokio::test]
    async fn test_lazy_holder_does_not_cache_failures() {
        let remote = MockRemoteClient::new()
            .with_authenticate(|_, _| Err(UserClientError::ServiceUnavailable));
        let holder = LazyTokenHolder::new("svc", "secret");

        let err = holder.token(&remote).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert!(holder.token(&remote).await.is_err());
        assert_eq!(remote.calls("authenticate"), 2);
        assert!(!holder.has_token());
    }

    #[tokio::test]
    async fn test_lazy_holder_rejects_empty_token() {
        let remote = MockRemoteClient::new().with_authenticate(|_, _| Ok(String::new()));
        let holder = LazyTokenHolder::new("svc", "secret");

        let err = holder.token(&remote).await.unwrap_err();
        assert_eq!(err, UserClientError::MissingToken);
        assert!(!holder.has_token());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lazy_holder_concurrent_callers_share_authentication() {
        let remote = Arc::new(
            MockRemoteClient::new()
                .with_authenticate(|_, _| Ok("shared".to_string()))
                .with_authenticate_delay(Duration::from_millis(50)),
        );
        let holder = Arc::new(LazyTokenHolder::new("svc", "secret"));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let remote = remote.clone();
            let holder = holder.clone();
            handles.push(tokio::spawn(async move {
                holder.token(remote.as_ref()).await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "shared");
        }

        assert_eq!(remote.calls("authenticate"), 1);
    }

    #[test]
    fn test_debug_hides_password() {
        let holder = LazyTokenHolder::new("svc", "hunter2");
        let rendered = format!("{holder:?}");
        assert!(rendered.contains("svc"));
        assert!(!rendered.contains("hunter2"));
    }
}
