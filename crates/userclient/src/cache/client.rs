//! Caching decorator over a [`RemoteClient`].
//!
//! Principals are cached per token. Every per-id entry created under a token
//! is recorded in that token's index so that logout can drop all of them.
//! The store is best effort: any store failure behaves like a miss and is
//! only logged.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use userclient_core::{Cache, RemoteClient, RevokedToken, User, UserClientResult};

/// Default prefix for every key written by [`CachedClient`].
pub const DEFAULT_NAMESPACE: &str = "user-middleware";

/// [`RemoteClient`] that serves `fetch_self` and `fetch_by_id` from a cache.
pub struct CachedClient {
    remote: Arc<dyn RemoteClient>,
    cache: Arc<dyn Cache>,
    namespace: String,
}

impl CachedClient {
    pub fn new(remote: Arc<dyn RemoteClient>, cache: Arc<dyn Cache>) -> Self {
        Self::with_namespace(remote, cache, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(
        remote: Arc<dyn RemoteClient>,
        cache: Arc<dyn Cache>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            remote,
            cache,
            namespace: namespace.into(),
        }
    }

    fn self_key(&self, token: &str) -> String {
        format!("{}/{}/me", self.namespace, token)
    }

    fn user_key(&self, token: &str, user_id: &str) -> String {
        format!("{}/{}/me/{}", self.namespace, token, user_id)
    }

    fn index_key(&self, token: &str) -> String {
        format!("{}/{}/stored-keys", self.namespace, token)
    }

    async fn load<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        let bytes = match self.cache.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "cache read failed");
                return None;
            }
        };
        match rmp_serde::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "cached value could not be decoded");
                None
            }
        }
    }

    async fn store<T: Serialize + Sync>(&self, key: &str, value: &T) {
        let bytes = match rmp_serde::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "value could not be encoded for cache");
                return;
            }
        };
        if let Err(e) = self.cache.set(key, bytes).await {
            warn!(error = %e, "cache write failed");
        }
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            warn!(error = %e, "cache delete failed");
        }
    }

    /// Adds `key` to the token's index once. An unreadable index starts over.
    async fn track(&self, token: &str, key: &str) {
        let index_key = self.index_key(token);
        let mut keys: Vec<String> = self.load(&index_key).await.unwrap_or_default();
        if keys.iter().any(|k| k == key) {
            return;
        }
        keys.push(key.to_string());
        self.store(&index_key, &keys).await;
    }

    /// Drops every entry derived from `token`.
    async fn clean_up(&self, token: &str) {
        self.remove(&self.self_key(token)).await;

        let index_key = self.index_key(token);
        let Some(keys) = self.load::<Vec<String>>(&index_key).await else {
            return;
        };
        debug!(entries = keys.len(), "dropping cached lookups for token");
        for key in &keys {
            self.remove(key).await;
        }
        self.remove(&index_key).await;
    }
}

#[async_trait]
impl RemoteClient for CachedClient {
    async fn authenticate(&self, username: &str, password: &str) -> UserClientResult<String> {
        self.remote.authenticate(username, password).await
    }

    async fn fetch_self(&self, token: &str) -> UserClientResult<Option<User>> {
        let key = self.self_key(token);
        if let Some(user) = self.load::<User>(&key).await {
            debug!(user_id = %user.id, "cache hit (self)");
            return Ok(Some(user));
        }
        debug!("cache miss (self)");

        let user = self.remote.fetch_self(token).await?;
        if let Some(user) = &user {
            self.store(&key, user).await;
        }
        Ok(user)
    }

    async fn logout(&self, token: &str) -> UserClientResult<()> {
        self.clean_up(token).await;
        self.remote.logout(token).await
    }

    async fn fetch_by_id(&self, token: &str, user_id: &str) -> UserClientResult<User> {
        let key = self.user_key(token, user_id);
        self.track(token, &key).await;

        if let Some(user) = self.load::<User>(&key).await {
            debug!(user_id, "cache hit");
            return Ok(user);
        }
        debug!(user_id, "cache miss");

        let user = self.remote.fetch_by_id(token, user_id).await?;
        self.store(&key, &user).await;
        Ok(user)
    }

    async fn fetch_all(&self, token: &str) -> UserClientResult<Vec<User>> {
        self.remote.fetch_all(token).await
    }

    async fn revoked_tokens(&self, token: &str) -> UserClientResult<Vec<RevokedToken>> {
        self.remote.revoked_tokens(token).await
    }
}
