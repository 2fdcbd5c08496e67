//! Client that authenticates calls with the service token.

use std::sync::Arc;

use tracing::warn;
use userclient_core::{RemoteClient, RevokedToken, User, UserClientResult};

use super::holder::TokenHolder;

/// Wraps a [`RemoteClient`] and supplies the token from a [`TokenHolder`].
///
/// When the service rejects the token the holder is invalidated so the next
/// call authenticates again. The failing call itself is not retried.
#[derive(Clone)]
pub struct AuthenticatedClient {
    remote: Arc<dyn RemoteClient>,
    holder: Arc<dyn TokenHolder>,
}

impl AuthenticatedClient {
    pub fn new(remote: Arc<dyn RemoteClient>, holder: Arc<dyn TokenHolder>) -> Self {
        Self { remote, holder }
    }

    /// The principal the service token belongs to.
    pub async fn fetch_self(&self) -> UserClientResult<Option<User>> {
        let token = self.token().await?;
        let result = self.remote.fetch_self(&token).await;
        self.observe("fetch_self", result).await
    }

    pub async fn fetch_by_id(&self, user_id: &str) -> UserClientResult<User> {
        let token = self.token().await?;
        let result = self.remote.fetch_by_id(&token, user_id).await;
        self.observe("fetch_by_id", result).await
    }

    pub async fn fetch_all(&self) -> UserClientResult<Vec<User>> {
        let token = self.token().await?;
        let result = self.remote.fetch_all(&token).await;
        self.observe("fetch_all", result).await
    }

    pub async fn revoked_tokens(&self) -> UserClientResult<Vec<RevokedToken>> {
        let token = self.token().await?;
        let result = self.remote.revoked_tokens(&token).await;
        self.observe("revoked_tokens", result).await
    }

    async fn token(&self) -> UserClientResult<String> {
        self.holder.token(self.remote.as_ref()).await
    }

    async fn observe<T>(
        &self,
        op: &'static str,
        result: UserClientResult<T>,
    ) -> UserClientResult<T> {
        if let Err(e) = &result
            && e.is_unauthorized()
        {
            warn!(op, "service token rejected, invalidating");
            self.holder.invalidate().await;
        }
        result
    }
}
