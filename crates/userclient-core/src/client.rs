//! The remote user service capability.

use async_trait::async_trait;

use crate::error::UserClientError;
use crate::models::{RevokedToken, User};

/// Result alias used across the client stack.
pub type UserClientResult<T> = Result<T, UserClientError>;

/// Operations offered by the remote user service.
///
/// Every decorator in the stack implements this trait as well as consuming
/// it, so layers compose freely: an HTTP client wrapped in a cache, wrapped
/// in a token-authenticated client.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Exchanges credentials for a token.
    async fn authenticate(&self, username: &str, password: &str) -> UserClientResult<String>;

    /// Resolves a token to its owner.
    ///
    /// `Ok(None)` means the service answered successfully without a user.
    async fn fetch_self(&self, token: &str) -> UserClientResult<Option<User>>;

    /// Ends the session identified by `token`.
    async fn logout(&self, token: &str) -> UserClientResult<()>;

    /// Looks up a user by id.
    async fn fetch_by_id(&self, token: &str, user_id: &str) -> UserClientResult<User>;

    /// Lists every user.
    async fn fetch_all(&self, token: &str) -> UserClientResult<Vec<User>>;

    /// Lists tokens revoked before their expiry.
    async fn revoked_tokens(&self, token: &str) -> UserClientResult<Vec<RevokedToken>>;
}
