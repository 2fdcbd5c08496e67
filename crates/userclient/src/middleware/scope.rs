//! Per-request authentication state.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use userclient_core::User;

use super::error::AccessError;

/// Principal and raw token established for one request.
///
/// Stored in the request extensions by [`require_user`](super::require_user).
/// Extracting it from a request that never passed the middleware yields an
/// empty scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestScope {
    pub user: Option<Arc<User>>,
    pub token: Option<String>,
}

impl RequestScope {
    pub fn authenticated(user: Arc<User>, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Reads the scope from request parts, empty if absent.
    pub fn from_parts(parts: &Parts) -> Self {
        parts
            .extensions
            .get::<RequestScope>()
            .cloned()
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for RequestScope
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

/// Extractor for the authenticated principal.
///
/// Rejects with 401 when the request carries no principal.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Arc<User>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        RequestScope::from_parts(parts)
            .user
            .map(CurrentUser)
            .ok_or_else(|| AccessError::unauthorized("No authenticated user"))
    }
}
