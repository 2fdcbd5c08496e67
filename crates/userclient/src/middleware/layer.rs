//! axum middleware functions.
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/admin", get(admin))
//!     .layer(from_fn_with_state(RequiredRoles::new(["Admin"]), require_roles))
//!     .layer(from_fn_with_state(gate, require_user));
//! ```

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use userclient_core::User;

use super::error::AccessError;
use super::gate::{AuthGate, extract_token};
use super::scope::RequestScope;

/// Authenticates the request and stores its [`RequestScope`].
pub async fn require_user(
    State(gate): State<Arc<AuthGate>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AccessError> {
    let token = extract_token(req.headers(), req.uri()).unwrap_or_default();
    let scope = gate.authenticate(&token, gate.shutdown()).await?;
    req.extensions_mut().insert(scope);
    Ok(next.run(req).await)
}

/// Roles accepted by [`require_roles`]. Holding any one of them suffices.
#[derive(Debug, Clone)]
pub struct RequiredRoles(Arc<[String]>);

impl RequiredRoles {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Checks the scope's principal against `roles`.
///
/// No principal is [`AccessError::Unauthorized`]; a principal holding none of
/// the roles is [`AccessError::Forbidden`].
pub fn check_roles(scope: &RequestScope, roles: &[String]) -> Result<Arc<User>, AccessError> {
    let Some(user) = scope.user.clone() else {
        return Err(AccessError::unauthorized("No authenticated user"));
    };

    let wanted: Vec<&str> = roles.iter().map(String::as_str).collect();
    if !user.has_role(&wanted) {
        tracing::debug!(user_id = %user.id, required = ?wanted, "missing required role");
        return Err(AccessError::forbidden("Insufficient role"));
    }
    Ok(user)
}

/// Lets the request through only if its principal holds a required role.
///
/// Must run after [`require_user`]. The scope is left in place unchanged.
pub async fn require_roles(
    State(roles): State<RequiredRoles>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AccessError> {
    let scope = req
        .extensions()
        .get::<RequestScope>()
        .cloned()
        .unwrap_or_default();
    check_roles(&scope, roles.as_slice())?;
    Ok(next.run(req).await)
}
