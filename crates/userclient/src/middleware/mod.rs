//! Inbound authentication for axum services.
//!
//! - [`require_user`] resolves the caller's token to a principal, retrying
//!   while the user service is unavailable, and stores a [`RequestScope`]
//! - [`require_roles`] refuses principals holding none of the required roles
//! - [`CurrentUser`] and [`RequestScope`] read the result in handlers

pub mod error;
pub mod gate;
pub mod layer;
pub mod scope;

pub use error::AccessError;
pub use gate::{AuthGate, extract_token};
pub use layer::{RequiredRoles, check_roles, require_roles, require_user};
pub use scope::{CurrentUser, RequestScope};
