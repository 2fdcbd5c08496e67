//! # userclient-core
//!
//! Shared vocabulary for the user service client stack.
//!
//! This crate provides:
//! - Status classification and the client error type
//! - The user and revoked-token records
//! - The [`RemoteClient`] and [`Cache`] capabilities the decorators build on
//! - Parsing of change notifications
//!
//! ## Modules
//!
//! - [`error`] - Error kinds, [`classify`] and [`UserClientError`]
//! - [`models`] - [`User`], [`RevokedToken`] and role names
//! - [`client`] - The [`RemoteClient`] trait
//! - [`cache`] - The [`Cache`] trait
//! - [`message`] - Notification [`Message`] parsing

pub mod cache;
pub mod client;
pub mod error;
pub mod message;
pub mod models;

pub use cache::{Cache, CacheError};
pub use client::{RemoteClient, UserClientResult};
pub use error::{ErrorKind, SERVICE_UNAVAILABLE_STATUSES, UserClientError, classify};
pub use message::Message;
pub use models::{Platform, RevokedToken, User, roles};
