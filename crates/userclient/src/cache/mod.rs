//! User lookup caching.
//!
//! ## Architecture
//!
//! - **[`CachedClient`]**: decorator serving `fetch_self` / `fetch_by_id`
//!   from a [`Cache`](userclient_core::Cache), keyed per token
//! - **[`CacheBackend`]**: the store, either a local DashMap or a shared Redis
//!
//! ## Key Layout
//!
//! ```text
//! <namespace>/<token>/me              principal owning <token>
//! <namespace>/<token>/me/<user_id>    user looked up with <token>
//! <namespace>/<token>/stored-keys     index of the per-id keys above
//! ```

pub mod backend;
pub mod client;

pub use backend::{CacheBackend, CachedEntry, create_cache_backend, create_redis_pool};
pub use client::{CachedClient, DEFAULT_NAMESPACE};
