//! Service-account tokens and the client that injects them.

pub mod client;
pub mod holder;

pub use client::AuthenticatedClient;
pub use holder::{LazyTokenHolder, StaticTokenHolder, TokenHolder};
