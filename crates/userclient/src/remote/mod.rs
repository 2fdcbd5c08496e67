//! Transport to the remote user service.

pub mod client;

pub use client::{DEFAULT_TIMEOUT, HttpRemoteClient};
