//! Change notifications from the user service.
//!
//! ```text
//! PUBLISH events-channel "user:updated:123"
//!   ↓
//! Subscription::next_event -> SubscriptionEvent::Message
//!   ↓
//! NotificationReceiver::receive -> Message { source, event, payload }
//! ```

pub mod receiver;
pub mod redis;

use async_trait::async_trait;
use userclient_core::UserClientResult;

pub use receiver::{DEFAULT_IDLE_TIMEOUT, NotificationReceiver};
pub use redis::RedisSubscription;

/// Default channel the user service publishes on.
pub const DEFAULT_CHANNEL: &str = "events-channel";

/// An event delivered by a subscription.
///
/// [`RedisSubscription`] only yields `Message` and `Other`; redis-rs consumes
/// subscribe acknowledgements and pong replies internally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    /// Acknowledgement of a subscribe request.
    Subscribed { channel: String },
    /// Reply to a liveness probe.
    Pong,
    /// A published payload.
    Message { channel: String, payload: String },
    /// Anything else the transport delivered.
    Other(String),
}

/// A live subscription to a notification channel.
#[async_trait]
pub trait Subscription: Send {
    /// Waits for the next event. Errors are terminal for the subscription.
    async fn next_event(&mut self) -> UserClientResult<SubscriptionEvent>;

    /// Checks that the transport is still alive.
    async fn ping(&mut self) -> UserClientResult<()>;
}
