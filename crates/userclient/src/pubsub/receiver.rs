//! Receive loop turning subscription events into [`Message`]s.

use std::time::Duration;

use tracing::{debug, warn};
use userclient_core::{Message, UserClientError, UserClientResult};

use super::{Subscription, SubscriptionEvent};

/// How long to wait for an event before probing the connection.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Reads change notifications from an exclusively owned subscription.
///
/// When nothing arrives within the idle timeout the connection is probed;
/// a successful probe resumes waiting without surfacing anything to the
/// caller.
pub struct NotificationReceiver<S> {
    subscription: S,
    idle_timeout: Duration,
}

impl<S: Subscription> NotificationReceiver<S> {
    pub fn new(subscription: S) -> Self {
        Self::with_idle_timeout(subscription, DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(subscription: S, idle_timeout: Duration) -> Self {
        Self {
            subscription,
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Returns the next data message.
    ///
    /// # Errors
    ///
    /// - [`UserClientError::ProbeFailed`] if the idle probe fails
    /// - [`UserClientError::Malformed`] if a payload is not `source:event:payload`
    /// - [`UserClientError::UnknownMessage`] for unrecognised events
    /// - whatever the subscription reports while waiting
    pub async fn receive(&mut self) -> UserClientResult<Message> {
        loop {
            let waited =
                tokio::time::timeout(self.idle_timeout, self.subscription.next_event()).await;
            let event = match waited {
                Ok(event) => event?,
                Err(_) => {
                    debug!(
                        idle_ms = self.idle_timeout.as_millis() as u64,
                        "no notifications, probing connection"
                    );
                    if let Err(e) = self.subscription.ping().await {
                        warn!(error = %e, "notification connection probe failed");
                        return Err(UserClientError::probe_failed(e.to_string()));
                    }
                    continue;
                }
            };

            match event {
                SubscriptionEvent::Subscribed { channel } => {
                    debug!(channel = %channel, "subscription confirmed");
                }
                SubscriptionEvent::Pong => {}
                SubscriptionEvent::Message { channel, payload } => {
                    debug!(channel = %channel, "notification received");
                    return Message::parse(&payload);
                }
                SubscriptionEvent::Other(raw) => {
                    return Err(UserClientError::unknown_message(raw));
                }
            }
        }
    }

    pub fn into_inner(self) -> S {
        self.subscription
    }
}
