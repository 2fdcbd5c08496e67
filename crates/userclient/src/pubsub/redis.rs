//! Redis Pub/Sub subscription.

use async_trait::async_trait;
use deadpool_redis::Pool;
use futures_util::StreamExt;
use userclient_core::{UserClientError, UserClientResult};

use super::{Subscription, SubscriptionEvent};

/// Subscription to a Redis Pub/Sub channel.
///
/// Messages arrive on a dedicated Pub/Sub connection; liveness is probed
/// with `PING` over a pooled connection to the same server.
pub struct RedisSubscription {
    pubsub: redis::aio::PubSub,
    probe: Pool,
    channel: String,
}

impl RedisSubscription {
    /// Opens a Pub/Sub connection to `url` and subscribes to `channel`.
    pub async fn subscribe(url: &str, channel: &str, probe: Pool) -> UserClientResult<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            UserClientError::subscription(format!("failed to create Redis client: {e}"))
        })?;

        let mut pubsub = client.get_async_pubsub().await.map_err(|e| {
            UserClientError::subscription(format!("failed to get pub/sub connection: {e}"))
        })?;

        pubsub
            .subscribe(channel)
            .await
            .map_err(|e| UserClientError::subscription(format!("failed to subscribe: {e}")))?;

        tracing::info!(channel = %channel, "Subscribed to notification channel");

        Ok(Self {
            pubsub,
            probe,
            channel: channel.to_string(),
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[async_trait]
impl Subscription for RedisSubscription {
    async fn next_event(&mut self) -> UserClientResult<SubscriptionEvent> {
        let Some(msg) = self.pubsub.on_message().next().await else {
            return Err(UserClientError::subscription("pub/sub connection closed"));
        };

        let channel = msg.get_channel_name().to_string();
        match msg.get_payload::<String>() {
            Ok(payload) => Ok(SubscriptionEvent::Message { channel, payload }),
            Err(e) => Ok(SubscriptionEvent::Other(format!(
                "unreadable payload on {channel}: {e}"
            ))),
        }
    }

    async fn ping(&mut self) -> UserClientResult<()> {
        let mut conn = self.probe.get().await.map_err(|e| {
            UserClientError::probe_failed(format!("failed to get Redis connection: {e}"))
        })?;

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| UserClientError::probe_failed(e.to_string()))?;
        Ok(())
    }
}
