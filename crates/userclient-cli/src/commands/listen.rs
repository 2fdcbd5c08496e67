use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use userclient::cache::create_redis_pool;
use userclient::{NotificationReceiver, RedisSubscription, UserClientConfig};
use userclient_core::{UserClientError, UserClientResult};

use crate::cli::{ListenArgs, OutputFormat};
use crate::output::{print_message, print_warning};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(300);

/// Prints notifications until interrupted or `--count` is reached.
///
/// Lost connections are re-established with exponential backoff.
pub async fn listen(
    config: &UserClientConfig,
    args: &ListenArgs,
    format: OutputFormat,
) -> Result<()> {
    let channel = args
        .channel
        .clone()
        .unwrap_or_else(|| config.notifications.channel.clone());
    let pool = create_redis_pool(&config.redis).context("Failed to create Redis pool")?;

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let mut received = 0;
    let mut backoff = INITIAL_BACKOFF;
    loop {
        let before = received;
        let result = tokio::select! {
            () = shutdown.cancelled() => return Ok(()),
            result = run(config, &channel, pool.clone(), args.count, &mut received, format) => {
                result
            }
        };

        let e = match result {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        if received > before {
            backoff = INITIAL_BACKOFF;
        }

        tracing::error!(
            error = %e,
            backoff_secs = backoff.as_secs(),
            "Notification listener error, reconnecting..."
        );
        print_warning(&format!("{e}; reconnecting in {}s", backoff.as_secs()));

        tokio::select! {
            () = shutdown.cancelled() => return Ok(()),
            () = tokio::time::sleep(backoff) => {}
        }
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

/// Receives on one connection. Returns `Ok` once `limit` messages were printed.
async fn run(
    config: &UserClientConfig,
    channel: &str,
    pool: deadpool_redis::Pool,
    limit: Option<usize>,
    received: &mut usize,
    format: OutputFormat,
) -> UserClientResult<()> {
    let subscription = RedisSubscription::subscribe(&config.redis.url, channel, pool).await?;
    let mut receiver =
        NotificationReceiver::with_idle_timeout(subscription, config.notifications.idle_timeout());

    loop {
        if limit.is_some_and(|limit| *received >= limit) {
            return Ok(());
        }
        match receiver.receive().await {
            Ok(msg) => {
                *received += 1;
                if let Err(e) = print_message(&msg, format) {
                    print_warning(&format!("{e:#}"));
                }
            }
            Err(
                e @ (UserClientError::Malformed { .. } | UserClientError::UnknownMessage { .. }),
            ) => {
                print_warning(&e.to_string());
            }
            Err(e) => return Err(e),
        }
    }
}
