pub mod cache;
pub mod config;
pub mod middleware;
pub mod observability;
pub mod pubsub;
pub mod remote;
pub mod token;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

pub use cache::{CacheBackend, CachedClient, CachedEntry, create_cache_backend};
pub use config::{
    CacheConfig, ConfigError, LoggingConfig, NotificationConfig, RedisConfig, RetryConfig,
    ServiceConfig, UserClientConfig,
};
pub use middleware::{
    AccessError, AuthGate, CurrentUser, RequestScope, RequiredRoles, require_roles, require_user,
};
pub use observability::init_tracing;
pub use pubsub::{NotificationReceiver, RedisSubscription, Subscription, SubscriptionEvent};
pub use remote::HttpRemoteClient;
pub use token::{AuthenticatedClient, LazyTokenHolder, StaticTokenHolder, TokenHolder};

use userclient_core::{RemoteClient, UserClientResult};

/// Create the remote client described by configuration.
///
/// Returns the HTTP client, wrapped in a [`CachedClient`] when caching is
/// enabled. The cache store follows [`create_cache_backend`], so a missing
/// Redis degrades to the local store.
pub async fn create_remote_client(
    config: &UserClientConfig,
) -> UserClientResult<Arc<dyn RemoteClient>> {
    let http: Arc<dyn RemoteClient> = Arc::new(HttpRemoteClient::from_config(&config.service)?);
    if !config.cache.enabled {
        tracing::info!("User cache disabled");
        return Ok(http);
    }

    let backend = create_cache_backend(&config.redis, config.cache.ttl()).await;
    tracing::info!(
        mode = backend.mode(),
        namespace = %config.cache.namespace,
        "User cache enabled"
    );
    Ok(Arc::new(CachedClient::with_namespace(
        http,
        Arc::new(backend),
        config.cache.namespace.clone(),
    )))
}

/// Create the token holder for the service account.
///
/// Credentials in `service` select a [`LazyTokenHolder`]; otherwise
/// `static_token` is used as is.
pub fn create_token_holder(
    service: &ServiceConfig,
    static_token: Option<&str>,
) -> Option<Arc<dyn TokenHolder>> {
    match (&service.username, &service.password, static_token) {
        (Some(username), Some(password), _) => {
            Some(Arc::new(LazyTokenHolder::new(username.clone(), password.clone())))
        }
        (_, _, Some(token)) => Some(Arc::new(StaticTokenHolder::new(token))),
        _ => None,
    }
}
