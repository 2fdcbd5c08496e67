//! Configuration for the user service client stack.
//!
//! Every section has working defaults, so an empty file (or no file at all)
//! yields a usable local setup. Values can be overridden through
//! `USERCLIENT__<SECTION>__<KEY>` environment variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserClientConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Redis configuration
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl UserClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.service.base_url).is_err() {
            return Err(ConfigError::invalid("service.base_url must be a valid URL"));
        }
        if self.service.timeout_ms == 0 {
            return Err(ConfigError::invalid("service.timeout_ms must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.max_attempts must be >= 1"));
        }
        if self.cache.namespace.is_empty() {
            return Err(ConfigError::invalid("cache.namespace must not be empty"));
        }
        if self.redis.enabled && self.redis.url.is_empty() {
            return Err(ConfigError::invalid("redis.enabled=true requires redis.url"));
        }
        if self.notifications.channel.is_empty() {
            return Err(ConfigError::invalid("notifications.channel must not be empty"));
        }
        if self.notifications.idle_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "notifications.idle_timeout_secs must be > 0",
            ));
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(ConfigError::invalid(format!(
                "logging.level must be one of {valid_levels:?}"
            )));
        }
        Ok(())
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(String),

    #[error("config deserialize error: {0}")]
    Deserialize(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// Remote user service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_service_timeout_ms")]
    pub timeout_ms: u64,

    /// Service account used by backend consumers (lazy token holder)
    #[serde(default)]
    pub username: Option<String>,

    /// For security, prefer USERCLIENT__SERVICE__PASSWORD. Never serialized.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_service_timeout_ms() -> u64 {
    10_000
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_service_timeout_ms(),
            username: None,
            password: None,
        }
    }
}

/// Retry policy of the inbound authentication gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of `fetch_self` attempts (>= 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Wait between attempts in milliseconds
    #[serde(default = "default_wait_ms")]
    pub wait_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_wait_ms() -> u64 {
    1000
}

impl RetryConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            wait_ms: default_wait_ms(),
        }
    }
}

/// Lookup cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Prefix of every key written by this client
    #[serde(default = "default_cache_namespace")]
    pub namespace: String,

    /// Entry lifetime in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_namespace() -> String {
    "user-middleware".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            namespace: default_cache_namespace(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Enable Redis (falls back to the local cache without it)
    /// Default: false
    #[serde(default = "default_redis_enabled")]
    pub enabled: bool,

    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Connection timeout in milliseconds
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_redis_enabled() -> bool {
    false
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    10
}

fn default_redis_timeout_ms() -> u64 {
    5000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: default_redis_enabled(),
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

/// Change notification subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Silence after which the connection is probed
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

fn default_channel() -> String {
    "events-channel".to_string()
}

fn default_idle_timeout_secs() -> u64 {
    60
}

impl NotificationConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::{ConfigError, UserClientConfig};
    use config::{Config, Environment, File};
    use std::collections::HashMap;
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "userclient.toml";
    pub const ENV_PREFIX: &str = "USERCLIENT";

    pub fn load_config(path: Option<&str>) -> Result<UserClientConfig, ConfigError> {
        load(path, None)
    }

    /// Same as [`load_config`] but reads overrides from `vars` instead of the
    /// process environment.
    pub fn load_config_with_env(
        path: Option<&str>,
        vars: HashMap<String, String>,
    ) -> Result<UserClientConfig, ConfigError> {
        load(path, Some(vars))
    }

    fn load(
        path: Option<&str>,
        vars: Option<HashMap<String, String>>,
    ) -> Result<UserClientConfig, ConfigError> {
        let mut builder = Config::builder();
        let file = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if file.exists() {
            builder = builder.add_source(File::from(file));
        }
        // Environment variable overrides, e.g., USERCLIENT__RETRY__MAX_ATTEMPTS=5
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__")
                .source(vars),
        );
        let cfg = builder
            .build()
            .map_err(|e| ConfigError::Build(e.to_string()))?;
        let merged: UserClientConfig = cfg
            .try_deserialize()
            .map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = UserClientConfig::default();
        assert_eq!(config.service.base_url, "http://localhost:8080");
        assert_eq!(config.service.timeout(), Duration::from_secs(10));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.wait(), Duration::from_millis(1000));
        assert_eq!(config.cache.namespace, "user-middleware");
        assert!(!config.redis.enabled);
        assert_eq!(config.notifications.channel, "events-channel");
        assert_eq!(config.notifications.idle_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_password_is_not_serialized() {
        let mut config = UserClientConfig::default();
        config.service.username = Some("svc".to_string());
        config.service.password = Some("hunter2".to_string());

        let rendered = serde_json::to_string(&config).unwrap();
        assert!(rendered.contains("\"username\":\"svc\""));
        assert!(!rendered.contains("password"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = UserClientConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = UserClientConfig::default();
        config.service.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = UserClientConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = UserClientConfig::default();
        config.cache.namespace.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[service]
base_url = "https://users.internal"

[retry]
max_attempts = 5
wait_ms = 250

[cache]
namespace = "svc"
"#
        )
        .unwrap();

        let path = file.path().to_str().unwrap();
        let config = loader::load_config_with_env(Some(path), HashMap::new()).unwrap();
        assert_eq!(config.service.base_url, "https://users.internal");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.wait_ms, 250);
        assert_eq!(config.cache.namespace, "svc");
        assert_eq!(config.cache.ttl_secs, 300);
    }

    #[test]
    fn test_env_overrides() {
        let vars = HashMap::from([
            ("USERCLIENT__RETRY__MAX_ATTEMPTS".to_string(), "7".to_string()),
            (
                "USERCLIENT__NOTIFICATIONS__CHANNEL".to_string(),
                "user-events".to_string(),
            ),
        ]);
        let config = loader::load_config_with_env(Some("missing.toml"), vars).unwrap();
        assert_eq!(config.retry.max_attempts, 7);
        assert_eq!(config.notifications.channel, "user-events");
    }

    #[test]
    fn test_env_override_is_validated() {
        let vars = HashMap::from([(
            "USERCLIENT__RETRY__MAX_ATTEMPTS".to_string(),
            "0".to_string(),
        )]);
        let result = loader::load_config_with_env(Some("missing.toml"), vars);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
