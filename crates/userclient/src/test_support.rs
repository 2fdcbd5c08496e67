//! Scripted `RemoteClient` for unit tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use userclient_core::{RemoteClient, RevokedToken, User, UserClientError, UserClientResult};

type Handler<A, T> = Box<dyn Fn(A) -> UserClientResult<T> + Send + Sync>;

fn not_scripted<A, T>(op: &'static str) -> Handler<A, T> {
    Box::new(move |_| Err(UserClientError::transport(format!("{op} not scripted"))))
}

pub(crate) struct MockRemoteClient {
    authenticate: Handler<(String, String), String>,
    fetch_self: Handler<String, Option<User>>,
    logout: Handler<String, ()>,
    fetch_by_id: Handler<(String, String), User>,
    fetch_all: Handler<String, Vec<User>>,
    revoked_tokens: Handler<String, Vec<RevokedToken>>,
    authenticate_delay: Duration,
    calls: Mutex<HashMap<&'static str, usize>>,
    tokens: Mutex<Vec<String>>,
}

impl Default for MockRemoteClient {
    fn default() -> Self {
        Self {
            authenticate: not_scripted("authenticate"),
            fetch_self: not_scripted("fetch_self"),
            logout: Box::new(|_| Ok(())),
            fetch_by_id: not_scripted("fetch_by_id"),
            fetch_all: not_scripted("fetch_all"),
            revoked_tokens: not_scripted("revoked_tokens"),
            authenticate_delay: Duration::ZERO,
            calls: Mutex::new(HashMap::new()),
            tokens: Mutex::new(Vec::new()),
        }
    }
}

impl MockRemoteClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_authenticate(
        mut self,
        f: impl Fn(&str, &str) -> UserClientResult<String> + Send + Sync + 'static,
    ) -> Self {
        self.authenticate = Box::new(move |(u, p)| f(&u, &p));
        self
    }

    /// Makes `authenticate` take `delay` before answering.
    pub(crate) fn with_authenticate_delay(mut self, delay: Duration) -> Self {
        self.authenticate_delay = delay;
        self
    }

    pub(crate) fn with_fetch_self(
        mut self,
        f: impl Fn(&str) -> UserClientResult<Option<User>> + Send + Sync + 'static,
    ) -> Self {
        self.fetch_self = Box::new(move |t| f(&t));
        self
    }

    pub(crate) fn with_logout(
        mut self,
        f: impl Fn(&str) -> UserClientResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.logout = Box::new(move |t| f(&t));
        self
    }

    pub(crate) fn with_fetch_by_id(
        mut self,
        f: impl Fn(&str, &str) -> UserClientResult<User> + Send + Sync + 'static,
    ) -> Self {
        self.fetch_by_id = Box::new(move |(t, id)| f(&t, &id));
        self
    }

    pub(crate) fn with_fetch_all(
        mut self,
        f: impl Fn(&str) -> UserClientResult<Vec<User>> + Send + Sync + 'static,
    ) -> Self {
        self.fetch_all = Box::new(move |t| f(&t));
        self
    }

    pub(crate) fn with_revoked_tokens(
        mut self,
        f: impl Fn(&str) -> UserClientResult<Vec<RevokedToken>> + Send + Sync + 'static,
    ) -> Self {
        self.revoked_tokens = Box::new(move |t| f(&t));
        self
    }

    /// Number of times `op` reached this client.
    pub(crate) fn calls(&self, op: &str) -> usize {
        self.calls.lock().get(op).copied().unwrap_or(0)
    }

    /// Tokens presented to token-bearing operations, in call order.
    pub(crate) fn tokens_seen(&self) -> Vec<String> {
        self.tokens.lock().clone()
    }

    fn record(&self, op: &'static str, token: Option<&str>) {
        *self.calls.lock().entry(op).or_insert(0) += 1;
        if let Some(token) = token {
            self.tokens.lock().push(token.to_string());
        }
    }
}

#[async_trait]
impl RemoteClient for MockRemoteClient {
    async fn authenticate(&self, username: &str, password: &str) -> UserClientResult<String> {
        self.record("authenticate", None);
        if !self.authenticate_delay.is_zero() {
            tokio::time::sleep(self.authenticate_delay).await;
        }
        (self.authenticate)((username.to_string(), password.to_string()))
    }

    async fn fetch_self(&self, token: &str) -> UserClientResult<Option<User>> {
        self.record("fetch_self", Some(token));
        (self.fetch_self)(token.to_string())
    }

    async fn logout(&self, token: &str) -> UserClientResult<()> {
        self.record("logout", Some(token));
        (self.logout)(token.to_string())
    }

    async fn fetch_by_id(&self, token: &str, user_id: &str) -> UserClientResult<User> {
        self.record("fetch_by_id", Some(token));
        (self.fetch_by_id)((token.to_string(), user_id.to_string()))
    }

    async fn fetch_all(&self, token: &str) -> UserClientResult<Vec<User>> {
        self.record("fetch_all", Some(token));
        (self.fetch_all)(token.to_string())
    }

    async fn revoked_tokens(&self, token: &str) -> UserClientResult<Vec<RevokedToken>> {
        self.record("revoked_tokens", Some(token));
        (self.revoked_tokens)(token.to_string())
    }
}

pub(crate) fn user(id: &str) -> User {
    User {
        id: id.to_string(),
        username: format!("user-{id}"),
        email: format!("{id}@example.com"),
        active: true,
        roles: vec!["Admin".to_string()],
        ..User::default()
    }
}
