//! HTTP implementation of [`RemoteClient`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use userclient_core::{
    Platform, RemoteClient, RevokedToken, User, UserClientError, UserClientResult,
};

use crate::config::ServiceConfig;

const AUTHENTICATE_PATH: &str = "/authenticate";
const ME_PATH: &str = "/me";
const LOGOUT_PATH: &str = "/logout";
const USERS_PATH: &str = "/users";
const ALL_USERS_PAGE_SIZE: &str = "10000";
const REVOKED_TOKENS_PATH: &str = "/revoked-tokens";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// `{"data": ...}` envelope wrapping every service response.
#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// Talks to the user service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRemoteClient {
    pub fn new(base_url: &str, timeout: Duration) -> UserClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UserClientError::transport(e.to_string()))?;
        Ok(Self::with_http(http, base_url))
    }

    /// Uses an existing reqwest client.
    pub fn with_http(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> UserClientResult<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http.request(method, self.url(path)).bearer_auth(token)
    }

    /// Sends the request and rejects every status other than 200.
    async fn send(&self, req: RequestBuilder) -> UserClientResult<reqwest::Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| UserClientError::transport(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            debug!(
                status = status.as_u16(),
                url = %resp.url().path(),
                "user service rejected request"
            );
            return Err(UserClientError::from_status(status.as_u16()));
        }
        Ok(resp)
    }

    async fn read_data<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> UserClientResult<Option<T>> {
        let resp = self.send(req).await?;
        let envelope: Envelope<T> = resp
            .json()
            .await
            .map_err(|e| UserClientError::decode(e.to_string()))?;
        Ok(envelope.data)
    }

    async fn platforms(&self, token: &str, user_id: &str) -> UserClientResult<Vec<String>> {
        let path = format!("{USERS_PATH}/{user_id}/platforms");
        let platforms: Vec<Platform> = self
            .read_data(self.request(Method::GET, &path, token))
            .await?
            .unwrap_or_default();
        Ok(platforms.into_iter().map(|p| p.name).collect())
    }

    /// Fills `platform_names`. A failed lookup leaves the list empty.
    async fn attach_platforms(&self, token: &str, user: &mut User) {
        match self.platforms(token, &user.id).await {
            Ok(names) => user.platform_names = names,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "platform lookup failed");
                user.platform_names.clear();
            }
        }
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn authenticate(&self, username: &str, password: &str) -> UserClientResult<String> {
        let req = self
            .http
            .post(self.url(AUTHENTICATE_PATH))
            .json(&serde_json::json!({ "username": username, "password": password }));
        let body: Value = self
            .send(req)
            .await?
            .json()
            .await
            .map_err(|e| UserClientError::decode(e.to_string()))?;

        match body.get("token").and_then(Value::as_str) {
            Some(token) => Ok(token.to_string()),
            None => Err(UserClientError::MissingToken),
        }
    }

    async fn fetch_self(&self, token: &str) -> UserClientResult<Option<User>> {
        let user: Option<User> = self
            .read_data(self.request(Method::GET, ME_PATH, token))
            .await?;
        let Some(mut user) = user else {
            return Ok(None);
        };
        self.attach_platforms(token, &mut user).await;
        Ok(Some(user))
    }

    async fn logout(&self, token: &str) -> UserClientResult<()> {
        self.send(self.request(Method::POST, LOGOUT_PATH, token))
            .await?;
        Ok(())
    }

    async fn fetch_by_id(&self, token: &str, user_id: &str) -> UserClientResult<User> {
        let path = format!("{USERS_PATH}/{user_id}");
        let mut user: User = self
            .read_data(self.request(Method::GET, &path, token))
            .await?
            .ok_or(UserClientError::NotFound)?;
        self.attach_platforms(token, &mut user).await;
        Ok(user)
    }

    async fn fetch_all(&self, token: &str) -> UserClientResult<Vec<User>> {
        let req = self
            .request(Method::GET, USERS_PATH, token)
            .query(&[("per_page", ALL_USERS_PAGE_SIZE)]);
        Ok(self.read_data(req).await?.unwrap_or_default())
    }

    async fn revoked_tokens(&self, token: &str) -> UserClientResult<Vec<RevokedToken>> {
        let req = self.request(Method::GET, REVOKED_TOKENS_PATH, token);
        Ok(self.read_data(req).await?.unwrap_or_default())
    }
}
