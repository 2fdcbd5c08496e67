//! Integration tests for the axum authentication and role middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    middleware::from_fn_with_state,
    routing::get,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use userclient::{
    AuthGate, CurrentUser, HttpRemoteClient, RequestScope, RequiredRoles, RetryConfig,
    require_roles, require_user,
};
use wiremock::matchers::{header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn whoami(CurrentUser(user): CurrentUser, scope: RequestScope) -> Json<Value> {
    Json(json!({"id": user.id, "token": scope.token()}))
}

fn app(server: &MockServer, retry: RetryConfig) -> Router {
    let remote = HttpRemoteClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
    let gate = Arc::new(AuthGate::new(Arc::new(remote), retry));

    let admin = Router::new()
        .route("/admin", get(whoami))
        .layer(from_fn_with_state(RequiredRoles::new(["Admin"]), require_roles));

    Router::new()
        .route("/me", get(whoami))
        .merge(admin)
        .layer(from_fn_with_state(gate, require_user))
}

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        wait_ms: 1,
    }
}

async fn mount_user(server: &MockServer, token: &str, roles: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header_matcher("Authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "u1", "username": "jane", "roles": roles}
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/u1/platforms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(server)
        .await;
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_bearer_token_authenticates() {
    let server = MockServer::start().await;
    mount_user(&server, "good", &["Admin"]).await;

    let response = app(&server, fast_retry())
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::AUTHORIZATION, "Bearer good")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], "u1");
    assert_eq!(body["token"], "good");
}

#[tokio::test]
async fn test_query_token_authenticates() {
    let server = MockServer::start().await;
    mount_user(&server, "from-query", &["Admin"]).await;

    let response = app(&server, fast_retry())
        .oneshot(
            Request::builder()
                .uri("/me?token=from-query")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized_without_remote_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = app(&server, fast_retry())
        .oneshot(Request::builder().uri("/me").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let response = app(&server, fast_retry())
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::AUTHORIZATION, "Bearer stale")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_unavailable_service_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let response = app(&server, fast_retry())
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::AUTHORIZATION, "Bearer tok")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Service is unavailable");
}

#[tokio::test]
async fn test_role_gate_forbids_missing_role() {
    let server = MockServer::start().await;
    mount_user(&server, "tok", &["Return"]).await;

    let response = app(&server, fast_retry())
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(header::AUTHORIZATION, "Bearer tok")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_gate_allows_matching_role() {
    let server = MockServer::start().await;
    mount_user(&server, "tok", &["Return", "Admin"]).await;

    let response = app(&server, fast_retry())
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(header::AUTHORIZATION, "Bearer tok")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], "u1");
}

#[tokio::test]
async fn test_role_gate_without_user_is_unauthorized() {
    let app = Router::new()
        .route("/admin", get(|| async { "ok" }))
        .layer(from_fn_with_state(RequiredRoles::new(["Admin"]), require_roles));

    let response = app
        .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
