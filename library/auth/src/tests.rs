//! ミドルウェアの結合テスト。ルーター越しに認証・認可の挙動を確認する。

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::{middleware as axum_middleware, Extension, Json, Router};
use secrecy::SecretString;
use tower::ServiceExt;

use crate::claims::AuthenticatedUser;
use crate::middleware::{auth_middleware, require_role, AuthState};
use crate::role::Role;
use crate::token::TokenService;

fn token_service() -> Arc<TokenService> {
    Arc::new(
        TokenService::new(
            &SecretString::new("test-access-secret".to_string()),
            &SecretString::new("test-refresh-secret".to_string()),
            900,
            604_800,
        )
        .unwrap(),
    )
}

async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "id": user.id, "role": user.role, "email": user.email }))
}

fn app(tokens: Arc<TokenService>) -> Router {
    let state = AuthState {
        tokens: tokens.clone(),
    };

    let admin_routes = Router::new()
        .route("/admin", get(whoami))
        .route_layer(axum_middleware::from_fn(require_role(&[Role::Admin])));

    Router::new()
        .route("/me", get(whoami))
        .merge(admin_routes)
        .layer(axum_middleware::from_fn_with_state(state, auth_middleware))
}

async fn get_with_bearer(app: Router, path: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(path);
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Bearer {t}"));
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn missing_header_is_unauthenticated() {
    let (status, body) = get_with_bearer(app(token_service()), "/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TRK_AUTH_UNAUTHENTICATED");
}

#[tokio::test]
async fn malformed_header_is_unauthenticated() {
    let tokens = token_service();
    let app = app(tokens.clone());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .header("Authorization", "Token abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_reaches_handler_with_identity() {
    let tokens = token_service();
    let token = tokens
        .issue_access_token("user-1", "taro@example.com", Role::User)
        .unwrap();
    let (status, body) = get_with_bearer(app(tokens), "/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "user-1");
    assert_eq!(body["role"], "User");
    assert_eq!(body["email"], "taro@example.com");
}

#[tokio::test]
async fn expired_token_maps_to_401() {
    let short = Arc::new(
        TokenService::new(
            &SecretString::new("test-access-secret".to_string()),
            &SecretString::new("test-refresh-secret".to_string()),
            1,
            604_800,
        )
        .unwrap(),
    );
    let token = short
        .issue_access_token("user-1", "taro@example.com", Role::User)
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let (status, body) = get_with_bearer(app(short), "/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TRK_AUTH_TOKEN_EXPIRED");
}

#[tokio::test]
async fn tampered_token_maps_to_403() {
    let tokens = token_service();
    let mut token = tokens
        .issue_access_token("user-1", "taro@example.com", Role::User)
        .unwrap();
    token.push('x');
    let (status, body) = get_with_bearer(app(tokens), "/me", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "TRK_AUTH_INVALID_TOKEN");
}

#[tokio::test]
async fn role_gate_rejects_non_admin() {
    let tokens = token_service();
    let token = tokens
        .issue_access_token("user-1", "taro@example.com", Role::User)
        .unwrap();
    let (status, body) = get_with_bearer(app(tokens), "/admin", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "TRK_AUTH_FORBIDDEN");
}

#[tokio::test]
async fn role_gate_admits_admin() {
    let tokens = token_service();
    let token = tokens
        .issue_access_token("admin-1", "jiro@example.com", Role::Admin)
        .unwrap();
    let (status, body) = get_with_bearer(app(tokens), "/admin", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "Admin");
}
