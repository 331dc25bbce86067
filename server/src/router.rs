//! ルーター組み立て。結合テストからも使えるように main から分離している。

use axum::routing::{get, post};
use axum::{middleware, Router};

use trackly_auth::{auth_middleware, require_role, AuthState, Role};

use crate::adapter::handler::auth_handler::{self, AppState};
use crate::adapter::handler::{health, profile_handler, ws_handler};

pub fn build_router(state: AppState) -> Router {
    let auth_state = AuthState {
        tokens: state.tokens.clone(),
    };

    // 認証不要のエンドポイント
    let public_routes = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/api/auth/register", post(auth_handler::register))
        .route("/api/auth/login", post(auth_handler::login))
        .route("/api/auth/refresh", get(auth_handler::refresh))
        .route("/api/auth/logout", post(auth_handler::logout))
        // ハンドシェイク内でトークンを検証する
        .route("/ws", get(ws_handler::ws_handler));

    // Admin のみ
    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/connections",
            get(profile_handler::admin_connections),
        )
        .route_layer(middleware::from_fn(require_role(&[Role::Admin])));

    // Bearer トークン必須
    let protected_routes = Router::new()
        .route("/api/v1/me", get(profile_handler::me))
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    public_routes.merge(protected_routes).with_state(state)
}
