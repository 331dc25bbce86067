use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use trackly_auth::AuthenticatedUser;

use super::auth_handler::AppState;

/// 認証済みアイデンティティをそのまま返す。
/// 認可ミドルウェアの契約（id / role / email）を外部に見せる唯一の窓。
pub async fn me(Extension(user): Extension<AuthenticatedUser>) -> impl IntoResponse {
    Json(serde_json::json!({
        "id": user.id,
        "role": user.role,
        "email": user.email,
    }))
}

/// 現在オンラインの接続数。Admin 専用の診断用エンドポイント。
pub async fn admin_connections(State(state): State<AppState>) -> impl IntoResponse {
    let online = state.registry.online_count().await;
    Json(serde_json::json!({"online": online}))
}
