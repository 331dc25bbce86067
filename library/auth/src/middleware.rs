//! axum 用の認証・認可ミドルウェア。

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::claims::AuthenticatedUser;
use crate::role::Role;
use crate::token::{TokenError, TokenService};

/// ミドルウェアファクトリの戻り値型。
type AuthMiddlewareFuture = std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Response, AuthErrorResponse>> + Send>,
>;

/// AuthState はミドルウェアが使用する共有状態。
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
}

/// auth_middleware はアクセストークン認証ミドルウェア。
/// Authorization ヘッダーから Bearer トークンを取得して検証し、
/// 成功時は AuthenticatedUser をリクエストエクステンションに格納する。
///
/// ステータスの対応: ヘッダー欠落・期限切れは 401、署名・構造が不正な
/// トークンは 403。クライアントはこの区別でリフレッシュを試みるか
/// 再ログインさせるかを判断する。
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthErrorResponse> {
    let token = extract_bearer_token(&req)?;

    let claims = state.tokens.verify_access_token(&token).map_err(|e| {
        tracing::debug!(error = %e, "access token verification failed");
        AuthErrorResponse::from_token_error(e)
    })?;

    req.extensions_mut().insert(AuthenticatedUser::from(claims));

    Ok(next.run(req).await)
}

/// require_role は許可ロール集合を必須とするミドルウェアファクトリ。
/// auth_middleware の後に使用すること。
pub fn require_role(
    allowed: &'static [Role],
) -> impl Fn(Request<Body>, Next) -> AuthMiddlewareFuture + Clone {
    move |req: Request<Body>, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<AuthenticatedUser>()
                .ok_or_else(AuthErrorResponse::unauthenticated)?;

            if !allowed.contains(&user.role) {
                return Err(AuthErrorResponse::forbidden());
            }

            Ok(next.run(req).await)
        })
    }
}

/// リクエストエクステンションから認証済みユーザーを取得する。
pub fn get_authenticated_user(req: &Request<Body>) -> Option<&AuthenticatedUser> {
    req.extensions().get::<AuthenticatedUser>()
}

/// Bearer トークンを Authorization ヘッダーから取得する。
fn extract_bearer_token(req: &Request<Body>) -> Result<String, AuthErrorResponse> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AuthErrorResponse::unauthenticated)?;

    let parts: Vec<&str> = auth_header.splitn(2, ' ').collect();
    if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("Bearer") {
        return Err(AuthErrorResponse::unauthenticated());
    }

    let token = parts[1].trim();
    if token.is_empty() {
        return Err(AuthErrorResponse::unauthenticated());
    }

    Ok(token.to_string())
}

/// AuthErrorResponse は認証エラーの HTTP レスポンス。
#[derive(Debug)]
pub struct AuthErrorResponse {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl AuthErrorResponse {
    /// TokenError を HTTP レスポンスへ対応付ける。
    /// WebSocket ハンドシェイクの検証でも同じ対応を使う。
    pub fn from_token_error(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self {
                status: StatusCode::UNAUTHORIZED,
                code: "TRK_AUTH_TOKEN_EXPIRED".into(),
                message: "トークンの有効期限が切れています".into(),
            },
            TokenError::Invalid(_) | TokenError::Misconfigured(_) => Self {
                status: StatusCode::FORBIDDEN,
                code: "TRK_AUTH_INVALID_TOKEN".into(),
                message: "トークンが無効です".into(),
            },
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "TRK_AUTH_UNAUTHENTICATED".into(),
            message: "認証が必要です".into(),
        }
    }

    fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "TRK_AUTH_FORBIDDEN".into(),
            message: "この操作を実行する権限がありません".into(),
        }
    }
}

impl IntoResponse for AuthErrorResponse {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.code,
            "message": self.message,
        });

        (self.status, Json(body)).into_response()
    }
}
