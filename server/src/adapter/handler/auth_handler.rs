use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use trackly_auth::TokenService;

use crate::error::ApiError;
use crate::realtime::{ConnectionRegistry, NotificationDispatcher};
use crate::usecase::login_user::{LoginUserInput, LoginUserUseCase};
use crate::usecase::logout_user::LogoutUserUseCase;
use crate::usecase::refresh_access_token::RefreshAccessTokenUseCase;
use crate::usecase::register_user::{RegisterUserInput, RegisterUserUseCase};

/// リフレッシュトークンを運ぶ Cookie 名。
pub const REFRESH_COOKIE: &str = "refreshToken";

#[derive(Clone)]
pub struct AppState {
    pub register_uc: Arc<RegisterUserUseCase>,
    pub login_uc: Arc<LoginUserUseCase>,
    pub refresh_uc: Arc<RefreshAccessTokenUseCase>,
    pub logout_uc: Arc<LogoutUserUseCase>,
    pub tokens: Arc<TokenService>,
    pub registry: Arc<ConnectionRegistry>,
    pub dispatcher: NotificationDispatcher,
    /// production では Cookie に Secure 属性を付与する
    pub production: bool,
}

fn error_response(err: ApiError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        ApiError::Validation(_) | ApiError::NoRefreshToken => StatusCode::BAD_REQUEST,
        ApiError::InvalidCredentials | ApiError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
        ApiError::EmailTaken => StatusCode::CONFLICT,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    // 内部エラーの詳細はログにのみ残し、クライアントには一般的な文言を返す
    let message = if let ApiError::Internal(ref detail) = err {
        tracing::error!(error = %detail, "internal error");
        "internal server error".to_string()
    } else {
        err.to_string()
    };

    (status, Json(serde_json::json!({"error": message})))
}

fn json_str(body: &serde_json::Value, key: &str) -> String {
    body.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// ログイン成功時のリフレッシュ Cookie を組み立てる。
fn refresh_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Cookie を失効させるための削除用 Cookie。属性は設定時と一致させる。
fn removal_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, "")).path("/").build()
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    let input = RegisterUserInput {
        name: json_str(&body, "name"),
        email: json_str(&body, "email"),
        password: json_str(&body, "password"),
        role: body
            .get("role")
            .and_then(|v| v.as_str())
            .map(String::from),
    };

    match state.register_uc.execute(&input).await {
        Ok(_output) => (
            StatusCode::OK,
            Json(serde_json::json!({"message": "Registration Successful!"})),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let input = LoginUserInput {
        email: json_str(&body, "email"),
        password: json_str(&body, "password"),
    };

    match state.login_uc.execute(&input).await {
        Ok(output) => {
            let cookie = refresh_cookie(
                output.refresh_token,
                output.refresh_max_age_secs,
                state.production,
            );
            (
                StatusCode::CREATED,
                jar.add(cookie),
                Json(serde_json::json!({"accessToken": output.access_token})),
            )
                .into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(cookie) = jar.get(REFRESH_COOKIE) else {
        return error_response(ApiError::NoRefreshToken).into_response();
    };

    match state.refresh_uc.execute(cookie.value()).await {
        Ok(output) => (
            StatusCode::CREATED,
            Json(serde_json::json!({"accessToken": output.access_token})),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    // Cookie がなければ何もすることがない（冪等）
    let Some(cookie) = jar.get(REFRESH_COOKIE) else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let token = cookie.value().to_string();

    match state.logout_uc.execute(&token).await {
        Ok(()) => (
            StatusCode::CREATED,
            jar.remove(removal_cookie()),
            Json(serde_json::json!({"message": "Logout Successful"})),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
