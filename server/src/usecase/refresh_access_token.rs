use std::sync::Arc;

use trackly_auth::TokenService;

use crate::domain::entity::user::refresh_token_digest;
use crate::domain::repository::UserRepository;
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct RefreshAccessTokenOutput {
    pub access_token: String,
}

/// RefreshAccessTokenUseCase はリフレッシュトークンと引き換えに
/// 新しいアクセストークンを発行する。
///
/// トークンは署名・期限の検証に加えて、ユーザーレコードに保存された
/// ダイジェストとの一致が必要（失効チェック）。ログインや再ログインで
/// 上書きされた古いトークンはここで弾かれる。
/// リフレッシュトークン自体はローテーションしない（ローテーションは
/// ログイン時のみ）。
pub struct RefreshAccessTokenUseCase {
    repo: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl RefreshAccessTokenUseCase {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    pub async fn execute(&self, refresh_token: &str) -> Result<RefreshAccessTokenOutput, ApiError> {
        // 期限切れ・署名不正・失効はすべて同じエラー（偽造との区別を与えない）
        let claims = self
            .tokens
            .verify_refresh_token(refresh_token)
            .map_err(|_| ApiError::InvalidRefreshToken)?;

        let user = self
            .repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(ApiError::InvalidRefreshToken)?;

        if !user.matches_refresh_digest(&refresh_token_digest(refresh_token)) {
            return Err(ApiError::InvalidRefreshToken);
        }

        let access_token = self
            .tokens
            .issue_access_token(&user.id, &user.email, user.role)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(RefreshAccessTokenOutput { access_token })
    }
}
