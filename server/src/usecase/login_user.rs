use std::sync::Arc;

use trackly_auth::TokenService;

use crate::domain::entity::user::refresh_token_digest;
use crate::domain::repository::UserRepository;
use crate::error::ApiError;
use crate::infrastructure::password;

#[derive(Debug, Clone)]
pub struct LoginUserInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginUserOutput {
    pub access_token: String,
    /// Cookie に載せる生のリフレッシュトークン。ストアにはダイジェストのみ保存される。
    pub refresh_token: String,
    pub refresh_max_age_secs: i64,
}

/// LoginUserUseCase は資格情報を検証してトークンを発行する。
/// 発行したリフレッシュトークンのダイジェストをユーザーレコードに上書き保存するため、
/// 同一ユーザーの既存セッションはすべて失効する（single-session-per-user）。
pub struct LoginUserUseCase {
    repo: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl LoginUserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    pub async fn execute(&self, input: &LoginUserInput) -> Result<LoginUserOutput, ApiError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(ApiError::Validation("email, password".to_string()));
        }

        // メール不明とパスワード不一致は同じエラーにする（アカウント列挙対策）
        let mut user = self
            .repo
            .find_by_email(&input.email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !password::verify_password(&input.password, &user.password_hash)? {
            return Err(ApiError::InvalidCredentials);
        }

        let access_token = self
            .tokens
            .issue_access_token(&user.id, &user.email, user.role)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let refresh_token = self
            .tokens
            .issue_refresh_token(&user.id)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        user.rotate_refresh_token(refresh_token_digest(&refresh_token));
        self.repo.save(&user).await?;

        Ok(LoginUserOutput {
            access_token,
            refresh_token,
            refresh_max_age_secs: self.tokens.refresh_ttl_secs(),
        })
    }
}
