use async_trait::async_trait;

use crate::domain::entity::user::User;
use crate::error::ApiError;

/// UserRepository は資格情報ストアの抽象。
/// リフレッシュトークンの上書き保存が唯一の競合点で、
/// 同一ユーザーへの同時ログインは last-writer-wins で解決される。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, user: &User) -> Result<(), ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_refresh_token_hash(&self, digest: &str) -> Result<Option<User>, ApiError>;
}
