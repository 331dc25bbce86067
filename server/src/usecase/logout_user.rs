use std::sync::Arc;

use crate::domain::entity::user::refresh_token_digest;
use crate::domain::repository::UserRepository;
use crate::error::ApiError;

/// LogoutUserUseCase はサーバー側のセッションを終了する。
/// 冪等であり、トークンがどのユーザーにも対応しない場合も成功する
/// （ログアウト済みはエラーではない）。
pub struct LogoutUserUseCase {
    repo: Arc<dyn UserRepository>,
}

impl LogoutUserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, refresh_token: &str) -> Result<(), ApiError> {
        let digest = refresh_token_digest(refresh_token);

        if let Some(mut user) = self.repo.find_by_refresh_token_hash(&digest).await? {
            user.clear_refresh_token();
            self.repo.save(&user).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::User;
    use crate::domain::repository::user_repository::MockUserRepository;
    use trackly_auth::Role;

    #[tokio::test]
    async fn clears_stored_token() {
        let mut user = User::new("alice", "alice@example.com", "$argon2id$stub", Role::User);
        user.rotate_refresh_token(refresh_token_digest("refresh-1"));
        let user_clone = user.clone();

        let mut mock = MockUserRepository::new();
        mock.expect_find_by_refresh_token_hash()
            .returning(move |_| Ok(Some(user_clone.clone())));
        mock.expect_save()
            .withf(|user| user.refresh_token_hash.is_none())
            .returning(|_| Ok(()));

        let uc = LogoutUserUseCase::new(Arc::new(mock));
        uc.execute("refresh-1").await.unwrap();
    }

    #[tokio::test]
    async fn unknown_token_is_still_success() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_refresh_token_hash()
            .returning(|_| Ok(None));

        let uc = LogoutUserUseCase::new(Arc::new(mock));
        assert!(uc.execute("already-logged-out").await.is_ok());
    }
}
