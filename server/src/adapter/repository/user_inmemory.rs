//! インメモリの資格情報ストア。
//! データベース未設定時のフォールバックとテストで使用する。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::ApiError;

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> Result<(), ApiError> {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_by_refresh_token_hash(&self, digest: &str) -> Result<Option<User>, ApiError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.refresh_token_hash.as_deref() == Some(digest))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::refresh_token_digest;
    use trackly_auth::Role;

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = InMemoryUserRepository::new();
        let user = User::new("alice", "alice@example.com", "$argon2id$stub", Role::User);
        repo.save(&user).await.unwrap();

        assert!(repo.find_by_id(&user.id).await.unwrap().is_some());
        assert!(repo
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .is_some());
        assert!(repo.find_by_email("ghost@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_by_id() {
        let repo = InMemoryUserRepository::new();
        let mut user = User::new("alice", "alice@example.com", "$argon2id$stub", Role::User);
        repo.save(&user).await.unwrap();

        let digest = refresh_token_digest("refresh-1");
        user.rotate_refresh_token(digest.clone());
        repo.save(&user).await.unwrap();

        let found = repo
            .find_by_refresh_token_hash(&digest)
            .await
            .unwrap()
            .expect("found by digest");
        assert_eq!(found.id, user.id);
    }
}
