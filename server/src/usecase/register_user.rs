use std::str::FromStr;
use std::sync::Arc;

use trackly_auth::Role;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::ApiError;
use crate::infrastructure::password;

#[derive(Debug, Clone)]
pub struct RegisterUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterUserOutput {
    pub user_id: String,
}

/// RegisterUserUseCase はユーザーを登録する。ログインはしない。
pub struct RegisterUserUseCase {
    repo: Arc<dyn UserRepository>,
}

impl RegisterUserUseCase {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: &RegisterUserInput) -> Result<RegisterUserOutput, ApiError> {
        if input.name.trim().is_empty()
            || input.email.trim().is_empty()
            || input.password.is_empty()
        {
            return Err(ApiError::Validation("name, email, password".to_string()));
        }

        // ロールは閉集合として境界で検証する。未指定は User。
        let role = match &input.role {
            Some(r) => Role::from_str(r).map_err(ApiError::Validation)?,
            None => Role::default(),
        };

        if self.repo.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::EmailTaken);
        }

        let password_hash = password::hash_password(&input.password)?;
        let user = User::new(&input.name, &input.email, &password_hash, role);

        self.repo.save(&user).await?;

        Ok(RegisterUserOutput { user_id: user.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::user_repository::MockUserRepository;

    fn input(role: Option<&str>) -> RegisterUserInput {
        RegisterUserInput {
            name: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "pw123".to_string(),
            role: role.map(String::from),
        }
    }

    #[tokio::test]
    async fn success() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_email().returning(|_| Ok(None));
        mock.expect_save().returning(|_| Ok(()));

        let uc = RegisterUserUseCase::new(Arc::new(mock));
        let result = uc.execute(&input(None)).await.unwrap();
        assert!(!result.user_id.is_empty());
    }

    #[tokio::test]
    async fn stores_role_from_input() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_email().returning(|_| Ok(None));
        mock.expect_save()
            .withf(|user| user.role == Role::Manager && user.refresh_token_hash.is_none())
            .returning(|_| Ok(()));

        let uc = RegisterUserUseCase::new(Arc::new(mock));
        uc.execute(&input(Some("Manager"))).await.unwrap();
    }

    #[tokio::test]
    async fn missing_fields() {
        let mock = MockUserRepository::new();
        let uc = RegisterUserUseCase::new(Arc::new(mock));
        let result = uc
            .execute(&RegisterUserInput {
                name: String::new(),
                email: "alice@example.com".to_string(),
                password: "pw123".to_string(),
                role: None,
            })
            .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn unknown_role_rejected() {
        let mock = MockUserRepository::new();
        let uc = RegisterUserUseCase::new(Arc::new(mock));
        let result = uc.execute(&input(Some("Root"))).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn duplicate_email() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_email().returning(|_| {
            Ok(Some(User::new(
                "alice",
                "alice@example.com",
                "$argon2id$stub",
                Role::User,
            )))
        });

        let uc = RegisterUserUseCase::new(Arc::new(mock));
        let result = uc.execute(&input(None)).await;
        assert!(matches!(result, Err(ApiError::EmailTaken)));
    }

    #[tokio::test]
    async fn password_is_hashed_before_save() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_email().returning(|_| Ok(None));
        mock.expect_save()
            .withf(|user| user.password_hash != "pw123" && user.password_hash.starts_with("$argon2id$"))
            .returning(|_| Ok(()));

        let uc = RegisterUserUseCase::new(Arc::new(mock));
        uc.execute(&input(None)).await.unwrap();
    }
}
