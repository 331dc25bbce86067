//! PostgreSQL ベースの資格情報ストア。

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use trackly_auth::Role;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::ApiError;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// UserRow は users テーブルの行を表す中間構造体。
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    refresh_token_hash: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = ApiError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        // ロールは閉集合。ストア上の不正値は設定異常として扱う
        let role = Role::from_str(&row.role)
            .map_err(|e| ApiError::Internal(format!("invalid role in store: {e}")))?;

        Ok(User {
            id: row.id.to_string(),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            refresh_token_hash: row.refresh_token_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, name, email, password_hash, role, refresh_token_hash, created_at, updated_at";

fn parse_uuid(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|e| ApiError::Internal(format!("invalid user ID format: {e}")))
}

fn db_error(e: sqlx::Error) -> ApiError {
    // email のユニーク制約違反は重複登録として表面化させる
    if let sqlx::Error::Database(ref db) = e {
        if db.constraint() == Some("users_email_key") {
            return ApiError::EmailTaken;
        }
    }
    ApiError::Internal(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> Result<(), ApiError> {
        let id = parse_uuid(&user.id)?;
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, refresh_token_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                role = EXCLUDED.role,
                refresh_token_hash = EXCLUDED.refresh_token_hash,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.refresh_token_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        let uuid = match Uuid::parse_str(id) {
            Ok(uuid) => uuid,
            // トークン由来の ID が UUID でなければ該当ユーザーなし
            Err(_) => return Ok(None),
        };

        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_refresh_token_hash(&self, digest: &str) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE refresh_token_hash = $1"
        ))
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(User::try_from).transpose()
    }
}
