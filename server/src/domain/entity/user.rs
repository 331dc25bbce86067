use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use trackly_auth::Role;

/// User は資格情報ストアに保存されるユーザーレコード。
/// refresh_token_hash には現在有効なリフレッシュトークンの SHA-256 ダイジェストを
/// 1 つだけ保持する（追記ではなく上書き）。ログインのたびに上書きされるため、
/// 同一ユーザーの有効セッションは常に 1 つ。
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: &str, email: &str, password_hash: &str, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 新しいリフレッシュトークンのダイジェストを保存する。
    /// 以前のトークンはこの上書きによって失効する。
    pub fn rotate_refresh_token(&mut self, digest: String) {
        self.refresh_token_hash = Some(digest);
        self.updated_at = Utc::now();
    }

    /// リフレッシュトークンをクリアし、サーバー側のセッションを終了する。
    pub fn clear_refresh_token(&mut self) {
        self.refresh_token_hash = None;
        self.updated_at = Utc::now();
    }

    /// 提示されたトークンのダイジェストが保存値と一致するか。
    /// 保存値がない（ログアウト済み）場合は常に false。
    pub fn matches_refresh_digest(&self, digest: &str) -> bool {
        self.refresh_token_hash.as_deref() == Some(digest)
    }
}

/// リフレッシュトークンの保存用ダイジェストを計算する。
/// ストアには生のトークン値を置かない。
pub fn refresh_token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user() -> User {
        User::new("taro", "taro@example.com", "$argon2id$stub", Role::User)
    }

    #[test]
    fn test_new_user_has_no_refresh_token() {
        let user = make_user();
        assert!(user.refresh_token_hash.is_none());
        assert!(!user.id.is_empty());
    }

    #[test]
    fn test_rotate_overwrites_previous_digest() {
        let mut user = make_user();
        let first = refresh_token_digest("token-a");
        let second = refresh_token_digest("token-b");

        user.rotate_refresh_token(first.clone());
        assert!(user.matches_refresh_digest(&first));

        user.rotate_refresh_token(second.clone());
        assert!(user.matches_refresh_digest(&second));
        // 古いトークンは上書きにより失効する
        assert!(!user.matches_refresh_digest(&first));
    }

    #[test]
    fn test_clear_ends_session() {
        let mut user = make_user();
        let digest = refresh_token_digest("token-a");
        user.rotate_refresh_token(digest.clone());
        user.clear_refresh_token();
        assert!(!user.matches_refresh_digest(&digest));
        assert!(user.refresh_token_hash.is_none());
    }

    #[test]
    fn test_digest_is_deterministic_and_opaque() {
        let d1 = refresh_token_digest("same-token");
        let d2 = refresh_token_digest("same-token");
        assert_eq!(d1, d2);
        assert_ne!(d1, "same-token");
        assert_eq!(d1.len(), 64);
    }
}
