//! JWT Claims 構造体。

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// AccessClaims はアクセストークンの Claims。
/// 短命で、リクエスト認可に必要な識別情報のみを持つ。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// ユーザーの一意識別子（UUID）
    pub sub: String,

    /// メールアドレス
    pub email: String,

    /// ロール（閉集合として検証される）
    pub role: Role,

    /// トークンの発行時刻（Unix タイムスタンプ）
    pub iat: i64,

    /// トークンの有効期限（Unix タイムスタンプ）
    pub exp: i64,
}

/// RefreshClaims はリフレッシュトークンの Claims。
/// ユーザー ID 以外の情報は持たない。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// ユーザーの一意識別子（UUID）
    pub sub: String,

    /// トークンの発行時刻（Unix タイムスタンプ）
    pub iat: i64,

    /// トークンの有効期限（Unix タイムスタンプ）
    pub exp: i64,
}

/// AuthenticatedUser は検証済みアクセストークンから導出されるリクエスト内アイデンティティ。
/// 認証ミドルウェアがリクエストエクステンションに格納する。
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub role: Role,
    pub email: String,
}

impl From<AccessClaims> for AuthenticatedUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            email: claims.email,
        }
    }
}

/// UnverifiedClaims は署名検証なしでデコードした Claims のサブセット。
/// クライアント側で自分自身のユーザー ID を知るためだけに使う。
/// サーバー側の認可判断に使ってはならない。
#[derive(Debug, Clone, Deserialize)]
pub struct UnverifiedClaims {
    #[serde(default)]
    pub sub: Option<String>,

    #[serde(default)]
    pub exp: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_user_from_claims() {
        let claims = AccessClaims {
            sub: "user-1".to_string(),
            email: "taro@example.com".to_string(),
            role: Role::Manager,
            iat: 1_000_000_000,
            exp: 9_999_999_999,
        };
        let user = AuthenticatedUser::from(claims);
        assert_eq!(user.id, "user-1");
        assert_eq!(user.role, Role::Manager);
        assert_eq!(user.email, "taro@example.com");
    }

    #[test]
    fn test_unverified_claims_tolerates_missing_fields() {
        let claims: UnverifiedClaims = serde_json::from_str("{}").unwrap();
        assert!(claims.sub.is_none());
        assert!(claims.exp.is_none());
    }
}
