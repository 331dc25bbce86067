//! ロール定義。Admin / Manager / User の閉じた集合として型レベルで強制する。

use serde::{Deserialize, Serialize};

/// Role はユーザーのロールを表す。
/// 登録入力・トークンデコードの両方の境界でこの列挙型として検証される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    User,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "Admin"),
            Role::Manager => write!(f, "Manager"),
            Role::User => write!(f, "User"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Manager" => Ok(Role::Manager),
            "User" => Ok(Role::User),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_default_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_from_str_known_roles() {
        assert_eq!(Role::from_str("Admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("Manager").unwrap(), Role::Manager);
        assert_eq!(Role::from_str("User").unwrap(), Role::User);
    }

    #[test]
    fn test_from_str_unknown_role() {
        assert!(Role::from_str("Superuser").is_err());
        assert!(Role::from_str("admin").is_err());
        assert!(Role::from_str("").is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "\"Manager\"");
        let role: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(role, Role::Manager);
    }

    #[test]
    fn test_serde_rejects_unknown() {
        let result: Result<Role, _> = serde_json::from_str("\"Root\"");
        assert!(result.is_err());
    }
}
