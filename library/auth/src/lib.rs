//! trackly-auth: アクセストークン / リフレッシュトークンの発行・検証と
//! axum 用の認証・認可ミドルウェアを提供するライブラリ。
//!
//! アクセストークンとリフレッシュトークンは別々のシークレットで HS256 署名され、
//! 相互に検証できない。有効期限の扱いは leeway なしの厳密判定。
//!
//! # 使い方
//!
//! ```ignore
//! use trackly_auth::{Role, TokenService};
//!
//! let tokens = TokenService::new(&access_secret, &refresh_secret, 900, 604_800)?;
//! let access = tokens.issue_access_token("user-1", "taro@example.com", Role::User)?;
//! let claims = tokens.verify_access_token(&access)?;
//! ```

pub mod claims;
pub mod middleware;
pub mod role;
pub mod token;

pub use claims::{AccessClaims, AuthenticatedUser, RefreshClaims, UnverifiedClaims};
pub use middleware::{auth_middleware, require_role, AuthErrorResponse, AuthState};
pub use role::Role;
pub use token::{decode_unverified, TokenError, TokenService};

#[cfg(test)]
mod tests;
