//! TokenService: アクセストークンとリフレッシュトークンの発行・検証。
//!
//! 2 つのトークンは独立したシークレットで HS256 署名される。
//! アクセストークンをリフレッシュシークレットで検証すること（またはその逆）は
//! 必ず失敗する。

use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::claims::{AccessClaims, RefreshClaims, UnverifiedClaims};
use crate::role::Role;

/// TokenError はトークンの発行・検証エラーを表す。
#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token service misconfigured: {0}")]
    Misconfigured(String),
}

/// TokenService はトークンの発行・検証を行う。
/// シークレットは起動時に一度だけ検証され、空の場合は構築自体が失敗する
/// （実行時エラーにはならない）。
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    /// 新しい TokenService を生成する。
    pub fn new(
        access_secret: &SecretString,
        refresh_secret: &SecretString,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Result<Self, TokenError> {
        let access = access_secret.expose_secret();
        let refresh = refresh_secret.expose_secret();

        if access.is_empty() {
            return Err(TokenError::Misconfigured(
                "access token secret is empty".into(),
            ));
        }
        if refresh.is_empty() {
            return Err(TokenError::Misconfigured(
                "refresh token secret is empty".into(),
            ));
        }
        if access == refresh {
            return Err(TokenError::Misconfigured(
                "access and refresh secrets must differ".into(),
            ));
        }
        if access_ttl_secs <= 0 || refresh_ttl_secs <= 0 {
            return Err(TokenError::Misconfigured(
                "token lifetimes must be positive".into(),
            ));
        }

        Ok(Self {
            access_encoding: EncodingKey::from_secret(access.as_bytes()),
            access_decoding: DecodingKey::from_secret(access.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }

    /// アクセストークンを発行する。
    pub fn issue_access_token(
        &self,
        user_id: &str,
        email: &str,
        role: Role,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_ttl_secs)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// リフレッシュトークンを発行する。
    pub fn issue_refresh_token(&self, user_id: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.refresh_ttl_secs)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// アクセストークンを検証し、Claims を返す。
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        verify_with(token, &self.access_decoding)
    }

    /// リフレッシュトークンを検証し、Claims を返す。
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        verify_with(token, &self.refresh_decoding)
    }

    /// リフレッシュトークンの有効期間（秒）。Cookie の Max-Age に使う。
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    /// アクセストークンの有効期間（秒）。
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }
}

fn verify_with<C: DeserializeOwned>(token: &str, key: &DecodingKey) -> Result<C, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // 有効期限は秒単位で厳密に扱う
    validation.leeway = 0;

    match decode::<C>(token, key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(TokenError::Expired),
            _ => Err(TokenError::Invalid(e.to_string())),
        },
    }
}

/// 署名検証なしでペイロードをデコードする。
/// クライアントが自分のトークンからユーザー ID を取り出すためのもので、
/// 検証はサーバーの仕事。
pub fn decode_unverified(token: &str) -> Result<UnverifiedClaims, TokenError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| TokenError::Invalid("not a JWT".into()))?;

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| TokenError::Invalid(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Invalid(e.to_string()))
}
