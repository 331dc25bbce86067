use thiserror::Error;

/// ApiError は認証サブシステム全体のエラー分類。
/// サーバーはどの失敗もリトライせず、即座に終端レスポンスへ対応付ける。
#[derive(Debug, Error)]
pub enum ApiError {
    /// 入力不備（クライアント側で修正可能）
    #[error("all fields are required")]
    Validation(String),
    /// 資格情報不正。メール不明とパスワード不一致は呼び出し側から区別できない。
    #[error("invalid email or password")]
    InvalidCredentials,
    /// メールアドレス重複
    #[error("email already exists")]
    EmailTaken,
    /// リフレッシュ Cookie なし
    #[error("no refresh token")]
    NoRefreshToken,
    /// リフレッシュトークンの検証失敗・失効。偽造と失効は区別できない。
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}
