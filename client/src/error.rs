use thiserror::Error;

use trackly_websocket::WsError;

/// ClientError はクライアントライブラリのエラーを表す。
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// サーバーが返したエラーレスポンス
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// リフレッシュに失敗し、ローカルセッションは破棄された。
    /// 呼び出し側は未認証状態として扱い、再ログインさせること。
    #[error("session expired")]
    SessionExpired,

    #[error("failed to parse response: {0}")]
    Parse(String),

    #[error("realtime channel error: {0}")]
    Ws(#[from] WsError),
}
