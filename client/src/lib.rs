//! trackly-client: trackly API の Rust クライアント。
//!
//! - SessionManager: アクセストークンの付与と single-flight リフレッシュ。
//!   同時に複数のリクエストが期限切れ応答を受けても、サーバーへの
//!   リフレッシュ呼び出しは 1 回に収まる。
//! - RealtimeSubscriber: タスク割り当て通知の購読。固定ディレイ・
//!   回数上限付きの再接続。
//!
//! # 使い方
//!
//! ```ignore
//! use std::sync::Arc;
//! use trackly_client::{ReqwestApiClient, SessionManager};
//!
//! let http = Arc::new(ReqwestApiClient::new()?);
//! let session = SessionManager::new("http://localhost:5000", http);
//! session.login("taro@example.com", "pw123").await?;
//! let me = session.me().await?;
//! ```

pub mod error;
pub mod http;
pub mod session;
pub mod subscriber;

pub use error::ClientError;
pub use http::{ApiHttpClient, ApiResponse, HttpMethod, ReqwestApiClient};
pub use session::{SessionManager, SessionState};
pub use subscriber::{RealtimeSubscriber, TaskNotice};
