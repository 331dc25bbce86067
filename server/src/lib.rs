//! trackly-server: タスクトラッカーの認証・セッション更新プロトコルと
//! リアルタイム通知サブシステム。
//!
//! - 短命アクセストークン + 長命リフレッシュトークン（Cookie 配送、
//!   サーバー側ダイジェスト照合による失効）
//! - ユーザー ID と生きている接続を対応付ける ConnectionRegistry と、
//!   ベストエフォート配送の NotificationDispatcher
//!
//! タスク CRUD・分析・監査ログは本クレートの外側の協力者であり、
//! ここでは扱わない。

pub mod adapter;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod realtime;
pub mod router;
pub mod usecase;

pub use adapter::handler::auth_handler::AppState;
pub use error::ApiError;
pub use router::build_router;
