//! trackly-websocket: サーバー・クライアント間で共有するリアルタイムチャネルの語彙。
//!
//! サーバーが push するイベントフレーム（イベント名 + JSON ペイロード）、
//! 接続状態、再接続ポリシー付きのクライアント設定、およびテスト用の
//! インメモリ実装を持つクライアントトレイトを提供する。
//! 配送は at-most-once・ベストエフォートで、切断中のイベントは再送されない。

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod state;

#[cfg(feature = "native")]
pub mod native;

pub use client::{InMemoryWsClient, WsClient};
pub use config::WsConfig;
pub use error::WsError;
pub use message::{EventFrame, TaskAssignedPayload, TaskDeletedPayload};
pub use state::ConnectionState;

#[cfg(feature = "native")]
pub use native::TungsteniteWsClient;
