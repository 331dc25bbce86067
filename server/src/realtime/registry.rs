//! オンラインユーザーと生きている接続の対応表。
//!
//! プロセスローカルな状態のみを持ち、永続化しない。再起動で全エントリが
//! 消え、クライアントは再接続する。内側のマップは外部に公開しない。

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};

use trackly_websocket::EventFrame;

/// 1 ユーザー分の接続エントリ。
struct ConnectionEntry {
    connection_id: String,
    sender: mpsc::UnboundedSender<EventFrame>,
}

/// ConnectionRegistry はユーザー ID と接続の対応を管理する。
/// 同一ユーザーの有効な接続は常に 1 つ（後勝ち）。
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: RwLock<HashMap<String, ConnectionEntry>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// 接続を登録する。既存のエントリは無条件に上書きされる
    /// （最後に接続したものが勝つ）。
    pub async fn register(
        &self,
        user_id: &str,
        connection_id: &str,
        sender: mpsc::UnboundedSender<EventFrame>,
    ) {
        let mut entries = self.entries.write().await;
        entries.insert(
            user_id.to_string(),
            ConnectionEntry {
                connection_id: connection_id.to_string(),
                sender,
            },
        );
    }

    /// 指定の接続 ID を持つエントリを削除する。線形走査で最初の一致のみ。
    /// 上書き済みの古い接続 ID は一致しないため、新しい接続を壊さない。
    pub async fn deregister(&self, connection_id: &str) {
        let mut entries = self.entries.write().await;
        let found = entries
            .iter()
            .find(|(_, entry)| entry.connection_id == connection_id)
            .map(|(user_id, _)| user_id.clone());
        if let Some(user_id) = found {
            entries.remove(&user_id);
        }
    }

    /// ユーザーの現在の接続 ID を返す。オフラインなら None。
    pub async fn resolve(&self, user_id: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(user_id).map(|e| e.connection_id.clone())
    }

    /// ユーザーの接続へフレームを送るためのチャネルを返す。
    pub(crate) async fn sender_for(
        &self,
        user_id: &str,
    ) -> Option<mpsc::UnboundedSender<EventFrame>> {
        let entries = self.entries.read().await;
        entries.get(user_id).map(|e| e.sender.clone())
    }

    /// 現在オンラインのユーザー数。
    pub async fn online_count(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }
}
