//! サーバー発イベントの配送。
//!
//! 配送は at-most-once・ベストエフォート。宛先ユーザーがオフラインなら
//! イベントは黙って捨てられ、エラーにはならない。永続化・再送はしない。
//! この通知を正しさの根拠に使う消費者は誤用である（UX 用の合図にすぎない）。

use std::sync::Arc;

use trackly_websocket::{EventFrame, TaskAssignedPayload, TaskDeletedPayload};

use super::registry::ConnectionRegistry;

/// NotificationDispatcher はユーザー ID を接続に解決してイベントを push する。
/// タスク更新系のロジック（本リポジトリ外）から呼ばれる。
#[derive(Clone)]
pub struct NotificationDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl NotificationDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 任意のイベントフレームを配送する。
    pub async fn dispatch(&self, user_id: &str, frame: EventFrame) {
        match self.registry.sender_for(user_id).await {
            Some(sender) => {
                if sender.send(frame).is_err() {
                    // 接続タスクが終了した直後のレース。切断ハンドラが後始末する。
                    tracing::debug!(user_id, "connection closed before delivery, dropping event");
                }
            }
            None => {
                tracing::debug!(user_id, "user offline, dropping event");
            }
        }
    }

    /// タスク割り当てイベントを配送する。
    pub async fn dispatch_task_assigned(&self, user_id: &str, payload: &TaskAssignedPayload) {
        self.dispatch(user_id, EventFrame::task_assigned(payload))
            .await;
    }

    /// タスク削除イベントを配送する。
    pub async fn dispatch_task_deleted(&self, user_id: &str, payload: &TaskDeletedPayload) {
        self.dispatch(user_id, EventFrame::task_deleted(payload))
            .await;
    }
}
