//! RealtimeSubscriber: サーバー push イベントの購読。
//!
//! セッションごとに 1 接続。サーバー側の切断や受信エラーの際は
//! 固定ディレイ・回数上限付きで再接続を試みる。切断中に発生した
//! イベントは失われたままで、再接続してもバックフィルされない。

use serde::de::DeserializeOwned;

use trackly_auth::token::decode_unverified;
use trackly_websocket::message::{TASK_ASSIGNED, TASK_DELETED};
use trackly_websocket::{EventFrame, TaskAssignedPayload, TaskDeletedPayload, WsClient, WsConfig, WsError};

use crate::error::ClientError;

/// TaskNotice はユーザーに見せる一時的な通知。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskNotice {
    Assigned { task_id: String, title: String, assigned_by: String },
    Deleted { task_id: String, title: String, deleted_by: String },
}

pub struct RealtimeSubscriber {
    config: WsConfig,
}

impl RealtimeSubscriber {
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// 接続ハンドシェイク用の URL を組み立てる。
    ///
    /// アクセストークンを検証なしでデコードして自分のユーザー ID を
    /// 取り出し、参考情報としてクエリに載せる（検証はサーバーの仕事で、
    /// サーバーはトークン由来のアイデンティティのみを信用する）。
    pub fn handshake_url(base_ws_url: &str, access_token: &str) -> Result<String, ClientError> {
        let claims = decode_unverified(access_token)
            .map_err(|e| ClientError::Parse(e.to_string()))?;
        let user_id = claims
            .sub
            .ok_or_else(|| ClientError::Parse("no user id in access token".to_string()))?;

        Ok(format!("{base_ws_url}/ws?token={access_token}&userId={user_id}"))
    }

    /// 受信ループ。通知のたびに on_notice を呼ぶ。
    ///
    /// 再接続の上限に達した場合にエラーで戻る。クライアントが
    /// disconnect() 済みなら NotConnected で戻るため、呼び出し側の
    /// 終了処理とも両立する。
    pub async fn run<C, F>(&self, client: &mut C, mut on_notice: F) -> Result<(), ClientError>
    where
        C: WsClient,
        F: FnMut(TaskNotice) + Send,
    {
        let mut attempts: u32 = 0;

        loop {
            match client.receive().await {
                Ok(frame) => {
                    // 受信できている間は再接続カウンタを戻す
                    attempts = 0;
                    if let Some(notice) = Self::notice_from(frame) {
                        on_notice(notice);
                    }
                }
                Err(WsError::MalformedFrame(e)) => {
                    tracing::debug!(error = %e, "ignoring malformed frame");
                }
                Err(e) => {
                    if !self.config.reconnect || attempts >= self.config.max_reconnect_attempts {
                        return Err(ClientError::Ws(e));
                    }
                    attempts += 1;
                    tracing::info!(attempt = attempts, "realtime connection lost, reconnecting");
                    tokio::time::sleep(std::time::Duration::from_millis(
                        self.config.reconnect_delay_ms,
                    ))
                    .await;

                    let _ = client.disconnect().await;
                    if let Err(e) = client.connect().await {
                        tracing::debug!(error = %e, attempt = attempts, "reconnect failed");
                    }
                }
            }
        }
    }

    fn notice_from(frame: EventFrame) -> Option<TaskNotice> {
        fn payload<T: DeserializeOwned>(data: serde_json::Value) -> Option<T> {
            serde_json::from_value(data).ok()
        }

        match frame.event.as_str() {
            TASK_ASSIGNED => payload::<TaskAssignedPayload>(frame.data).map(|p| {
                TaskNotice::Assigned {
                    task_id: p.task_id,
                    title: p.title,
                    assigned_by: p.assigned_by,
                }
            }),
            TASK_DELETED => payload::<TaskDeletedPayload>(frame.data).map(|p| {
                TaskNotice::Deleted {
                    task_id: p.task_id,
                    title: p.title,
                    deleted_by: p.deleted_by,
                }
            }),
            other => {
                tracing::debug!(event = other, "ignoring unknown event");
                None
            }
        }
    }
}
