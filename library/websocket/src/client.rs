use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::WsError;
use crate::message::EventFrame;
use crate::state::ConnectionState;

/// WsClient はリアルタイムチャネルのクライアント側抽象。
/// 本番実装は native フィーチャーの TungsteniteWsClient、
/// テストでは InMemoryWsClient を使う。
#[async_trait]
pub trait WsClient: Send + Sync {
    async fn connect(&mut self) -> Result<(), WsError>;
    async fn disconnect(&mut self) -> Result<(), WsError>;
    async fn send(&self, frame: EventFrame) -> Result<(), WsError>;
    /// 次のイベントフレームを待つ。接続が閉じられた場合は WsError::Closed。
    async fn receive(&self) -> Result<EventFrame, WsError>;
    fn state(&self) -> ConnectionState;
}

/// InMemoryWsClient はバッファだけで動くテスト用実装。
pub struct InMemoryWsClient {
    connection_state: ConnectionState,
    send_buffer: Arc<tokio::sync::Mutex<VecDeque<EventFrame>>>,
    receive_buffer: Arc<tokio::sync::Mutex<VecDeque<EventFrame>>>,
}

impl InMemoryWsClient {
    pub fn new() -> Self {
        Self {
            connection_state: ConnectionState::Disconnected,
            send_buffer: Arc::new(tokio::sync::Mutex::new(VecDeque::new())),
            receive_buffer: Arc::new(tokio::sync::Mutex::new(VecDeque::new())),
        }
    }

    /// 受信バッファにフレームを積む（サーバー側 push の代わり）。
    pub async fn push_receive(&self, frame: EventFrame) {
        let mut buf = self.receive_buffer.lock().await;
        buf.push_back(frame);
    }

    /// クライアントが送信したフレームを取り出す。
    pub async fn pop_sent(&self) -> Option<EventFrame> {
        let mut buf = self.send_buffer.lock().await;
        buf.pop_front()
    }
}

impl Default for InMemoryWsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WsClient for InMemoryWsClient {
    async fn connect(&mut self) -> Result<(), WsError> {
        if self.connection_state == ConnectionState::Connected {
            return Err(WsError::AlreadyConnected);
        }
        self.connection_state = ConnectionState::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), WsError> {
        if self.connection_state == ConnectionState::Disconnected {
            return Err(WsError::NotConnected);
        }
        self.connection_state = ConnectionState::Disconnected;
        Ok(())
    }

    async fn send(&self, frame: EventFrame) -> Result<(), WsError> {
        if self.connection_state != ConnectionState::Connected {
            return Err(WsError::NotConnected);
        }
        let mut buf = self.send_buffer.lock().await;
        buf.push_back(frame);
        Ok(())
    }

    async fn receive(&self) -> Result<EventFrame, WsError> {
        if self.connection_state != ConnectionState::Connected {
            return Err(WsError::NotConnected);
        }
        let mut buf = self.receive_buffer.lock().await;
        buf.pop_front()
            .ok_or_else(|| WsError::Closed("receive buffer drained".to_string()))
    }

    fn state(&self) -> ConnectionState {
        self.connection_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(event: &str) -> EventFrame {
        EventFrame::new(event, serde_json::json!({}))
    }

    #[tokio::test]
    async fn test_connect_disconnect() {
        let mut client = InMemoryWsClient::new();
        assert_eq!(client.state(), ConnectionState::Disconnected);

        client.connect().await.unwrap();
        assert_eq!(client.state(), ConnectionState::Connected);

        client.disconnect().await.unwrap();
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_double_connect() {
        let mut client = InMemoryWsClient::new();
        client.connect().await.unwrap();
        let result = client.connect().await;
        assert!(matches!(result, Err(WsError::AlreadyConnected)));
    }

    #[tokio::test]
    async fn test_send_receive() {
        let mut client = InMemoryWsClient::new();
        client.connect().await.unwrap();

        client.push_receive(frame("task:assigned")).await;
        let received = client.receive().await.unwrap();
        assert_eq!(received.event, "task:assigned");

        client.send(frame("ack")).await.unwrap();
        let sent = client.pop_sent().await.unwrap();
        assert_eq!(sent.event, "ack");
    }

    #[tokio::test]
    async fn test_send_when_disconnected() {
        let client = InMemoryWsClient::new();
        let result = client.send(frame("task:assigned")).await;
        assert!(matches!(result, Err(WsError::NotConnected)));
    }

    #[tokio::test]
    async fn test_receive_after_drain_reports_closed() {
        let mut client = InMemoryWsClient::new();
        client.connect().await.unwrap();
        let result = client.receive().await;
        assert!(matches!(result, Err(WsError::Closed(_))));
    }
}
