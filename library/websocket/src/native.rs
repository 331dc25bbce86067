//! tokio-tungstenite を使用した本番用 WebSocket クライアント。

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::client::WsClient;
use crate::error::WsError;
use crate::message::EventFrame;
use crate::state::ConnectionState;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// TungsteniteWsClient は実ソケット上で EventFrame を運ぶクライアント。
/// フレームは JSON テキストメッセージとしてシリアライズされる。
pub struct TungsteniteWsClient {
    url: String,
    connection_state: ConnectionState,
    sink: tokio::sync::Mutex<Option<SplitSink<WsStream, Message>>>,
    stream: tokio::sync::Mutex<Option<SplitStream<WsStream>>>,
}

impl TungsteniteWsClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connection_state: ConnectionState::Disconnected,
            sink: tokio::sync::Mutex::new(None),
            stream: tokio::sync::Mutex::new(None),
        }
    }
}

#[async_trait]
impl WsClient for TungsteniteWsClient {
    async fn connect(&mut self) -> Result<(), WsError> {
        if self.connection_state == ConnectionState::Connected {
            return Err(WsError::AlreadyConnected);
        }
        self.connection_state = ConnectionState::Connecting;

        let (ws, _response) = match connect_async(self.url.as_str()).await {
            Ok(connected) => connected,
            Err(e) => {
                self.connection_state = ConnectionState::Disconnected;
                return Err(WsError::ConnectionError(e.to_string()));
            }
        };

        let (sink, stream) = ws.split();
        *self.sink.lock().await = Some(sink);
        *self.stream.lock().await = Some(stream);
        self.connection_state = ConnectionState::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), WsError> {
        if self.connection_state == ConnectionState::Disconnected {
            return Err(WsError::NotConnected);
        }
        self.connection_state = ConnectionState::Closing;

        if let Some(mut sink) = self.sink.lock().await.take() {
            // Close フレームの送信失敗は切断扱いにする
            let _ = sink.send(Message::Close(None)).await;
        }
        *self.stream.lock().await = None;
        self.connection_state = ConnectionState::Disconnected;
        Ok(())
    }

    async fn send(&self, frame: EventFrame) -> Result<(), WsError> {
        let text =
            serde_json::to_string(&frame).map_err(|e| WsError::SendError(e.to_string()))?;

        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(WsError::NotConnected)?;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(|e| WsError::SendError(e.to_string()))
    }

    async fn receive(&self) -> Result<EventFrame, WsError> {
        let mut guard = self.stream.lock().await;
        let stream = guard.as_mut().ok_or(WsError::NotConnected)?;

        loop {
            let message = stream
                .next()
                .await
                .ok_or_else(|| WsError::Closed("stream ended".to_string()))?
                .map_err(|e| WsError::ReceiveError(e.to_string()))?;

            match message {
                Message::Text(text) => {
                    return serde_json::from_str(text.as_str())
                        .map_err(|e| WsError::MalformedFrame(e.to_string()));
                }
                Message::Close(frame) => {
                    let reason = frame
                        .map(|f| f.reason.to_string())
                        .unwrap_or_else(|| "server closed connection".to_string());
                    return Err(WsError::Closed(reason));
                }
                // Ping/Pong/Binary は読み飛ばす
                _ => {}
            }
        }
    }

    fn state(&self) -> ConnectionState {
        self.connection_state
    }
}
