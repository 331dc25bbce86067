//! リアルタイムチャネルのハンドシェイクと接続ループ。
//!
//! ハンドシェイクではアクセストークンをサーバー側で検証し、ユーザー ID を
//! Claims から導出する。クライアントが申告する userId パラメータは参考情報で、
//! 不一致は警告ログを残すだけで信用しない。

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use trackly_auth::AuthErrorResponse;
use trackly_websocket::EventFrame;

use super::auth_handler::AppState;
use crate::realtime::ConnectionRegistry;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(token) = params.token else {
        return AuthErrorResponse::unauthenticated().into_response();
    };

    let claims = match state.tokens.verify_access_token(&token) {
        Ok(claims) => claims,
        Err(e) => return AuthErrorResponse::from_token_error(e).into_response(),
    };

    if let Some(ref claimed) = params.user_id {
        if *claimed != claims.sub {
            tracing::warn!(
                claimed = %claimed,
                derived = %claims.sub,
                "client-supplied user id ignored, using token identity"
            );
        }
    }

    let registry = state.registry.clone();
    let user_id = claims.sub;
    ws.on_upgrade(move |socket| handle_socket(socket, registry, user_id))
}

async fn handle_socket(socket: WebSocket, registry: Arc<ConnectionRegistry>, user_id: String) {
    let connection_id = Uuid::new_v4().to_string();
    let (tx, mut rx) = mpsc::unbounded_channel::<EventFrame>();
    registry.register(&user_id, &connection_id, tx).await;
    tracing::info!(%user_id, %connection_id, "realtime connection established");

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            frame = rx.recv() => {
                // 上書き登録で送信側が破棄された場合もここで終了する
                let Some(frame) = frame else { break };
                let Ok(text) = serde_json::to_string(&frame) else { continue };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                match incoming {
                    None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break,
                    // クライアントからの入力は読み捨てる（push 専用チャネル）
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    // この接続 ID のエントリだけを消す。再接続で上書き済みなら no-op
    registry.deregister(&connection_id).await;
    tracing::info!(%user_id, %connection_id, "realtime connection closed");
}
