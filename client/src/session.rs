//! SessionManager: アクセストークンの保持・付与と single-flight リフレッシュ。
//!
//! 期限切れレスポンス（401）を受けたリクエストは、リフレッシュ 1 回 +
//! 再送 1 回だけを行う。リフレッシュが既に進行中であれば後続のリクエストは
//! その結果を待って再利用するため、同時に大量のリクエストが失効しても
//! サーバーへのリフレッシュ呼び出しはプロセス全体で 1 回に収まる。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex, RwLock};

use crate::error::ClientError;
use crate::http::{ApiHttpClient, ApiResponse, HttpMethod};

/// クライアントから見たセッション状態。
/// リフレッシュ失敗時に Anonymous へ遷移し、アプリ側は未認証画面へ誘導する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

pub struct SessionManager {
    http: Arc<dyn ApiHttpClient>,
    base_url: String,
    access_token: RwLock<Option<String>>,
    /// リフレッシュの single-flight 用ロック
    refresh_lock: Mutex<()>,
    /// リフレッシュ試行（成功・失敗とも）が完了するたびに進む世代カウンタ。
    /// ロック待ちの間に世代が進んでいたら、そのリクエストは先行した
    /// リフレッシュの結果に従う。
    refresh_epoch: AtomicU64,
    state_tx: watch::Sender<SessionState>,
    state_rx: watch::Receiver<SessionState>,
}

impl SessionManager {
    pub fn new(base_url: impl Into<String>, http: Arc<dyn ApiHttpClient>) -> Self {
        let (state_tx, state_rx) = watch::channel(SessionState::Anonymous);
        Self {
            http,
            base_url: base_url.into(),
            access_token: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            refresh_epoch: AtomicU64::new(0),
            state_tx,
            state_rx,
        }
    }

    /// セッション状態の監視チャネルを返す。
    pub fn session_state(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// 現在のアクセストークン。リアルタイム接続のハンドシェイクに使う。
    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// ユーザー登録。ログインはしない。
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<(), ClientError> {
        let mut body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
        });
        if let Some(r) = role {
            body["role"] = serde_json::Value::String(r.to_string());
        }

        let response = self
            .http
            .request(HttpMethod::Post, &self.url("/api/auth/register"), None, Some(&body))
            .await?;
        Self::ok_or_api_error(response).map(|_| ())
    }

    /// ログインしてアクセストークンを保存する。
    /// リフレッシュトークンはトランスポートの Cookie ストアに入る。
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let body = serde_json::json!({"email": email, "password": password});
        let response = self
            .http
            .request(HttpMethod::Post, &self.url("/api/auth/login"), None, Some(&body))
            .await?;
        let response = Self::ok_or_api_error(response)?;
        let token = Self::parse_access_token(&response)?;

        *self.access_token.write().await = Some(token);
        let _ = self.state_tx.send(SessionState::Authenticated);
        Ok(())
    }

    /// ログアウト。サーバー側セッションと手元のトークンを破棄する。
    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self
            .http
            .request(HttpMethod::Post, &self.url("/api/auth/logout"), None, None)
            .await?;

        *self.access_token.write().await = None;
        let _ = self.state_tx.send(SessionState::Anonymous);

        Self::ok_or_api_error(response).map(|_| ())
    }

    /// 認証済みアイデンティティを取得する。
    pub async fn me(&self) -> Result<serde_json::Value, ClientError> {
        let response = self.request(HttpMethod::Get, "/api/v1/me", None).await?;
        response.json()
    }

    /// 認証付きリクエストの中核。
    ///
    /// 401 を受けたら single-flight のリフレッシュを 1 回だけ行い、
    /// 新しいトークンで元のリクエストを 1 回だけ再送する。
    /// 再送の結果が再び 401 でも、それ以上はリトライしない。
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse, ClientError> {
        let token = self.access_token.read().await.clone();
        let url = self.url(path);

        let response = self
            .http
            .request(method, &url, token.as_deref(), body.as_ref())
            .await?;

        if response.status != 401 {
            return Self::ok_or_api_error(response);
        }

        let new_token = self.refresh_once(token).await?;
        let retried = self
            .http
            .request(method, &url, Some(&new_token), body.as_ref())
            .await?;
        Self::ok_or_api_error(retried)
    }

    /// single-flight リフレッシュ。
    ///
    /// `seen` は呼び出し元が 401 を受けたときに使っていたトークン。
    /// ロック取得後に保存値が `seen` と違っていれば、待っている間に別の
    /// リクエストがリフレッシュを終えているので、その結果を再利用する。
    async fn refresh_once(&self, seen: Option<String>) -> Result<String, ClientError> {
        let epoch_before = self.refresh_epoch.load(Ordering::Acquire);
        let _guard = self.refresh_lock.lock().await;

        // ロック待ちの間に別のリフレッシュが完了していたら、その結果に従う
        if self.refresh_epoch.load(Ordering::Acquire) != epoch_before {
            return match self.access_token.read().await.clone() {
                // 先行したリフレッシュの成果を使う
                Some(token) => Ok(token),
                // 先行したリフレッシュは失敗し、セッションは破棄済み
                None => Err(ClientError::SessionExpired),
            };
        }

        // 401 を受けた時点のトークンが既に置き換わっている場合も再利用する
        {
            let current = self.access_token.read().await;
            if *current != seen {
                if let Some(token) = current.clone() {
                    return Ok(token);
                }
            }
        }

        let result = self
            .http
            .request(HttpMethod::Get, &self.url("/api/auth/refresh"), None, None)
            .await;
        self.refresh_epoch.fetch_add(1, Ordering::Release);
        let response = result?;

        if response.status == 201 {
            let token = Self::parse_access_token(&response)?;
            *self.access_token.write().await = Some(token.clone());
            return Ok(token);
        }

        // リフレッシュ失敗: ローカルセッションを破棄して未認証状態へ。
        // ロック待ちの後続リクエストもすべてここで拒否される。
        tracing::info!(status = response.status, "refresh failed, clearing session");
        *self.access_token.write().await = None;
        let _ = self.state_tx.send(SessionState::Anonymous);
        Err(ClientError::SessionExpired)
    }

    fn ok_or_api_error(response: ApiResponse) -> Result<ApiResponse, ClientError> {
        if response.status < 400 {
            return Ok(response);
        }

        let message = response
            .json()
            .ok()
            .and_then(|json| {
                json.get("error")
                    .or_else(|| json.get("message"))
                    .and_then(|v| v.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| "unknown error".to_string());

        Err(ClientError::Api {
            status: response.status,
            message,
        })
    }

    fn parse_access_token(response: &ApiResponse) -> Result<String, ClientError> {
        response
            .json()?
            .get("accessToken")
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| ClientError::Parse("accessToken missing in response".to_string()))
    }
}
