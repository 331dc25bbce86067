//! HTTP トランスポートの抽象化（テスト用にモック可能）。
//!
//! リフレッシュトークン Cookie はトランスポートの Cookie ストアが運ぶ。
//! セッション管理のロジック側は Cookie に触れない。

use async_trait::async_trait;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// ApiResponse はステータスコードと生のボディ。
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// ボディを JSON として読む。空ボディは null。
    pub fn json(&self) -> Result<serde_json::Value, ClientError> {
        if self.body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

/// HTTP クライアントの抽象化。
#[async_trait]
pub trait ApiHttpClient: Send + Sync {
    async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        bearer: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse, ClientError>;
}

/// reqwest ベースのデフォルト HTTP クライアント。
/// Cookie ストアを持ち、リフレッシュトークン Cookie を自動で送受信する。
pub struct ReqwestApiClient {
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new() -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ApiHttpClient for ReqwestApiClient {
    async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        bearer: Option<&str>,
        body: Option<&serde_json::Value>,
    ) -> Result<ApiResponse, ClientError> {
        let mut builder = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        };

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(json) = body {
            builder = builder.json(json);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Http(e.to_string()))?;

        Ok(ApiResponse { status, body })
    }
}
