use crate::transport::Transport;
use crate::wire;
use async_trait::async_trait;
use chime_core::BridgeResult;
use serde_json::json;
use std::time::Duration;

/// Tokens and TTL granted when a login is confirmed or a session refreshed.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub auth_token: String,
    pub refresh_token: Option<String>,
    pub ttl: Option<Duration>,
}

/// A freshly issued QR login key plus the URL the host renders as a code.
#[derive(Debug, Clone)]
pub struct QrKeyIssued {
    pub key: String,
    pub qr_url: String,
    pub ttl: Option<Duration>,
}

/// One poll of the QR confirmation endpoint: the raw remote code, its
/// message, and the grant when the login was confirmed.
#[derive(Debug, Clone)]
pub struct QrPollReply {
    pub code: i64,
    pub message: String,
    pub grant: Option<SessionGrant>,
}

/// Seam between the login/session/search logic and the remote service.
///
/// One production implementation exists; tests substitute an in-memory fake
/// to drive the state machines without a network.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn issue_qr_key(&self) -> BridgeResult<QrKeyIssued>;

    async fn poll_qr(&self, key: &str) -> BridgeResult<QrPollReply>;

    /// Best-effort cancellation notice; callers do not wait on the outcome.
    async fn cancel_qr(&self, key: &str) -> BridgeResult<()>;

    async fn refresh_session(&self, refresh_token: &str) -> BridgeResult<SessionGrant>;

    async fn invalidate_session(&self, auth_token: &str) -> BridgeResult<()>;

    /// Raw search records in relevance order; tolerant per-record decoding
    /// happens upstream.
    async fn search_songs(
        &self,
        auth_token: &str,
        keyword: &str,
        limit: u32,
    ) -> BridgeResult<Vec<serde_json::Value>>;
}

pub struct HttpRemoteService {
    transport: Transport,
}

impl HttpRemoteService {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn issue_qr_key(&self) -> BridgeResult<QrKeyIssued> {
        let envelope: wire::QrKeyEnvelope = self
            .transport
            .post_json("api/v1/login/qr/key", &json!({}), None)
            .await?;
        Ok(QrKeyIssued {
            key: envelope.key,
            qr_url: envelope.qr_url,
            ttl: envelope.ttl_seconds.map(Duration::from_secs),
        })
    }

    async fn poll_qr(&self, key: &str) -> BridgeResult<QrPollReply> {
        let envelope: wire::QrPollEnvelope = self
            .transport
            .get_json("api/v1/login/qr/check", &[("key", key.to_string())], None)
            .await?;
        let grant = envelope.auth_token.map(|auth_token| SessionGrant {
            auth_token,
            refresh_token: envelope.refresh_token,
            ttl: envelope.expires_in_seconds.map(Duration::from_secs),
        });
        Ok(QrPollReply {
            code: envelope.code,
            message: envelope.message.unwrap_or_default(),
            grant,
        })
    }

    async fn cancel_qr(&self, key: &str) -> BridgeResult<()> {
        self.transport
            .post_no_content("api/v1/login/qr/cancel", &json!({ "key": key }), None)
            .await
    }

    async fn refresh_session(&self, refresh_token: &str) -> BridgeResult<SessionGrant> {
        let envelope: wire::RefreshEnvelope = self
            .transport
            .post_json(
                "api/v1/session/refresh",
                &json!({ "refreshToken": refresh_token }),
                None,
            )
            .await?;
        Ok(SessionGrant {
            auth_token: envelope.auth_token,
            refresh_token: envelope.refresh_token,
            ttl: envelope.expires_in_seconds.map(Duration::from_secs),
        })
    }

    async fn invalidate_session(&self, auth_token: &str) -> BridgeResult<()> {
        self.transport
            .post_no_content("api/v1/session/logout", &json!({}), Some(auth_token))
            .await
    }

    async fn search_songs(
        &self,
        auth_token: &str,
        keyword: &str,
        limit: u32,
    ) -> BridgeResult<Vec<serde_json::Value>> {
        let envelope: wire::SongPagedEnvelope = self
            .transport
            .get_json_retrying(
                "api/v1/search/songs",
                &[("q", keyword.to_string()), ("limit", limit.to_string())],
                Some(auth_token),
            )
            .await?;
        Ok(envelope.data)
    }
}
