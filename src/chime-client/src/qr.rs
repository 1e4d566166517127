use crate::remote::{QrPollReply, RemoteService};
use crate::session::SessionManager;
use chime_core::{BridgeError, BridgeResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

// Remote confirmation codes for the device-login endpoint.
const CODE_PENDING: i64 = 801;
const CODE_SCANNED: i64 = 802;
const CODE_CONFIRMED: i64 = 803;
const CODE_EXPIRED: i64 = 804;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrStatus {
    Pending,
    Scanned,
    Confirmed,
    Expired,
    Cancelled,
    Failed,
}

impl QrStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QrStatus::Confirmed | QrStatus::Expired | QrStatus::Cancelled | QrStatus::Failed
        )
    }

    /// Integer code crossing the bridge boundary.
    pub fn state_code(&self) -> i32 {
        match self {
            QrStatus::Pending => 0,
            QrStatus::Scanned => 1,
            QrStatus::Confirmed => 2,
            QrStatus::Expired => 3,
            QrStatus::Cancelled => 4,
            QrStatus::Failed => 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QrLoginAttempt {
    pub key: String,
    pub qr_url: String,
    pub status: QrStatus,
    pub detail: String,
    pub created_at: Instant,
    pub ttl: Option<Duration>,
}

/// Tracks the single in-flight QR login attempt and advances it by polling.
///
/// The service drives every transition; this side only interprets poll
/// replies. Terminal attempts answer further polls locally.
pub struct QrLoginFlow {
    remote: Arc<dyn RemoteService>,
    attempt: RwLock<Option<QrLoginAttempt>>,
}

impl QrLoginFlow {
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self {
            remote,
            attempt: RwLock::new(None),
        }
    }

    /// Issue a fresh login key. Any prior attempt is superseded.
    pub async fn begin(&self) -> BridgeResult<QrLoginAttempt> {
        let issued = self.remote.issue_qr_key().await?;
        let attempt = QrLoginAttempt {
            key: issued.key,
            qr_url: issued.qr_url,
            status: QrStatus::Pending,
            detail: String::new(),
            created_at: Instant::now(),
            ttl: issued.ttl,
        };
        let mut slot = self.attempt.write().await;
        if slot.replace(attempt.clone()).is_some() {
            tracing::debug!("superseded previous login attempt");
        }
        Ok(attempt)
    }

    /// Poll the confirmation state. A confirmed reply hands its grant to the
    /// session manager; terminal attempts short-circuit without touching the
    /// network.
    pub async fn poll(&self, session: &SessionManager) -> BridgeResult<(QrStatus, String)> {
        let key = {
            let slot = self.attempt.read().await;
            let Some(attempt) = slot.as_ref() else {
                return Err(BridgeError::invalid_argument("no login attempt in flight"));
            };
            if attempt.status.is_terminal() {
                return Ok((attempt.status, attempt.detail.clone()));
            }
            attempt.key.clone()
        };

        let reply = self.remote.poll_qr(&key).await?;
        self.apply_poll(session, &key, reply).await
    }

    async fn apply_poll(
        &self,
        session: &SessionManager,
        key: &str,
        reply: QrPollReply,
    ) -> BridgeResult<(QrStatus, String)> {
        let (status, detail) = interpret_reply(&reply);

        {
            let mut slot = self.attempt.write().await;
            let Some(attempt) = slot.as_mut() else {
                return Err(BridgeError::invalid_argument("no login attempt in flight"));
            };
            // The attempt may have been cancelled or superseded while the
            // poll was in flight; the stale reply is then discarded.
            if attempt.key != key || attempt.status.is_terminal() {
                return Ok((attempt.status, attempt.detail.clone()));
            }
            attempt.status = status;
            attempt.detail = detail.clone();
        }

        match status {
            QrStatus::Confirmed => {
                if let Some(grant) = reply.grant {
                    session.adopt_grant(grant).await;
                    tracing::info!("login confirmed");
                }
            }
            QrStatus::Expired | QrStatus::Failed => session.abort_authentication().await,
            _ => {}
        }
        Ok((status, detail))
    }

    /// Mark the attempt cancelled locally, then notify the service without
    /// waiting for an acknowledgement.
    pub async fn cancel(&self) {
        let key = {
            let mut slot = self.attempt.write().await;
            match slot.as_mut() {
                Some(attempt) if !attempt.status.is_terminal() => {
                    attempt.status = QrStatus::Cancelled;
                    attempt.detail = "cancelled by caller".into();
                    Some(attempt.key.clone())
                }
                _ => None,
            }
        };

        if let Some(key) = key {
            let remote = Arc::clone(&self.remote);
            tokio::spawn(async move {
                if let Err(err) = remote.cancel_qr(&key).await {
                    tracing::debug!(error = %err, "cancel notification not delivered");
                }
            });
        }
    }

    pub async fn current(&self) -> Option<QrLoginAttempt> {
        self.attempt.read().await.clone()
    }
}

fn interpret_reply(reply: &QrPollReply) -> (QrStatus, String) {
    match reply.code {
        CODE_PENDING => (QrStatus::Pending, reply.message.clone()),
        CODE_SCANNED => (QrStatus::Scanned, reply.message.clone()),
        CODE_CONFIRMED if reply.grant.is_some() => (QrStatus::Confirmed, reply.message.clone()),
        CODE_CONFIRMED => (
            QrStatus::Failed,
            "confirmation reply carried no tokens".into(),
        ),
        CODE_EXPIRED => (QrStatus::Expired, reply.message.clone()),
        code => (QrStatus::Failed, format!("unrecognized remote code {code}")),
    }
}
