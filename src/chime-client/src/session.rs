use crate::remote::{RemoteService, SessionGrant};
use chime_core::secrets::CredentialStore;
use chime_core::{BridgeError, BridgeResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Expired,
    Revoked,
}

/// The authenticated identity for one logical user of the bridge.
#[derive(Debug, Clone)]
pub struct Session {
    pub device_id: String,
    pub auth_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<Instant>,
    pub state: SessionState,
}

impl Session {
    fn fresh(device_id: String) -> Self {
        Self {
            device_id,
            auth_token: None,
            refresh_token: None,
            expires_at: None,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Owns the session and is the only place that mutates it. Each operation
/// either fully applies its transition or leaves the session untouched.
pub struct SessionManager {
    remote: Arc<dyn RemoteService>,
    session: RwLock<Session>,
    default_ttl: Duration,
    store: Option<CredentialStore>,
}

impl SessionManager {
    pub fn new(
        remote: Arc<dyn RemoteService>,
        device_id: String,
        default_ttl: Duration,
        store: Option<CredentialStore>,
    ) -> Self {
        let mut session = Session::fresh(device_id);
        // A refresh token surviving from a previous run lets ensure_valid
        // resume the identity without a new QR scan.
        if let Some(store) = &store {
            if let Ok(token) = store.get_refresh_token() {
                session.refresh_token = Some(token);
                session.state = SessionState::Expired;
            }
        }
        Self {
            remote,
            session: RwLock::new(session),
            default_ttl,
            store,
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    pub(crate) async fn mark_authenticating(&self) {
        let mut session = self.session.write().await;
        if session.state != SessionState::Authenticated {
            session.state = SessionState::Authenticating;
        }
    }

    pub(crate) async fn abort_authentication(&self) {
        let mut session = self.session.write().await;
        if session.state == SessionState::Authenticating {
            session.state = SessionState::Unauthenticated;
        }
    }

    /// Adopt the tokens from a confirmed login or a successful refresh.
    pub(crate) async fn adopt_grant(&self, grant: SessionGrant) {
        let expires_at = Instant::now() + grant.ttl.unwrap_or(self.default_ttl);
        let mut session = self.session.write().await;
        session.auth_token = Some(grant.auth_token);
        if grant.refresh_token.is_some() {
            session.refresh_token = grant.refresh_token;
        }
        session.expires_at = Some(expires_at);
        session.state = SessionState::Authenticated;

        if let Some(store) = &self.store {
            if let Some(token) = &session.refresh_token {
                if store.store_refresh_token(token).is_err() {
                    tracing::debug!("refresh token not persisted; keyring unavailable");
                }
            }
            let _ = store.store_device_id(&session.device_id);
        }
    }

    /// Return a token usable for an authenticated call, refreshing silently
    /// at most once when the session has expired.
    pub async fn ensure_valid(&self) -> BridgeResult<String> {
        let (live_token, refresh_token) = {
            let session = self.session.read().await;
            match session.state {
                SessionState::Authenticated if !session.is_expired() => {
                    (session.auth_token.clone(), None)
                }
                SessionState::Authenticated | SessionState::Expired => {
                    (None, session.refresh_token.clone())
                }
                _ => return Err(BridgeError::SessionExpired),
            }
        };

        if let Some(token) = live_token {
            return Ok(token);
        }
        let Some(refresh_token) = refresh_token else {
            self.expire().await;
            return Err(BridgeError::SessionExpired);
        };

        match self.remote.refresh_session(&refresh_token).await {
            Ok(grant) => {
                let token = grant.auth_token.clone();
                self.adopt_grant(grant).await;
                tracing::info!("session refreshed");
                Ok(token)
            }
            Err(err) => {
                // Transient failures leave the session untouched so the
                // caller can retry on its own schedule.
                if matches!(
                    err,
                    BridgeError::Network { .. } | BridgeError::Timeout { .. }
                ) {
                    return Err(err);
                }
                tracing::warn!(error = %err, "refresh rejected; login required");
                self.expire().await;
                Err(BridgeError::SessionExpired)
            }
        }
    }

    async fn expire(&self) {
        let mut session = self.session.write().await;
        session.auth_token = None;
        session.state = SessionState::Expired;
    }

    /// Best-effort remote invalidation; local state is always cleared.
    pub async fn logout(&self) {
        let token = { self.session.read().await.auth_token.clone() };
        if let Some(token) = token {
            if let Err(err) = self.remote.invalidate_session(&token).await {
                tracing::debug!(error = %err, "remote logout did not acknowledge");
            }
        }

        let mut session = self.session.write().await;
        let device_id = session.device_id.clone();
        *session = Session {
            state: SessionState::Revoked,
            ..Session::fresh(device_id)
        };
        if let Some(store) = &self.store {
            let _ = store.clear_session();
        }
    }
}
