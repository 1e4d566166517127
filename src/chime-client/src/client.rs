use crate::qr::{QrLoginAttempt, QrLoginFlow, QrStatus};
use crate::remote::{HttpRemoteService, RemoteService};
use crate::search::{SearchClient, SearchOutcome};
use crate::session::{Session, SessionManager};
use crate::transport::Transport;
use chime_core::secrets::CredentialStore;
use chime_core::{BridgeResult, Config};
use rand::{distributions::Alphanumeric, Rng};
use std::sync::Arc;
use std::time::Duration;

/// Facade wiring transport, session, login, and search together. One
/// instance serves one logical identity; callers coordinate their own
/// threading per the bridge contract.
pub struct ChimeClient {
    session: SessionManager,
    qr: QrLoginFlow,
    search_client: SearchClient,
}

impl ChimeClient {
    /// Production construction: cookie-jar transport against the configured
    /// service, keyring-backed credential store for resumable sessions.
    pub fn from_config(config: &Config) -> BridgeResult<Self> {
        let store = CredentialStore::new();
        let device_id = store
            .get_device_id()
            .unwrap_or_else(|_| generate_device_id());
        let transport = Transport::new(&config.service, device_id.clone())?;
        let remote: Arc<dyn RemoteService> = Arc::new(HttpRemoteService::new(transport));
        Ok(Self::assemble(
            remote,
            device_id,
            config.service.default_session_ttl(),
            Some(store),
        ))
    }

    /// Seam for tests and alternative backends: inject the remote service
    /// directly, with no credential persistence.
    pub fn with_remote(
        remote: Arc<dyn RemoteService>,
        device_id: impl Into<String>,
        default_ttl: Duration,
    ) -> Self {
        Self::assemble(remote, device_id.into(), default_ttl, None)
    }

    fn assemble(
        remote: Arc<dyn RemoteService>,
        device_id: String,
        default_ttl: Duration,
        store: Option<CredentialStore>,
    ) -> Self {
        let session = SessionManager::new(Arc::clone(&remote), device_id, default_ttl, store);
        let qr = QrLoginFlow::new(Arc::clone(&remote));
        let search_client = SearchClient::new(remote);
        Self {
            session,
            qr,
            search_client,
        }
    }

    pub async fn begin_login(&self) -> BridgeResult<QrLoginAttempt> {
        let attempt = self.qr.begin().await?;
        self.session.mark_authenticating().await;
        Ok(attempt)
    }

    pub async fn poll_login_status(&self) -> BridgeResult<(QrStatus, String)> {
        self.qr.poll(&self.session).await
    }

    pub async fn cancel_login(&self) {
        self.qr.cancel().await;
        self.session.abort_authentication().await;
    }

    pub async fn current_login_attempt(&self) -> Option<QrLoginAttempt> {
        self.qr.current().await
    }

    pub async fn search(&self, keyword: &str, limit: u32) -> BridgeResult<SearchOutcome> {
        self.search_client
            .search(&self.session, keyword, limit)
            .await
    }

    pub async fn ensure_valid(&self) -> BridgeResult<String> {
        self.session.ensure_valid().await
    }

    pub async fn logout(&self) {
        self.session.logout().await;
    }

    pub async fn session_snapshot(&self) -> Session {
        self.session.snapshot().await
    }
}

fn generate_device_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("chime-{}", suffix.to_lowercase())
}
