//! Shared in-memory remote for state-machine tests.

// Each test binary uses a different slice of this helper.
#![allow(dead_code)]

use async_trait::async_trait;
use chime_client::remote::{QrKeyIssued, QrPollReply, RemoteService, SessionGrant};
use chime_core::{BridgeError, BridgeResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted remote: poll and refresh replies are consumed in order, and
/// every network-shaped call is counted so tests can assert short-circuits.
#[derive(Default)]
pub struct ScriptedRemote {
    poll_replies: Mutex<VecDeque<QrPollReply>>,
    refresh_results: Mutex<VecDeque<BridgeResult<SessionGrant>>>,
    search_pages: Mutex<VecDeque<Vec<serde_json::Value>>>,
    pub issue_calls: AtomicUsize,
    pub poll_calls: AtomicUsize,
    pub cancel_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub invalidate_calls: AtomicUsize,
    pub search_calls: AtomicUsize,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_poll_code(&self, code: i64) {
        self.poll_replies.lock().unwrap().push_back(QrPollReply {
            code,
            message: String::new(),
            grant: None,
        });
    }

    pub fn push_confirmed(&self, auth_token: &str, refresh_token: &str, ttl: Duration) {
        self.poll_replies.lock().unwrap().push_back(QrPollReply {
            code: 803,
            message: "confirmed".into(),
            grant: Some(SessionGrant {
                auth_token: auth_token.into(),
                refresh_token: Some(refresh_token.into()),
                ttl: Some(ttl),
            }),
        });
    }

    pub fn push_refresh_ok(&self, auth_token: &str, ttl: Duration) {
        self.refresh_results
            .lock()
            .unwrap()
            .push_back(Ok(SessionGrant {
                auth_token: auth_token.into(),
                refresh_token: None,
                ttl: Some(ttl),
            }));
    }

    pub fn push_refresh_err(&self, err: BridgeError) {
        self.refresh_results.lock().unwrap().push_back(Err(err));
    }

    pub fn push_search_page(&self, page: Vec<serde_json::Value>) {
        self.search_pages.lock().unwrap().push_back(page);
    }

    pub fn polls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteService for ScriptedRemote {
    async fn issue_qr_key(&self) -> BridgeResult<QrKeyIssued> {
        let n = self.issue_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(QrKeyIssued {
            key: format!("key-{n}"),
            qr_url: format!("https://stream.chime.io/qr/key-{n}"),
            ttl: Some(Duration::from_secs(120)),
        })
    }

    async fn poll_qr(&self, _key: &str) -> BridgeResult<QrPollReply> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        self.poll_replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BridgeError::internal("poll script exhausted"))
    }

    async fn cancel_qr(&self, _key: &str) -> BridgeResult<()> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn refresh_session(&self, _refresh_token: &str) -> BridgeResult<SessionGrant> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BridgeError::internal("refresh script exhausted")))
    }

    async fn invalidate_session(&self, _auth_token: &str) -> BridgeResult<()> {
        self.invalidate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn search_songs(
        &self,
        _auth_token: &str,
        _keyword: &str,
        _limit: u32,
    ) -> BridgeResult<Vec<serde_json::Value>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .search_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}
