use crate::remote::RemoteService;
use crate::session::SessionManager;
use crate::wire;
use chime_core::models::{AlbumId, Track, TrackId};
use chime_core::{BridgeError, BridgeResult};
use std::sync::Arc;

pub const DEFAULT_SEARCH_LIMIT: u32 = 30;

/// Search result plus the out-of-band count of rejected records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub tracks: Vec<Track>,
    pub skipped: u32,
}

pub struct SearchClient {
    remote: Arc<dyn RemoteService>,
}

impl SearchClient {
    pub fn new(remote: Arc<dyn RemoteService>) -> Self {
        Self { remote }
    }

    /// Keyword search in the service's relevance order. Requires a valid
    /// session. Malformed records are dropped and counted; only a page
    /// where every record is malformed fails the call.
    pub async fn search(
        &self,
        session: &SessionManager,
        keyword: &str,
        limit: u32,
    ) -> BridgeResult<SearchOutcome> {
        if keyword.trim().is_empty() {
            return Err(BridgeError::invalid_argument(
                "search keyword must not be empty",
            ));
        }
        let token = session.ensure_valid().await?;
        let raw = self.remote.search_songs(&token, keyword, limit).await?;

        let total = raw.len();
        let mut tracks = Vec::with_capacity(total);
        let mut skipped = 0u32;
        for value in raw {
            match serde_json::from_value::<wire::Song>(value) {
                Ok(song) => tracks.push(map_track(song)),
                Err(err) => {
                    skipped += 1;
                    tracing::debug!(error = %err, "rejected malformed search record");
                }
            }
        }

        if total > 0 && tracks.is_empty() {
            return Err(BridgeError::Parse { skipped });
        }
        if skipped > 0 {
            tracing::warn!(skipped, keyword, "search page contained undecodable records");
        }
        Ok(SearchOutcome { tracks, skipped })
    }
}

fn map_track(song: wire::Song) -> Track {
    Track {
        id: TrackId::new(song.id),
        title: song.name,
        artist: song
            .artist
            .map(|a| a.name)
            .unwrap_or_else(|| "Unknown Artist".into()),
        duration_ms: song.duration_ms,
        album_id: song.album_id.map(AlbumId::from),
    }
}
