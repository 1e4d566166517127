use serde::{Deserialize, Serialize};

/// A remote-service track identifier.
///
/// The service issues numeric song ids that are stable across runs and fit
/// the fixed-width record layout exposed at the bridge boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
pub struct TrackId(pub i32);

impl TrackId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }
}

impl From<i32> for TrackId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// A remote-service album identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct AlbumId(pub String);

impl AlbumId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl AsRef<str> for AlbumId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AlbumId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for AlbumId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Track metadata returned from a search query.
///
/// Immutable value with no backing store; a fresh set is produced per query
/// in the relevance order the service returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    /// Duration in milliseconds when known.
    pub duration_ms: Option<u64>,
    pub album_id: Option<AlbumId>,
}
