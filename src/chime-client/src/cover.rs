//! Static artwork URL composition; no network involved.

/// Artwork content categories the service hosts images for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverKind {
    Album,
    Playlist,
    User,
}

impl CoverKind {
    fn segment(&self) -> &'static str {
        match self {
            CoverKind::Album => "album",
            CoverKind::Playlist => "playlist",
            CoverKind::User => "user",
        }
    }
}

const ART_BASE: &str = "https://art.chime.io";
const ART_SIZE: u32 = 300;

pub fn cover_url(kind: CoverKind, content_id: &str) -> String {
    format!("{ART_BASE}/{}/{}_{ART_SIZE}.jpg", kind.segment(), content_id)
}
