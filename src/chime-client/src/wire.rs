//! Serde models for the service's JSON payloads.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct QrKeyEnvelope {
    pub key: String,
    #[serde(rename = "qrUrl")]
    pub qr_url: String,
    #[serde(rename = "ttlSeconds", default)]
    pub ttl_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct QrPollEnvelope {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "authToken", default)]
    pub auth_token: Option<String>,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "expiresInSeconds", default)]
    pub expires_in_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshEnvelope {
    #[serde(rename = "authToken")]
    pub auth_token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    #[serde(rename = "expiresInSeconds", default)]
    pub expires_in_seconds: Option<u64>,
}

/// Search results arrive as raw values so one malformed record cannot sink
/// the whole page; per-record decoding happens in the search client.
#[derive(Debug, Deserialize)]
pub struct SongPagedEnvelope {
    pub data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Song {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub artist: Option<ArtistRef>,
    #[serde(rename = "durationMs", default)]
    pub duration_ms: Option<u64>,
    #[serde(rename = "albumId", default)]
    pub album_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_decodes_with_optional_fields_missing() {
        let song: Song =
            serde_json::from_str(r#"{"id": 41, "name": "Night Theme"}"#).expect("minimal song");
        assert_eq!(song.id, 41);
        assert!(song.artist.is_none());
        assert!(song.duration_ms.is_none());
    }

    #[test]
    fn song_without_id_is_rejected() {
        let result = serde_json::from_str::<Song>(r#"{"name": "No Id"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn poll_envelope_tolerates_missing_tokens() {
        let envelope: QrPollEnvelope =
            serde_json::from_str(r#"{"code": 801, "message": "waiting for scan"}"#)
                .expect("pending poll");
        assert_eq!(envelope.code, 801);
        assert!(envelope.auth_token.is_none());
    }
}
