mod support;

use chime_client::{ChimeClient, QrStatus, RemoteService, DEFAULT_SEARCH_LIMIT};
use chime_core::models::TrackId;
use chime_core::BridgeError;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use support::ScriptedRemote;

const TTL: Duration = Duration::from_secs(3600);

async fn authenticated_client(remote: &Arc<ScriptedRemote>) -> ChimeClient {
    remote.push_confirmed("tok-1", "refresh-1", TTL);
    let client = ChimeClient::with_remote(Arc::clone(remote) as Arc<dyn RemoteService>, "device-test", TTL);
    client.begin_login().await.expect("begin login");
    let (status, _) = client.poll_login_status().await.expect("poll");
    assert_eq!(status, QrStatus::Confirmed);
    client
}

fn song(id: i32, name: &str, artist: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "artist": { "id": 1, "name": artist } })
}

#[tokio::test]
async fn empty_keyword_is_rejected_before_any_network_call() {
    let remote = Arc::new(ScriptedRemote::new());
    let client = ChimeClient::with_remote(Arc::clone(&remote) as Arc<dyn RemoteService>, "device-test", TTL);

    for keyword in ["", "   ", "\t"] {
        let err = client
            .search(keyword, DEFAULT_SEARCH_LIMIT)
            .await
            .expect_err("empty keyword");
        assert!(matches!(err, BridgeError::InvalidArgument { .. }));
    }
    assert_eq!(remote.search_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_without_session_fails() {
    let remote = Arc::new(ScriptedRemote::new());
    let client = ChimeClient::with_remote(Arc::clone(&remote) as Arc<dyn RemoteService>, "device-test", TTL);

    let err = client
        .search("theme", DEFAULT_SEARCH_LIMIT)
        .await
        .expect_err("no session");
    assert!(matches!(err, BridgeError::SessionExpired));
}

#[tokio::test]
async fn zero_matches_is_ok_and_empty() {
    let remote = Arc::new(ScriptedRemote::new());
    let client = authenticated_client(&remote).await;

    remote.push_search_page(vec![]);
    let outcome = client
        .search("xyzzy", DEFAULT_SEARCH_LIMIT)
        .await
        .expect("zero matches is not an error");
    assert!(outcome.tracks.is_empty());
    assert_eq!(outcome.skipped, 0);
}

#[tokio::test]
async fn relevance_order_is_preserved() {
    let remote = Arc::new(ScriptedRemote::new());
    let client = authenticated_client(&remote).await;

    remote.push_search_page(vec![
        song(30, "Closing Theme", "Trio"),
        song(10, "Opening Theme", "Solo"),
        song(20, "Mid Theme", "Duo"),
    ]);
    let outcome = client
        .search("theme", DEFAULT_SEARCH_LIMIT)
        .await
        .expect("search");
    let ids: Vec<TrackId> = outcome.tracks.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![TrackId::new(30), TrackId::new(10), TrackId::new(20)]);
}

#[tokio::test]
async fn malformed_records_are_skipped_and_counted() {
    let remote = Arc::new(ScriptedRemote::new());
    let client = authenticated_client(&remote).await;

    remote.push_search_page(vec![
        song(1, "Good One", "Artist"),
        json!({ "name": "missing id" }),
        json!("not even an object"),
        song(2, "Good Two", "Artist"),
    ]);
    let outcome = client
        .search("good", DEFAULT_SEARCH_LIMIT)
        .await
        .expect("partial success");
    assert_eq!(outcome.tracks.len(), 2);
    assert_eq!(outcome.skipped, 2);
    assert_eq!(outcome.tracks[0].title, "Good One");
}

#[tokio::test]
async fn a_fully_malformed_page_is_a_parse_error() {
    let remote = Arc::new(ScriptedRemote::new());
    let client = authenticated_client(&remote).await;

    remote.push_search_page(vec![json!({}), json!({ "id": "not a number" })]);
    let err = client
        .search("broken", DEFAULT_SEARCH_LIMIT)
        .await
        .expect_err("nothing decodable");
    match err {
        BridgeError::Parse { skipped } => assert_eq!(skipped, 2),
        other => panic!("expected Parse, got {other}"),
    }
}
