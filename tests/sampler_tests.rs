//! Exercises the sampler's paging and shuffling over a mocked streaming API.

use release_year_quiz::services::{Sampler, StreamingClient};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn track(name: &str, year: &str) -> serde_json::Value {
    json!({
        "track": {
            "name": name,
            "artists": [{"name": "Some Artist"}],
            "album": {"release_date": year},
            "external_urls": {"spotify": format!("https://open.spotify.com/track/{}", name)}
        }
    })
}

fn page_of(prefix: &str, count: usize) -> serde_json::Value {
    json!({
        "items": (0..count)
            .map(|i| track(&format!("{}-{}", prefix, i), "1994"))
            .collect::<Vec<_>>()
    })
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

fn streaming_for(server: &MockServer) -> StreamingClient {
    StreamingClient::with_urls(
        "id".to_string(),
        "secret".to_string(),
        server.uri(),
        format!("{}/api/token", server.uri()),
    )
}

#[tokio::test]
async fn sample_returns_every_track_when_playlist_is_small() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/playlists/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": {"total": 3}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlists/abc/tracks"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                track("Song A", "1994"),
                track("Song B", "1995"),
                track("Song C", "1996"),
            ]
        })))
        .mount(&server)
        .await;

    let sampler = Sampler::new(streaming_for(&server), 60);

    let songs = sampler.sample("abc").await.unwrap();

    assert_eq!(songs.len(), 3);
    let mut titles: Vec<&str> = songs.iter().map(|s| s.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["Song A", "Song B", "Song C"]);
}

#[tokio::test]
async fn sample_caps_at_configured_sample_size() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/playlists/big"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": {"total": 200}
        })))
        .mount(&server)
        .await;

    // Four pages of 50, each with content distinguishable by offset, so a
    // bug that always reads page 0 is visible rather than accidentally
    // matching every mock.
    for (offset, label) in [(0, "P0"), (50, "P1"), (100, "P2"), (150, "P3")] {
        Mock::given(method("GET"))
            .and(path("/playlists/big/tracks"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_of(label, 50)))
            .mount(&server)
            .await;
    }

    let sampler = Sampler::new(streaming_for(&server), 10);

    let songs = sampler.sample("big").await.unwrap();

    assert_eq!(songs.len(), 10);
}

#[tokio::test]
async fn sample_draws_from_pages_beyond_the_first() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/playlists/big"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": {"total": 200}
        })))
        .mount(&server)
        .await;

    for (offset, label) in [(0, "P0"), (50, "P1"), (100, "P2"), (150, "P3")] {
        Mock::given(method("GET"))
            .and(path("/playlists/big/tracks"))
            .and(query_param("offset", offset.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_of(label, 50)))
            .mount(&server)
            .await;
    }

    // sample_size = 50 means exactly one of the four 50-track pages is drawn
    // per call. Over many calls every page should show up eventually if the
    // offset is actually randomized rather than pinned to the first page.
    let sampler = Sampler::new(streaming_for(&server), 50);

    let mut pages_seen = std::collections::HashSet::new();
    for _ in 0..40 {
        let songs = sampler.sample("big").await.unwrap();
        assert_eq!(songs.len(), 50);
        if let Some(first) = songs.first() {
            let label = first.title.split('-').next().unwrap().to_string();
            pages_seen.insert(label);
        }
    }

    assert!(
        pages_seen.len() > 1,
        "expected offsets to vary across samples, only saw {:?}",
        pages_seen
    );
}

#[tokio::test]
async fn sample_returns_empty_for_empty_playlist() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/playlists/empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": {"total": 0}
        })))
        .mount(&server)
        .await;

    let sampler = Sampler::new(streaming_for(&server), 60);

    let songs = sampler.sample("empty").await.unwrap();
    assert!(songs.is_empty());
}
