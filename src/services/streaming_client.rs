//! Client-credentials OAuth client for the streaming service: fetches
//! playlist metadata and tracks, caching its bearer token until it is within
//! its final second of validity.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};

const STREAMING_API_BASE: &str = "https://api.spotify.com/v1";
const STREAMING_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const MAX_PAGE_SIZE: usize = 50;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackAlbum {
    #[serde(rename = "release_date")]
    pub release_date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUrls {
    pub spotify: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub name: String,
    pub artists: Vec<TrackArtist>,
    pub album: TrackAlbum,
    #[serde(rename = "external_urls")]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct PlaylistTotal {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct PlaylistPage {
    items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Track,
}

#[derive(Clone)]
pub struct StreamingClient {
    client: Client,
    client_id: String,
    client_secret: String,
    token: Arc<RwLock<Option<CachedToken>>>,
    api_base: String,
    token_url: String,
}

impl StreamingClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self::with_urls(
            client_id,
            client_secret,
            STREAMING_API_BASE.to_string(),
            STREAMING_TOKEN_URL.to_string(),
        )
    }

    /// Exposed so tests can point the client at a [`wiremock`] server
    /// instead of the real streaming host.
    pub fn with_urls(
        client_id: String,
        client_secret: String,
        api_base: String,
        token_url: String,
    ) -> Self {
        Self {
            client: Client::new(),
            client_id,
            client_secret,
            token: Arc::new(RwLock::new(None)),
            api_base,
            token_url,
        }
    }

    async fn ensure_token(&self) -> Result<String> {
        {
            let cached = self.token.read().await;
            if let Some(t) = cached.as_ref() {
                if t.expires_at > Instant::now() + Duration::from_secs(1) {
                    return Ok(t.value.clone());
                }
            }
        }
        self.refresh_token().await
    }

    async fn refresh_token(&self) -> Result<String> {
        let resp = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::StreamingError { status, body });
        }

        let parsed: TokenResponse = resp.json().await?;
        let mut cached = self.token.write().await;
        *cached = Some(CachedToken {
            value: parsed.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(parsed.expires_in),
        });
        Ok(parsed.access_token)
    }

    pub async fn get_playlist_total(&self, playlist_id: &str) -> Result<u64> {
        let token = self.ensure_token().await?;
        let url = format!(
            "{}/playlists/{}?fields=tracks.total",
            self.api_base, playlist_id
        );
        let resp = self.client.get(&url).bearer_auth(&token).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::StreamingError { status, body });
        }

        #[derive(Deserialize)]
        struct Wrapper {
            tracks: PlaylistTotal,
        }
        let wrapper: Wrapper = resp.json().await?;
        Ok(wrapper.tracks.total)
    }

    /// The API's max page size, exposed so callers can compute page-aligned
    /// offsets without duplicating the constant.
    pub fn page_size(&self) -> usize {
        MAX_PAGE_SIZE
    }

    /// Fetches one page of tracks at the API's max page size.
    pub async fn get_playlist_tracks(
        &self,
        playlist_id: &str,
        offset: usize,
    ) -> Result<Vec<Track>> {
        let token = self.ensure_token().await?;
        let url = format!(
            "{}/playlists/{}/tracks?limit={}&offset={}",
            self.api_base, playlist_id, MAX_PAGE_SIZE, offset
        );
        let resp = self.client.get(&url).bearer_auth(&token).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::StreamingError { status, body });
        }

        let page: PlaylistPage = resp.json().await?;
        Ok(page.items.into_iter().map(|i| i.track).collect())
    }
}
