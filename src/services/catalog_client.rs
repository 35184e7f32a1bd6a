//! Client for the discography catalog: search, master, and release lookups.
//!
//! Every outbound call passes through a process-wide [`RateGate`] enforcing
//! a minimum 1-second spacing; there is no retry on failure, by design.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::services::rate_limiter::RateGate;

const CATALOG_API_BASE: &str = "https://api.discogs.com";
const USER_AGENT: &str = "release-year-quiz/0.1 (+https://example.invalid)";

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: u64,
    pub title: String,
    pub year: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Master {
    pub id: u64,
    pub title: String,
    pub year: Option<i64>,
    #[serde(rename = "main_release")]
    pub main_release_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseFormat {
    pub name: String,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub id: u64,
    pub title: String,
    pub released: Option<String>,
    #[serde(default)]
    pub formats: Vec<ReleaseFormat>,
}

#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    token: String,
    gate: RateGate,
    base_url: String,
}

impl CatalogClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, CATALOG_API_BASE.to_string())
    }

    /// Exposed so tests can point the client at a [`wiremock`] server
    /// instead of the real catalog host.
    pub fn with_base_url(token: String, base_url: String) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build catalog http client");

        Self {
            client,
            token,
            gate: RateGate::new(Duration::from_millis(1100)),
            base_url,
        }
    }

    /// Search for `master`-type candidates, sorted ascending by year.
    pub async fn search(
        &self,
        query: &str,
        per_page: usize,
        sort: &str,
    ) -> Result<Vec<SearchResult>> {
        self.gate.wait().await;

        let url = format!(
            "{}/database/search?q={}&type=master&per_page={}&sort={}",
            self.base_url,
            urlencoding::encode(query),
            per_page,
            sort
        );

        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Discogs token={}", self.token))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::CatalogError { status, body });
        }

        let parsed: SearchResponse = resp.json().await?;
        Ok(parsed.results)
    }

    pub async fn get_master(&self, id: u64) -> Result<Master> {
        self.gate.wait().await;

        let url = format!("{}/masters/{}", self.base_url, id);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Discogs token={}", self.token))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::CatalogError { status, body });
        }

        Ok(resp.json().await?)
    }

    pub async fn get_release(&self, id: u64) -> Result<Release> {
        self.gate.wait().await;

        let url = format!("{}/releases/{}", self.base_url, id);
        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("Discogs token={}", self.token))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::CatalogError { status, body });
        }

        Ok(resp.json().await?)
    }
}
