//! Publishes background work to an external queue service, which later
//! invokes `/worker` with a signed callback. Never fire-and-forget: if
//! publishing fails, the caller degrades the job rather than losing it
//! silently.

use reqwest::Client;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::Song;

const QUEUE_PUBLISH_URL: &str = "https://qstash.upstash.io/v2/publish";

#[derive(Serialize)]
struct WorkerPayload<'a> {
    #[serde(rename = "jobId")]
    job_id: &'a str,
    #[serde(rename = "songsToProcess")]
    songs_to_process: &'a [Song],
}

#[derive(Clone)]
pub struct QueueClient {
    client: Client,
    token: String,
    worker_url: String,
}

impl QueueClient {
    pub fn new(token: String, worker_url: String) -> Self {
        Self {
            client: Client::new(),
            token,
            worker_url,
        }
    }

    /// Enqueues the remaining songs for `job_id` to be processed by `/worker`.
    pub async fn publish(&self, job_id: &str, songs: &[Song]) -> Result<()> {
        let payload = WorkerPayload {
            job_id,
            songs_to_process: songs,
        };

        let resp = self
            .client
            .post(format!("{}/{}", QUEUE_PUBLISH_URL, self.worker_url))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::QueuePublishFailed(body));
        }

        Ok(())
    }
}
