//! Job Store: a typed wrapper over a Redis-compatible key/value store,
//! addressed over its HTTP REST API rather than a raw TCP connection.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Job, JobStatus, ProcessedSong};

const JOB_TTL_SECONDS: u64 = 3600;

#[derive(Clone)]
pub struct JobStore {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Deserialize)]
struct CommandResponse {
    result: serde_json::Value,
}

impl JobStore {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn command(&self, parts: &[&str]) -> Result<serde_json::Value> {
        let resp = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&parts)
            .send()
            .await?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::StoreUnavailable(body));
        }

        let parsed: CommandResponse = resp.json().await?;
        Ok(parsed.result)
    }

    fn status_key(job_id: &str) -> String {
        format!("job:{}:status", job_id)
    }

    fn results_key(job_id: &str) -> String {
        format!("job:{}:results", job_id)
    }

    fn years_key(job_id: &str) -> String {
        format!("job:{}:years", job_id)
    }

    pub async fn init_job(&self, job_id: &str, first_year: &str) -> Result<()> {
        let status_key = Self::status_key(job_id);
        let results_key = Self::results_key(job_id);
        let years_key = Self::years_key(job_id);
        let ttl = JOB_TTL_SECONDS.to_string();

        self.command(&["SET", &status_key, JobStatus::Queued.as_str(), "EX", &ttl])
            .await?;
        self.command(&["DEL", &results_key]).await?;
        self.command(&["EXPIRE", &results_key, &ttl]).await?;
        self.command(&["SADD", &years_key, first_year]).await?;
        self.command(&["EXPIRE", &years_key, &ttl]).await?;
        Ok(())
    }

    pub async fn set_status(&self, job_id: &str, status: JobStatus) -> Result<()> {
        let status_key = Self::status_key(job_id);
        let ttl = JOB_TTL_SECONDS.to_string();
        self.command(&["SET", &status_key, status.as_str(), "EX", &ttl])
            .await?;
        Ok(())
    }

    pub async fn get_status(&self, job_id: &str) -> Result<Option<JobStatus>> {
        let status_key = Self::status_key(job_id);
        let value = self.command(&["GET", &status_key]).await?;
        Ok(value.as_str().and_then(JobStatus::parse))
    }

    /// Appends `processed` unless its year is already present in the job's
    /// year set. Returns whether the append happened. `SADD`'s own atomicity
    /// is what makes this safe under concurrent callers on the same job.
    pub async fn append_result(&self, job_id: &str, processed: &ProcessedSong) -> Result<bool> {
        let years_key = Self::years_key(job_id);
        let added = self
            .command(&["SADD", &years_key, &processed.release_year])
            .await?;

        if added.as_i64() != Some(1) {
            return Ok(false);
        }

        let results_key = Self::results_key(job_id);
        let ttl = JOB_TTL_SECONDS.to_string();
        let payload = serde_json::to_string(processed)?;
        self.command(&["RPUSH", &results_key, &payload]).await?;
        self.command(&["EXPIRE", &results_key, &ttl]).await?;
        self.command(&["EXPIRE", &years_key, &ttl]).await?;
        Ok(true)
    }

    pub async fn list_results(&self, job_id: &str, from: usize) -> Result<Vec<ProcessedSong>> {
        let results_key = Self::results_key(job_id);
        let from_str = from.to_string();
        let raw = self
            .command(&["LRANGE", &results_key, &from_str, "-1"])
            .await?;

        let entries = raw.as_array().cloned().unwrap_or_default();
        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(s) = entry.as_str() {
                out.push(serde_json::from_str(s)?);
            }
        }
        Ok(out)
    }

    pub async fn load_job(&self, job_id: &str) -> Result<Option<Job>> {
        let status = match self.get_status(job_id).await? {
            Some(s) => s,
            None => return Ok(None),
        };
        let results = self.list_results(job_id, 0).await?;
        let years = results.iter().map(|r| r.release_year.clone()).collect();
        Ok(Some(Job {
            id: job_id.to_string(),
            status,
            results,
            years,
        }))
    }

    pub async fn delete(&self, job_id: &str) -> Result<()> {
        let status_key = Self::status_key(job_id);
        let results_key = Self::results_key(job_id);
        let years_key = Self::years_key(job_id);
        self.command(&["DEL", &status_key, &results_key, &years_key])
            .await?;
        Ok(())
    }
}
