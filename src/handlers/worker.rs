//! `POST /worker` — consumes a queued job and resolves its remaining songs.
//!
//! Reached only via the signature-verification middleware, which runs
//! before this handler and rejects unsigned callers.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{JobStatus, Song};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WorkerRequest {
    #[serde(rename = "jobId")]
    pub job_id: String,
    #[serde(rename = "songsToProcess")]
    pub songs_to_process: Vec<Song>,
}

#[derive(Debug, Serialize)]
pub struct WorkerResponse {
    pub success: bool,
}

pub async fn worker_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<WorkerRequest>, JsonRejection>,
) -> Result<Json<WorkerResponse>> {
    let Json(req) = body.map_err(AppError::from)?;

    if req.job_id.is_empty() {
        return Err(AppError::BadRequest("jobId is required".to_string()));
    }

    tracing::info!(job_id = %req.job_id, songs = req.songs_to_process.len(), "worker picked up job");

    let result = run_job(&state, &req.job_id, &req.songs_to_process).await;

    if let Err(e) = &result {
        tracing::error!(job_id = %req.job_id, error = %e, "worker failed");
        let _ = state
            .job_store
            .set_status(&req.job_id, JobStatus::WorkerFailed)
            .await;
    }

    result?;
    Ok(Json(WorkerResponse { success: true }))
}

async fn run_job(state: &AppState, job_id: &str, songs: &[Song]) -> Result<()> {
    state.job_store.set_status(job_id, JobStatus::Processing).await?;

    for song in songs {
        // Resolver::resolve never returns Err; any unresolved source already
        // falls back to streaming metadata internally. A store-level
        // failure here is the only real error path, and it aborts the job.
        let processed = state.resolver.resolve(song).await;
        state.job_store.append_result(job_id, &processed).await?;
    }

    state.job_store.set_status(job_id, JobStatus::Complete).await?;
    Ok(())
}
