//! `POST /process` — resolves the first song inline, enqueues the rest.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{JobStatus, ProcessedSong, Song};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    #[serde(rename = "firstSong")]
    pub first_song: Song,
    #[serde(rename = "remainingSongs", default)]
    pub remaining_songs: Vec<Song>,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    #[serde(rename = "processedSong")]
    pub processed_song: ProcessedSong,
    #[serde(rename = "jobId")]
    pub job_id: String,
}

pub async fn process_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>> {
    let Json(req) = body.map_err(AppError::from)?;

    tracing::info!(artist = %req.first_song.artist, title = %req.first_song.title, remaining = req.remaining_songs.len(), "processing playlist sample");

    let processed_first = state.resolver.resolve(&req.first_song).await;
    let job_id = Uuid::new_v4().to_string();

    state
        .job_store
        .init_job(&job_id, &processed_first.release_year)
        .await?;

    if req.remaining_songs.is_empty() {
        state.job_store.set_status(&job_id, JobStatus::Complete).await?;
    } else {
        match state.queue.publish(&job_id, &req.remaining_songs).await {
            Ok(()) => {}
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "failed to publish worker job");
                state
                    .job_store
                    .set_status(&job_id, JobStatus::PublishFailed)
                    .await?;
            }
        }
    }

    Ok(Json(ProcessResponse {
        processed_song: processed_first,
        job_id,
    }))
}
