//! `GET /stream?jobId=...` — polls the Job Store every second and emits
//! each newly resolved song, closing with a terminal `done` event.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::Stream;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::AppState;

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    #[serde(rename = "jobId")]
    pub job_id: String,
}

pub async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    if query.job_id.is_empty() {
        return Err(AppError::BadRequest("jobId is required".to_string()));
    }

    let stream = async_stream::stream! {
        let deadline = tokio::time::Instant::now() + MAX_CONNECTION_LIFETIME;
        let mut last_index = 0usize;

        loop {
            if tokio::time::Instant::now() >= deadline {
                break;
            }

            let results = state.job_store.list_results(&query.job_id, last_index).await;
            let results = match results {
                Ok(r) => r,
                Err(e) => {
                    yield Ok(Event::default().event("error").data(error_payload(&e.to_string())));
                    break;
                }
            };

            for song in &results {
                let data = serde_json::to_string(song).unwrap_or_else(|_| "{}".to_string());
                yield Ok(Event::default().event("song").data(data));
                last_index += 1;
            }

            match state.job_store.get_status(&query.job_id).await {
                Ok(Some(status)) if status.is_terminal() => {
                    yield Ok(Event::default().event("done").data(status.as_str()));
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    yield Ok(Event::default().event("error").data(error_payload(&e.to_string())));
                    break;
                }
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn error_payload(message: &str) -> String {
    serde_json::json!({ "message": message }).to_string()
}
