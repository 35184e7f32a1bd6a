//! Release-year quiz pipeline: sample a playlist, resolve each song's
//! original release year against a discography catalog, and stream results
//! back to the client as they're resolved.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, ErrorResponse, Result};
pub use services::{CatalogClient, JobStore, QueueClient, Resolver, Sampler, StreamingClient};

/// The streaming client is retained here even though no HTTP route calls it
/// directly: a caller that wants a fresh randomized sample builds a
/// [`Sampler`] from [`AppState::streaming`] and runs it ahead of `/process`,
/// which only ever receives an already-sampled `firstSong`/`remainingSongs` split.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub job_store: Arc<JobStore>,
    pub queue: Arc<QueueClient>,
    pub streaming: Arc<StreamingClient>,
    pub sample_size: usize,
    pub signing_key: String,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let catalog = CatalogClient::new(config.catalog.api_token.clone());
        let streaming = StreamingClient::new(
            config.streaming.client_id.clone(),
            config.streaming.client_secret.clone(),
        );
        let job_store = JobStore::new(
            config.store.rest_api_url.clone(),
            config.store.rest_api_token.clone(),
        );
        let queue = QueueClient::new(config.queue.queue_token.clone(), "worker".to_string());

        Self {
            resolver: Arc::new(Resolver::new(catalog)),
            job_store: Arc::new(job_store),
            queue: Arc::new(queue),
            streaming: Arc::new(streaming),
            sample_size: config.sampler.sample_size,
            signing_key: config.queue.signing_key.clone(),
        }
    }

    pub fn sampler(&self) -> Sampler {
        Sampler::new((*self.streaming).clone(), self.sample_size)
    }
}

/// Builds the service's router: the three pipeline endpoints, an ambient
/// health check, and the tracing/CORS layers wrapping all of them.
pub fn create_router(state: AppState) -> Router {
    let worker_routes = Router::new()
        .route("/worker", post(handlers::worker::worker_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.signing_key.clone(),
            middleware::verify_queue_signature,
        ));

    let public_routes = Router::new()
        .route("/process", post(handlers::process::process_handler))
        .route("/stream", get(handlers::stream::stream_handler))
        .route("/health", get(handlers::health::health_handler));

    Router::new()
        .merge(public_routes)
        .merge(worker_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::create_cors_layer()),
        )
        .with_state(state)
}
