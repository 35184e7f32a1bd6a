use release_year_quiz::{create_router, AppConfig, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().json())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
    let bind_address = config.server.bind_address();
    let state = AppState::from_config(&config);
    let router = create_router(state);

    tracing::info!(%bind_address, "starting release-year-quiz server");

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
