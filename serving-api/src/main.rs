//! Banknote Authentication API server

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use banknote_api::{create_router, AppState, Config, ModelBundle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "banknote_api=debug,tower_http=debug".into());
    if config.json_logs || config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!(environment = %config.environment, "Banknote API starting...");

    // Models are loaded once; refuse to start without them
    let models = ModelBundle::load(&config.scaler_path, &config.model_path)
        .with_context(|| {
            format!(
                "failed to load model artifacts (scaler: {}, model: {})",
                config.scaler_path, config.model_path
            )
        })?;

    models
        .health_check()
        .context("loaded models failed the startup health check")?;

    let addr = config.bind_addr();
    let app = create_router(AppState::new(models, config));

    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
