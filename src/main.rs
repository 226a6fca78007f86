use anyhow::Result;
use stay_translator::{config, routes};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stay_translator=info".parse()?),
        )
        .init();

    // Load configuration from environment
    let config = config::Config::from_env()?;

    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; translation requests will fail");
    }
    if config.api_key.is_none() {
        info!("API_KEY is not set; /api/translate is open to anyone who can reach it");
    }

    info!(
        "Starting stay-translator (host language {}, model {})",
        config.host_lang, config.openai_model
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let app = routes::create_routes(routes::AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
