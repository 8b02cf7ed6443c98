use std::sync::Arc;

use newsdesk::config::Config;
use newsdesk::fetcher::Fetcher;
use newsdesk::routes::{self, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "newsdesk=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::load_or_default("sources.toml")?);
    info!(
        "Loaded {} RSS sources and {} community sources",
        config.rss_sources.len(),
        config.community_sources.len()
    );

    let fetcher = Fetcher::new(config.clone())?;
    let app = routes::router(Arc::new(AppState { fetcher }));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Server starting on http://{}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
