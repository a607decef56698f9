use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photo_atlas::{
    config::Config,
    handlers::AppState,
    router,
    services::{geocoder::NominatimGeocoder, retry::TokioPause},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photo_atlas=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting photo atlas service");

    let geocoder = NominatimGeocoder::new(
        &config.geocoder_url,
        &config.geocoder_user_agent,
        config.geocode_timeout(),
    )?;
    info!("Geocoding through {}", config.geocoder_url);

    let state = AppState::new(Arc::new(geocoder), Arc::new(TokioPause), &config);

    // Drop idle sessions in the background
    let sessions = state.sessions.clone();
    let ttl = chrono::Duration::seconds(config.session_ttl_secs as i64);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let purged = sessions.purge_idle(ttl).await;
            if purged > 0 {
                info!("Purged {} idle sessions", purged);
            }
        }
    });

    let app = router(state, &config)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    info!("Shutting down...");
    Ok(())
}
