pub mod config;
pub mod error;
pub mod handlers;
pub mod libraries;
pub mod models;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use config::Config;
use handlers::{
    apply_edits, create_session, delete_session, get_session, health, locations_map,
    modified_photo, original_photo, photo_map, plot_locations, replace_photo, AppState,
};

/// All routes of the service, without the tracing and CORS layers
pub fn router(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        .route(
            "/api/sessions/:id/photo",
            get(original_photo).put(replace_photo),
        )
        .route("/api/sessions/:id/photo/modified", get(modified_photo))
        .route("/api/sessions/:id/edits", post(apply_edits))
        .route("/api/sessions/:id/map", get(photo_map))
        .route("/api/locations", post(plot_locations))
        .route("/api/locations/map", post(locations_map))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state)
}
