pub mod locations;
pub mod photo;

use axum::{response::IntoResponse, Json};
use std::sync::Arc;

use crate::config::Config;
use crate::libraries::location_parser::LocationResolver;
use crate::services::geocoder::Geocoder;
use crate::services::retry::{GeocodeRetrier, Pause, RetryPolicy};
use crate::services::session::SessionStore;

pub use locations::{locations_map, plot_locations};
pub use photo::{
    apply_edits, create_session, delete_session, get_session, modified_photo, original_photo,
    photo_map, replace_photo,
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub geocoder: Arc<GeocodeRetrier>,
    pub locations: Arc<LocationResolver>,
}

impl AppState {
    pub fn new(geocoder: Arc<dyn Geocoder>, pause: Arc<dyn Pause>, config: &Config) -> Self {
        let policy = RetryPolicy {
            max_attempts: config.geocode_max_attempts,
            delay: config.retry_delay(),
        };
        let retrier = Arc::new(GeocodeRetrier::new(geocoder, pause.clone(), policy));
        let locations = LocationResolver::new(retrier.clone(), pause, config.rate_limit_delay());

        Self {
            sessions: Arc::new(SessionStore::new()),
            geocoder: retrier,
            locations: Arc::new(locations),
        }
    }
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "photo-atlas",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
