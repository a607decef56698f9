use axum::{extract::State, response::Html, Json};

use super::AppState;
use crate::libraries::map_view::{bounding_box, route_length_km, MapView};
use crate::models::{DecimalCoordinate, LocationBatchResponse};

/// Resolve a location list (one place per line) for the places map.
///
/// Accepted line formats: `place or address`, `name, address` and
/// `name, latitude, longitude`. Lines that fail are reported in `warnings`.
pub async fn plot_locations(
    State(state): State<AppState>,
    body: String,
) -> Json<LocationBatchResponse> {
    let batch = state.locations.resolve_batch(&body).await;
    let positions: Vec<DecimalCoordinate> = batch.locations.iter().map(|l| l.position).collect();

    Json(LocationBatchResponse {
        route_length_km: route_length_km(&positions),
        bounds: bounding_box(&positions),
        locations: batch.locations,
        warnings: batch.warnings,
    })
}

/// Same input as [`plot_locations`], rendered as a map page. Failed lines
/// are listed above the map.
pub async fn locations_map(State(state): State<AppState>, body: String) -> Html<String> {
    let batch = state.locations.resolve_batch(&body).await;

    let mut view = MapView::for_locations(&batch.locations);
    view.add_line_warnings(&batch.warnings);
    Html(view.render_html("Places"))
}
