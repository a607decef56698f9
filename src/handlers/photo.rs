use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::AppState;
use crate::error::ApiError;
use crate::libraries::coordinate_converter::gps_coordinates;
use crate::libraries::map_view::MapView;
use crate::models::{
    DecimalCoordinate, EditOutcome, GpsSummary, MetadataEdits, MetadataRecord, PhotoSummary,
    TextFields, UploadQuery,
};
use crate::services::exif_codec;
use crate::services::session::PhotoSession;

const DEFAULT_FILE_NAME: &str = "photo.jpg";
const MODIFIED_FILE_NAME: &str = "photo_modified.jpg";
const UNKNOWN_ADDRESS: &str = "Unknown address";
const NO_GPS_MESSAGE: &str = "No GPS coordinates detected";

/// Upload a JPEG and open an edit session for it
pub async fn create_session(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<PhotoSummary>), ApiError> {
    let session = load_photo(query.file_name, &body)?;
    let id = state.sessions.insert(session.clone()).await;
    info!("Opened session {} for {}", id, session.file_name);

    Ok((StatusCode::CREATED, Json(summarize(&state, &session).await)))
}

/// Replace the photo of an existing session. Any modified output is dropped.
pub async fn replace_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<PhotoSummary>, ApiError> {
    let loaded = load_photo(query.file_name, &body)?;

    let session = state
        .sessions
        .update(&id, |session| {
            session.file_name = loaded.file_name;
            session.original = loaded.original;
            session.metadata = loaded.metadata;
            session.coordinates = loaded.coordinates;
            session.modified = None;
            session.clone()
        })
        .await
        .ok_or(ApiError::SessionNotFound(id))?;
    info!("Replaced photo of session {} with {}", id, session.file_name);

    Ok(Json(summarize(&state, &session).await))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PhotoSummary>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;

    Ok(Json(summarize(&state, &session).await))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .remove(&id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;
    info!("Closed session {}", id);

    Ok(StatusCode::NO_CONTENT)
}

/// Apply the edit form to the session's photo.
///
/// A non-empty address is geocoded first; when it cannot be resolved the
/// GPS block is left alone and a warning is returned. The EXIF is always
/// re-encoded from the uploaded original. If encoding fails, or the photo
/// is replaced meanwhile, the previous modified image stays in place.
pub async fn apply_edits(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edits): Json<MetadataEdits>,
) -> Result<Json<EditOutcome>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;

    let current = TextFields::from_record(&session.metadata);
    let text = TextFields {
        artist: edits.artist.unwrap_or(current.artist),
        description: edits.description.unwrap_or(current.description),
        copyright: edits.copyright.unwrap_or(current.copyright),
        software: edits.software.unwrap_or(current.software),
    };

    let mut position = None;
    let mut address_found = None;
    let mut warning = None;

    let address = edits.address.as_deref().map(str::trim).unwrap_or_default();
    if !address.is_empty() {
        match state.geocoder.forward(address).await {
            Ok(Some(location)) => {
                debug!("Address '{}' resolved to {}", address, location.address);
                position = Some(location.position);
                address_found = Some(location.address);
            }
            Ok(None) => {
                warning = Some("Address not found, GPS coordinates unchanged".to_string());
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", address, e);
                warning = Some(format!("Geocoding failed, GPS coordinates unchanged: {}", e));
            }
        }
    }

    let output = exif_codec::encode(&session.original, &text, position)?;
    let metadata = exif_codec::decode(&output);
    let coordinates = gps_coordinates(&metadata);

    state
        .sessions
        .update(&id, |current| {
            store_edit(current, &session.original, output, metadata, coordinates)
        })
        .await
        .ok_or(ApiError::SessionNotFound(id))??;
    info!("Applied metadata edits to session {}", id);

    Ok(Json(EditOutcome {
        success: true,
        message: "Changes applied".to_string(),
        address_found,
        warning,
        coordinates,
    }))
}

/// Commit an encoded edit unless the photo it was encoded from has since
/// been replaced
fn store_edit(
    session: &mut PhotoSession,
    encoded_from: &Arc<Vec<u8>>,
    output: Vec<u8>,
    metadata: MetadataRecord,
    coordinates: Option<DecimalCoordinate>,
) -> Result<(), ApiError> {
    if !Arc::ptr_eq(&session.original, encoded_from) {
        warn!("Discarding edit of session {}: photo was replaced", session.id);
        return Err(ApiError::PhotoReplaced);
    }

    session.modified = Some(Arc::new(output));
    session.metadata = metadata;
    session.coordinates = coordinates;
    Ok(())
}

pub async fn original_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;

    Ok((
        [(header::CONTENT_TYPE, "image/jpeg")],
        session.original.as_ref().clone(),
    ))
}

/// Download the last successfully modified image
pub async fn modified_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;
    let modified = session.modified.ok_or(ApiError::NoModifiedImage)?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", MODIFIED_FILE_NAME),
            ),
        ],
        modified.as_ref().clone(),
    ))
}

/// Map page centered on the session's current GPS position
pub async fn photo_map(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;
    let position = session.coordinates.ok_or(ApiError::NoCoordinates)?;

    Ok(Html(MapView::for_photo(position).render_html("GPS map")))
}

fn load_photo(file_name: Option<String>, body: &[u8]) -> Result<PhotoSession, ApiError> {
    if body.is_empty() {
        return Err(ApiError::EmptyUpload);
    }
    if !exif_codec::is_jpeg(body) {
        return Err(ApiError::NotJpeg);
    }

    let metadata = exif_codec::decode(body);
    let coordinates = gps_coordinates(&metadata);
    let file_name = file_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string());

    Ok(PhotoSession::new(
        file_name,
        body.to_vec(),
        metadata,
        coordinates,
    ))
}

async fn summarize(state: &AppState, session: &PhotoSession) -> PhotoSummary {
    let gps = match session.coordinates {
        Some(position) => {
            let address = match state.geocoder.reverse(position).await {
                Ok(Some(location)) => location.address,
                Ok(None) => UNKNOWN_ADDRESS.to_string(),
                Err(e) => {
                    warn!("Reverse geocoding failed: {}", e);
                    UNKNOWN_ADDRESS.to_string()
                }
            };
            Some(GpsSummary {
                latitude: position.latitude,
                longitude: position.longitude,
                address,
            })
        }
        None => None,
    };

    PhotoSummary {
        session_id: session.id,
        file_name: session.file_name.clone(),
        metadata: session.metadata.listing(),
        message: gps.is_none().then(|| NO_GPS_MESSAGE.to_string()),
        gps,
        has_modified: session.modified.is_some(),
    }
}
