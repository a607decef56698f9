use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use crate::services::exif_codec::MetadataError;
use crate::services::geocoder::GeocodeError;

/// Errors surfaced to HTTP clients. Each one is scoped to the request that
/// raised it.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Upload is empty")]
    EmptyUpload,

    #[error("Only JPEG images are supported")]
    NotJpeg,

    #[error("No modified image yet, apply edits first")]
    NoModifiedImage,

    #[error("No GPS coordinates detected")]
    NoCoordinates,

    #[error("Photo was replaced while applying edits")]
    PhotoReplaced,

    #[error("EXIF error: {0}")]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::EmptyUpload => StatusCode::BAD_REQUEST,
            ApiError::NotJpeg => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::NoModifiedImage | ApiError::NoCoordinates => StatusCode::NOT_FOUND,
            ApiError::PhotoReplaced => StatusCode::CONFLICT,
            ApiError::Metadata(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Geocode(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("Request failed: {}", self);
        }

        (
            status,
            Json(serde_json::json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}
