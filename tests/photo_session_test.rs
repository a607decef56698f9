mod common;

use axum::body::Bytes;
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;

use common::{plain_jpeg, tagged_jpeg, test_server, FakeGeocoder, NoPause};
use photo_atlas::libraries::coordinate_converter::gps_coordinates;
use photo_atlas::models::{DecimalCoordinate, EditOutcome, PhotoSummary};
use photo_atlas::services::exif_codec;

const EIFFEL: DecimalCoordinate = DecimalCoordinate {
    latitude: 48.8584,
    longitude: 2.2945,
};

async fn upload(server: &axum_test::TestServer, bytes: Vec<u8>) -> PhotoSummary {
    let response = server
        .post("/api/sessions")
        .add_query_param("file_name", "holiday.jpg")
        .bytes(Bytes::from(bytes))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<PhotoSummary>()
}

#[tokio::test]
async fn test_rejects_non_jpeg_uploads() {
    let server = test_server(Arc::new(FakeGeocoder::new()), Arc::new(NoPause::default()));

    let response = server
        .post("/api/sessions")
        .bytes(Bytes::from_static(b"\x89PNG\r\n\x1a\n"))
        .await;
    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let response = server.post("/api/sessions").bytes(Bytes::new()).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Upload is empty");
}

#[tokio::test]
async fn test_upload_without_gps() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let server = test_server(geocoder.clone(), Arc::new(NoPause::default()));

    let summary = upload(&server, plain_jpeg()).await;

    assert_eq!(summary.file_name, "holiday.jpg");
    assert!(summary.gps.is_none());
    assert_eq!(summary.message.as_deref(), Some("No GPS coordinates detected"));
    assert!(!summary.has_modified);
    assert_eq!(geocoder.reverse_calls(), 0);
}

#[tokio::test]
async fn test_upload_with_gps_reverse_geocodes() {
    let geocoder =
        Arc::new(FakeGeocoder::new().with_reverse_address("Tour Eiffel, Paris, France"));
    let server = test_server(geocoder.clone(), Arc::new(NoPause::default()));

    let summary = upload(&server, tagged_jpeg("Ada", EIFFEL)).await;

    let gps = summary.gps.unwrap();
    assert!((gps.latitude - EIFFEL.latitude).abs() < 1e-5);
    assert!((gps.longitude - EIFFEL.longitude).abs() < 1e-5);
    assert_eq!(gps.address, "Tour Eiffel, Paris, France");
    assert_eq!(summary.metadata["Artist"], "Ada");
    assert!(!summary.metadata.contains_key("GPSLatitude"));
    assert_eq!(geocoder.reverse_calls(), 1);
}

#[tokio::test]
async fn test_reverse_timeouts_give_unknown_address() {
    let geocoder = Arc::new(FakeGeocoder::new().with_reverse_timeouts());
    let pause = Arc::new(NoPause::default());
    let server = test_server(geocoder.clone(), pause.clone());

    let summary = upload(&server, tagged_jpeg("Ada", EIFFEL)).await;

    assert_eq!(summary.gps.unwrap().address, "Unknown address");
    assert_eq!(geocoder.reverse_calls(), 3);
    assert_eq!(pause.pauses.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_apply_edits_with_address() {
    let geocoder = Arc::new(FakeGeocoder::new().with_place(
        "Colosseum, Rome",
        "Colosseo, Piazza del Colosseo, Roma, Italia",
        41.8902,
        12.4922,
    ));
    let server = test_server(geocoder.clone(), Arc::new(NoPause::default()));
    let summary = upload(&server, plain_jpeg()).await;
    let id = summary.session_id;

    let response = server
        .post(&format!("/api/sessions/{}/edits", id))
        .json(&json!({
            "address": "Colosseum, Rome",
            "artist": "Grace Hopper",
            "description": "Ancient amphitheatre",
            "copyright": "CC-BY-4.0",
            "software": "photo-atlas"
        }))
        .await;
    response.assert_status_ok();
    let outcome: EditOutcome = response.json();

    assert!(outcome.success);
    assert!(outcome.warning.is_none());
    assert_eq!(
        outcome.address_found.as_deref(),
        Some("Colosseo, Piazza del Colosseo, Roma, Italia")
    );
    let coordinates = outcome.coordinates.unwrap();
    assert!((coordinates.latitude - 41.8902).abs() < 1e-5);
    assert_eq!(geocoder.forward_queries(), vec!["Colosseum, Rome".to_string()]);

    let download = server
        .get(&format!("/api/sessions/{}/photo/modified", id))
        .await;
    download.assert_status_ok();
    assert_eq!(
        download.header("content-disposition"),
        "attachment; filename=\"photo_modified.jpg\""
    );
    assert_eq!(download.header("content-type"), "image/jpeg");

    let record = exif_codec::decode(download.as_bytes());
    assert_eq!(record.text("Artist"), "Grace Hopper");
    assert_eq!(record.text("ImageDescription"), "Ancient amphitheatre");
    assert_eq!(record.text("Copyright"), "CC-BY-4.0");
    assert_eq!(record.text("Software"), "photo-atlas");
    let position = gps_coordinates(&record).unwrap();
    assert!((position.longitude - 12.4922).abs() < 1e-5);

    let summary: PhotoSummary = server.get(&format!("/api/sessions/{}", id)).await.json();
    assert!(summary.has_modified);
    assert_eq!(summary.metadata["Artist"], "Grace Hopper");
}

#[tokio::test]
async fn test_unknown_address_keeps_gps_and_still_saves() {
    let geocoder = Arc::new(FakeGeocoder::new());
    let server = test_server(geocoder, Arc::new(NoPause::default()));
    let id = upload(&server, tagged_jpeg("Ada", EIFFEL)).await.session_id;

    let outcome: EditOutcome = server
        .post(&format!("/api/sessions/{}/edits", id))
        .json(&json!({ "address": "Atlantis", "copyright": "All rights reserved" }))
        .await
        .json();

    assert!(outcome.success);
    assert_eq!(
        outcome.warning.as_deref(),
        Some("Address not found, GPS coordinates unchanged")
    );
    let coordinates = outcome.coordinates.unwrap();
    assert!((coordinates.latitude - EIFFEL.latitude).abs() < 1e-5);

    // Fields left out of the form keep their uploaded values
    let summary: PhotoSummary = server.get(&format!("/api/sessions/{}", id)).await.json();
    assert_eq!(summary.metadata["Artist"], "Ada");
    assert_eq!(summary.metadata["Copyright"], "All rights reserved");
}

#[tokio::test]
async fn test_geocoder_errors_become_warnings() {
    let geocoder = Arc::new(FakeGeocoder::new().with_failure("Paris", 503));
    let server = test_server(geocoder, Arc::new(NoPause::default()));
    let id = upload(&server, plain_jpeg()).await.session_id;

    let response = server
        .post(&format!("/api/sessions/{}/edits", id))
        .json(&json!({ "address": "Paris" }))
        .await;
    response.assert_status_ok();
    let outcome: EditOutcome = response.json();

    assert!(outcome.warning.unwrap().contains("HTTP 503"));
    assert!(outcome.coordinates.is_none());
}

#[tokio::test]
async fn test_unwritable_exif_is_rejected_and_session_kept() {
    let server = test_server(Arc::new(FakeGeocoder::new()), Arc::new(NoPause::default()));

    // Valid SOI and an EXIF APP1 whose TIFF header has no byte order mark
    let mut broken = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x0A];
    broken.extend_from_slice(b"Exif\0\0");
    broken.extend_from_slice(&[0x12, 0x34, 0xFF, 0xD9]);
    let id = upload(&server, broken.clone()).await.session_id;

    let response = server
        .post(&format!("/api/sessions/{}/edits", id))
        .json(&json!({ "artist": "Ada" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("EXIF error: Failed to read EXIF metadata"));

    let summary: PhotoSummary = server.get(&format!("/api/sessions/{}", id)).await.json();
    assert!(!summary.has_modified);
    assert!(summary.metadata.is_empty());
    server
        .get(&format!("/api/sessions/{}/photo/modified", id))
        .await
        .assert_status_not_found();

    let original = server.get(&format!("/api/sessions/{}/photo", id)).await;
    assert_eq!(original.as_bytes().as_ref(), broken.as_slice());
}

#[tokio::test]
async fn test_sessions_do_not_share_state() {
    let server = test_server(Arc::new(FakeGeocoder::new()), Arc::new(NoPause::default()));
    let first = upload(&server, plain_jpeg()).await.session_id;
    let second = upload(&server, plain_jpeg()).await.session_id;
    assert_ne!(first, second);

    server
        .post(&format!("/api/sessions/{}/edits", first))
        .json(&json!({ "artist": "First" }))
        .await
        .assert_status_ok();

    let other: PhotoSummary = server.get(&format!("/api/sessions/{}", second)).await.json();
    assert!(!other.has_modified);
    assert!(!other.metadata.contains_key("Artist"));

    server
        .get(&format!("/api/sessions/{}/photo/modified", second))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_replace_photo_drops_modified_output() {
    let server = test_server(Arc::new(FakeGeocoder::new()), Arc::new(NoPause::default()));
    let id = upload(&server, plain_jpeg()).await.session_id;

    server
        .post(&format!("/api/sessions/{}/edits", id))
        .json(&json!({ "artist": "Ada" }))
        .await
        .assert_status_ok();

    let response = server
        .put(&format!("/api/sessions/{}/photo", id))
        .bytes(Bytes::from(tagged_jpeg("Grace", EIFFEL)))
        .await;
    response.assert_status_ok();
    let summary: PhotoSummary = response.json();

    assert!(!summary.has_modified);
    assert_eq!(summary.file_name, "photo.jpg");
    assert_eq!(summary.metadata["Artist"], "Grace");
    assert!(summary.gps.is_some());
}

#[tokio::test]
async fn test_photo_map() {
    let server = test_server(Arc::new(FakeGeocoder::new()), Arc::new(NoPause::default()));

    let without_gps = upload(&server, plain_jpeg()).await.session_id;
    server
        .get(&format!("/api/sessions/{}/map", without_gps))
        .await
        .assert_status_not_found();

    let with_gps = upload(&server, tagged_jpeg("Ada", EIFFEL)).await.session_id;
    let response = server.get(&format!("/api/sessions/{}/map", with_gps)).await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("GPS position"));
    assert!(html.contains("\"zoom\":13"));
}

#[tokio::test]
async fn test_original_photo_and_delete() {
    let server = test_server(Arc::new(FakeGeocoder::new()), Arc::new(NoPause::default()));
    let original = plain_jpeg();
    let id = upload(&server, original.clone()).await.session_id;

    let response = server.get(&format!("/api/sessions/{}/photo", id)).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), original.as_slice());

    server
        .delete(&format!("/api/sessions/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/sessions/{}", id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_unknown_session() {
    let server = test_server(Arc::new(FakeGeocoder::new()), Arc::new(NoPause::default()));
    let id = uuid::Uuid::new_v4();

    let response = server
        .post(&format!("/api/sessions/{}/edits", id))
        .json(&json!({ "artist": "Nobody" }))
        .await;
    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], format!("Session {} not found", id));
}

#[tokio::test]
async fn test_health() {
    let server = test_server(Arc::new(FakeGeocoder::new()), Arc::new(NoPause::default()));
    let body: serde_json::Value = server.get("/health").await.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "photo-atlas");
}
