#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use photo_atlas::config::Config;
use photo_atlas::handlers::AppState;
use photo_atlas::models::{DecimalCoordinate, TextFields};
use photo_atlas::router;
use photo_atlas::services::exif_codec;
use photo_atlas::services::geocoder::{GeocodeError, Geocoder, Location};
use photo_atlas::services::retry::Pause;

/// Geocoder answering from in-memory tables
#[derive(Default)]
pub struct FakeGeocoder {
    places: HashMap<String, Location>,
    failures: HashMap<String, u16>,
    reverse_address: Option<String>,
    reverse_times_out: bool,
    forward_queries: Mutex<Vec<String>>,
    reverse_calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, query: &str, address: &str, latitude: f64, longitude: f64) -> Self {
        self.places.insert(
            query.to_string(),
            Location {
                address: address.to_string(),
                position: DecimalCoordinate::new(latitude, longitude),
            },
        );
        self
    }

    /// Make `query` fail with an HTTP status
    pub fn with_failure(mut self, query: &str, status: u16) -> Self {
        self.failures.insert(query.to_string(), status);
        self
    }

    pub fn with_reverse_address(mut self, address: &str) -> Self {
        self.reverse_address = Some(address.to_string());
        self
    }

    pub fn with_reverse_timeouts(mut self) -> Self {
        self.reverse_times_out = true;
        self
    }

    pub fn forward_queries(&self) -> Vec<String> {
        self.forward_queries.lock().unwrap().clone()
    }

    pub fn reverse_calls(&self) -> usize {
        self.reverse_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Location>, GeocodeError> {
        self.forward_queries.lock().unwrap().push(query.to_string());
        if let Some(status) = self.failures.get(query) {
            return Err(GeocodeError::Status(*status));
        }
        Ok(self.places.get(query).cloned())
    }

    async fn reverse(&self, position: DecimalCoordinate) -> Result<Option<Location>, GeocodeError> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        if self.reverse_times_out {
            return Err(GeocodeError::Timeout);
        }
        Ok(self.reverse_address.as_ref().map(|address| Location {
            address: address.clone(),
            position,
        }))
    }
}

/// Returns immediately, recording what it was asked to wait
#[derive(Default)]
pub struct NoPause {
    pub pauses: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Pause for NoPause {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

pub fn test_server(geocoder: Arc<FakeGeocoder>, pause: Arc<NoPause>) -> TestServer {
    let config = Config::default();
    let state = AppState::new(geocoder, pause, &config);
    TestServer::new(router(state, &config)).unwrap()
}

/// Small JPEG without any EXIF
pub fn plain_jpeg() -> Vec<u8> {
    let pixels = image::RgbImage::from_pixel(16, 16, image::Rgb([30, 120, 200]));
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, 85)
        .encode_image(&pixels)
        .unwrap();
    bytes
}

/// JPEG carrying an artist and a GPS position
pub fn tagged_jpeg(artist: &str, position: DecimalCoordinate) -> Vec<u8> {
    let text = TextFields {
        artist: artist.to_string(),
        description: "Holiday".to_string(),
        copyright: String::new(),
        software: "camera".to_string(),
    };
    exif_codec::encode(&plain_jpeg(), &text, Some(position)).unwrap()
}
