use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error as _;
use std::time::Duration;

use crate::models::DecimalCoordinate;

/// A geocoding answer: coordinates plus the service's formatted address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub position: DecimalCoordinate,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding request timed out")]
    Timeout,

    #[error("Geocoding request failed: {0}")]
    Request(String),

    #[error("Geocoding service returned HTTP {0}")]
    Status(u16),

    #[error("Failed to parse geocoding response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return GeocodeError::Timeout;
        }

        // Keep the full error chain, reqwest hides the root cause otherwise
        let mut message = e.to_string();
        let mut source = e.source();
        while let Some(err) = source {
            message.push_str(&format!(": {}", err));
            source = err.source();
        }
        GeocodeError::Request(message)
    }
}

/// Forward and reverse geocoding collaborator
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve free text to a location; `Ok(None)` when nothing matches
    async fn geocode(&self, query: &str) -> Result<Option<Location>, GeocodeError>;

    /// Resolve coordinates to a formatted address
    async fn reverse(&self, position: DecimalCoordinate) -> Result<Option<Location>, GeocodeError>;
}

/// Nominatim place as returned by `format=jsonv2`
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

/// Reverse lookups answer `{"error": ...}` when nothing is found
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NominatimReverse {
    Place(NominatimPlace),
    Error { error: String },
}

impl NominatimPlace {
    fn into_location(self) -> Result<Location, GeocodeError> {
        let latitude = self
            .lat
            .parse::<f64>()
            .map_err(|_| GeocodeError::Parse(format!("invalid latitude '{}'", self.lat)))?;
        let longitude = self
            .lon
            .parse::<f64>()
            .map_err(|_| GeocodeError::Parse(format!("invalid longitude '{}'", self.lon)))?;

        Ok(Location {
            address: self.display_name,
            position: DecimalCoordinate::new(latitude, longitude),
        })
    }
}

/// Geocoder backed by an OpenStreetMap Nominatim instance
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Every call is bounded by `timeout`; the user agent identifies this
    /// client to the service as its usage policy requires.
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<String, GeocodeError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self.client.get(&url).query(params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!("Geocoding service returned HTTP {}", status);
            return Err(GeocodeError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Location>, GeocodeError> {
        tracing::info!("🌍 Geocoding '{}'", query);
        let body = self
            .get_json(
                "search",
                &[
                    ("q", query.to_string()),
                    ("format", "jsonv2".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        parse_search(&body)
    }

    async fn reverse(&self, position: DecimalCoordinate) -> Result<Option<Location>, GeocodeError> {
        tracing::info!(
            "🌍 Reverse geocoding ({}, {})",
            position.latitude,
            position.longitude
        );
        let body = self
            .get_json(
                "reverse",
                &[
                    ("lat", position.latitude.to_string()),
                    ("lon", position.longitude.to_string()),
                    ("format", "jsonv2".to_string()),
                ],
            )
            .await?;
        parse_reverse(&body)
    }
}

fn parse_search(body: &str) -> Result<Option<Location>, GeocodeError> {
    let places: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

    places
        .into_iter()
        .next()
        .map(NominatimPlace::into_location)
        .transpose()
}

fn parse_reverse(body: &str) -> Result<Option<Location>, GeocodeError> {
    let answer: NominatimReverse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

    match answer {
        NominatimReverse::Place(place) => place.into_location().map(Some),
        NominatimReverse::Error { error } => {
            tracing::debug!("Reverse geocoding found nothing: {}", error);
            Ok(None)
        }
    }
}
