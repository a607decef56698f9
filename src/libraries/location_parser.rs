use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::{DecimalCoordinate, LineWarning, NamedLocation};
use crate::services::geocoder::GeocodeError;
use crate::services::retry::{GeocodeRetrier, Pause};

/// One classified line of the location list
#[derive(Debug, Clone, PartialEq)]
pub enum LocationLine {
    /// `name, latitude, longitude`
    Literal(NamedLocation),
    /// `name, query`
    Named { name: String, query: String },
    /// `query`; the display name comes from the geocoder
    Query(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("Invalid {field} value: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Coordinates out of range: {latitude}, {longitude}")]
    OutOfRange { latitude: f64, longitude: f64 },

    #[error("Location not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Geocoder(#[from] GeocodeError),
}

/// Classify a line by the number of comma separated fields.
///
/// Blank lines yield `Ok(None)`. Lines with more than three fields use the
/// first field as the geocoding query.
pub fn parse_line(line: &str) -> Result<Option<LocationLine>, LineError> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [name, latitude, longitude] => {
            let position = DecimalCoordinate::new(
                parse_number("latitude", latitude)?,
                parse_number("longitude", longitude)?,
            );
            if !position.is_valid() {
                return Err(LineError::OutOfRange {
                    latitude: position.latitude,
                    longitude: position.longitude,
                });
            }
            Ok(Some(LocationLine::Literal(NamedLocation {
                name: name.to_string(),
                position,
            })))
        }
        [name, query] => Ok(Some(LocationLine::Named {
            name: name.to_string(),
            query: query.to_string(),
        })),
        [query, ..] => Ok(Some(LocationLine::Query(query.to_string()))),
        [] => Ok(None),
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, LineError> {
    value.parse::<f64>().map_err(|_| LineError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Locations that could be plotted, plus one warning per failed line
#[derive(Debug, Clone, Default)]
pub struct LocationBatch {
    pub locations: Vec<NamedLocation>,
    pub warnings: Vec<LineWarning>,
}

/// Turns a multi-line location list into plottable locations
pub struct LocationResolver {
    retrier: Arc<GeocodeRetrier>,
    pause: Arc<dyn Pause>,
    rate_limit_delay: Duration,
}

impl LocationResolver {
    pub fn new(retrier: Arc<GeocodeRetrier>, pause: Arc<dyn Pause>, rate_limit_delay: Duration) -> Self {
        Self {
            retrier,
            pause,
            rate_limit_delay,
        }
    }

    /// Resolve every line in order. A failing line is reported and skipped,
    /// the rest of the batch still runs.
    pub async fn resolve_batch(&self, input: &str) -> LocationBatch {
        let mut batch = LocationBatch::default();

        for (index, line) in input.lines().enumerate() {
            let parsed = match parse_line(line) {
                Ok(Some(parsed)) => parsed,
                Ok(None) => continue,
                Err(e) => {
                    batch.warnings.push(line_warning(index, line, &e));
                    continue;
                }
            };

            let geocoded = !matches!(parsed, LocationLine::Literal(_));
            let result = self.resolve_line(parsed).await;
            if geocoded {
                // Stay within the geocoding service's usage policy
                self.pause.pause(self.rate_limit_delay).await;
            }

            match result {
                Ok(location) => {
                    debug!(
                        "Resolved '{}' to ({}, {})",
                        location.name, location.position.latitude, location.position.longitude
                    );
                    batch.locations.push(location);
                }
                Err(e) => batch.warnings.push(line_warning(index, line, &e)),
            }
        }

        info!(
            "Resolved {} locations with {} warnings",
            batch.locations.len(),
            batch.warnings.len()
        );
        batch
    }

    async fn resolve_line(&self, line: LocationLine) -> Result<NamedLocation, LineError> {
        match line {
            LocationLine::Literal(location) => Ok(location),
            LocationLine::Named { name, query } => {
                let found = self.retrier.forward(&query).await?;
                let found = found.ok_or(LineError::NotFound(query))?;
                Ok(NamedLocation {
                    name,
                    position: found.position,
                })
            }
            LocationLine::Query(query) => {
                let found = self.retrier.forward(&query).await?;
                let found = found.ok_or(LineError::NotFound(query))?;
                Ok(NamedLocation {
                    name: found.address,
                    position: found.position,
                })
            }
        }
    }
}

fn line_warning(index: usize, line: &str, error: &LineError) -> LineWarning {
    warn!("Skipping location line {}: {} ({})", index + 1, line, error);
    LineWarning {
        line_number: index + 1,
        line: line.to_string(),
        message: error.to_string(),
    }
}
