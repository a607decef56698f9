use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::coordinate::{DecimalCoordinate, NamedLocation};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadQuery {
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsSummary {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoSummary {
    pub session_id: Uuid,
    pub file_name: String,
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps: Option<GpsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub has_modified: bool,
}

/// Edit form. Absent text fields keep the value already in the photo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataEdits {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub software: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditOutcome {
    pub success: bool,
    pub message: String,

    // Set when a new address was resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_found: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<DecimalCoordinate>,
}

/// A location line that could not be plotted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineWarning {
    pub line_number: usize,
    pub line: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationBatchResponse {
    pub locations: Vec<NamedLocation>,
    pub warnings: Vec<LineWarning>,
    pub route_length_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[DecimalCoordinate; 2]>,
}
