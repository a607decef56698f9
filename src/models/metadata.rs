use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::coordinate::Rational;

/// Value of a single EXIF field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Rationals(Vec<Rational>),
    Other(String),
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_rationals(&self) -> Option<&[Rational]> {
        match self {
            MetadataValue::Rationals(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(text) | MetadataValue::Other(text) => f.write_str(text),
            MetadataValue::Rationals(values) => {
                let parts: Vec<String> = values.iter().map(|r| r.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// EXIF fields of one image, keyed by tag name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub fields: BTreeMap<String, MetadataValue>,
    pub gps: BTreeMap<String, MetadataValue>,
}

impl MetadataRecord {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.gps.is_empty()
    }

    /// Textual value of a primary field, empty when absent
    pub fn text(&self, tag: &str) -> String {
        self.fields
            .get(tag)
            .map(|value| value.to_string())
            .unwrap_or_default()
    }

    /// Field listing without the GPS block, as shown to the user
    pub fn listing(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|(tag, value)| (tag.clone(), value.to_string()))
            .collect()
    }
}

/// Textual fields written back on save
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFields {
    pub artist: String,
    pub description: String,
    pub copyright: String,
    pub software: String,
}

impl TextFields {
    pub fn from_record(record: &MetadataRecord) -> Self {
        Self {
            artist: record.text("Artist"),
            description: record.text("ImageDescription"),
            copyright: record.text("Copyright"),
            software: record.text("Software"),
        }
    }
}
