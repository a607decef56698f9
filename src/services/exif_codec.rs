//! EXIF metadata codec for in-memory JPEG images.
//!
//! Decoding goes through `kamadak-exif`, encoding through `little_exif`.
//! Only the fields this service edits are written back: the four textual
//! tags and the latitude/longitude part of the GPS block.

use little_exif::exif_tag::ExifTag;
use little_exif::filetype::FileExtension;
use little_exif::metadata::Metadata;
use little_exif::rational::uR64;
use std::io::Cursor;
use tracing::debug;

use crate::libraries::coordinate_converter::dms_from_decimal;
use crate::models::{
    DecimalCoordinate, Hemisphere, MetadataRecord, MetadataValue, Rational, TextFields,
};

/// Identifier at the start of an EXIF APP1 payload
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Big-endian TIFF header followed by an IFD0 with no entries
const EMPTY_TIFF: &[u8] = &[
    b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08, // header, IFD0 at offset 8
    0x00, 0x00, // entry count
    0x00, 0x00, 0x00, 0x00, // no next IFD
];

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Not a JPEG image")]
    NotJpeg,

    #[error("Invalid JPEG structure")]
    InvalidStructure,

    #[error("Failed to read EXIF metadata: {0}")]
    Read(std::io::Error),

    #[error("Failed to write EXIF metadata: {0}")]
    Write(std::io::Error),
}

/// Check the JPEG SOI marker
pub fn is_jpeg(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xD8
}

/// Read the EXIF block of a JPEG into a metadata record.
///
/// Images without EXIF, or with EXIF that cannot be parsed, give an empty
/// record.
pub fn decode(bytes: &[u8]) -> MetadataRecord {
    let mut record = MetadataRecord::default();

    let mut cursor = Cursor::new(bytes);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("No readable EXIF in image: {}", e);
            return record;
        }
    };

    for field in exif.fields() {
        if field.ifd_num != exif::In::PRIMARY || is_structural(field.tag) {
            continue;
        }

        let value = match &field.value {
            exif::Value::Ascii(chunks) => {
                let parts: Vec<String> = chunks
                    .iter()
                    .map(|chunk| {
                        String::from_utf8_lossy(chunk)
                            .trim_end_matches('\0')
                            .to_string()
                    })
                    .collect();
                MetadataValue::Text(parts.join(" "))
            }
            exif::Value::Rational(values) => MetadataValue::Rationals(
                values
                    .iter()
                    .map(|r| Rational::new(r.num, r.denom))
                    .collect(),
            ),
            _ => MetadataValue::Other(field.display_value().to_string()),
        };

        let name = field.tag.to_string();
        if field.tag.context() == exif::Context::Gps {
            record.gps.insert(name, value);
        } else {
            record.fields.insert(name, value);
        }
    }

    debug!(
        "Decoded {} EXIF fields and {} GPS fields",
        record.fields.len(),
        record.gps.len()
    );
    record
}

fn is_structural(tag: exif::Tag) -> bool {
    tag == exif::Tag::ExifIFDPointer
        || tag == exif::Tag::GPSInfoIFDPointer
        || tag == exif::Tag::InteropIFDPointer
        || tag == exif::Tag::MakerNote
}

/// Write the textual fields, and the GPS position when given, into a copy
/// of `original`.
pub fn encode(
    original: &[u8],
    text: &TextFields,
    position: Option<DecimalCoordinate>,
) -> Result<Vec<u8>, MetadataError> {
    let mut buffer = ensure_exif_segment(original)?;

    let mut metadata =
        Metadata::new_from_vec(&buffer, FileExtension::JPEG).map_err(MetadataError::Read)?;

    metadata.set_tag(ExifTag::Artist(text.artist.clone()));
    metadata.set_tag(ExifTag::ImageDescription(text.description.clone()));
    metadata.set_tag(ExifTag::Copyright(text.copyright.clone()));
    metadata.set_tag(ExifTag::Software(text.software.clone()));

    if let Some(position) = position {
        set_gps_position(&mut metadata, position);
    }

    metadata
        .write_to_vec(&mut buffer, FileExtension::JPEG)
        .map_err(MetadataError::Write)?;

    Ok(buffer)
}

fn set_gps_position(metadata: &mut Metadata, position: DecimalCoordinate) {
    metadata.set_tag(ExifTag::GPSLatitudeRef(
        Hemisphere::latitude(position.latitude).to_string(),
    ));
    metadata.set_tag(ExifTag::GPSLatitude(to_exif_rationals(position.latitude)));
    metadata.set_tag(ExifTag::GPSLongitudeRef(
        Hemisphere::longitude(position.longitude).to_string(),
    ));
    metadata.set_tag(ExifTag::GPSLongitude(to_exif_rationals(
        position.longitude,
    )));
}

fn to_exif_rationals(decimal: f64) -> Vec<uR64> {
    dms_from_decimal(decimal)
        .to_rationals()
        .iter()
        .map(|r| uR64 {
            nominator: r.numerator,
            denominator: r.denominator,
        })
        .collect()
}

/// Return a copy of the JPEG that is guaranteed to carry an EXIF APP1
/// segment. `little_exif` cannot write into images that have none, so an
/// empty one is inserted after SOI, or after a leading JFIF APP0.
pub fn ensure_exif_segment(bytes: &[u8]) -> Result<Vec<u8>, MetadataError> {
    if !is_jpeg(bytes) {
        return Err(MetadataError::NotJpeg);
    }

    let mut pos = 2; // Skip SOI
    let mut insert_at = 2;

    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return Err(MetadataError::InvalidStructure);
        }

        let marker = bytes[pos + 1];
        if !(0xE0..=0xEF).contains(&marker) {
            // Only APPn segments may precede the EXIF block
            break;
        }

        let segment_len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let segment_end = pos + 2 + segment_len;
        if segment_len < 2 || segment_end > bytes.len() {
            return Err(MetadataError::InvalidStructure);
        }

        let payload = &bytes[pos + 4..segment_end];
        if marker == 0xE1 && payload.starts_with(EXIF_HEADER) {
            return Ok(bytes.to_vec());
        }
        if marker == 0xE0 && pos == 2 {
            insert_at = segment_end;
        }

        pos = segment_end;
    }

    let segment_len = (2 + EXIF_HEADER.len() + EMPTY_TIFF.len()) as u16;
    let mut segment = Vec::with_capacity(2 + segment_len as usize);
    segment.extend_from_slice(&[0xFF, 0xE1]);
    segment.extend_from_slice(&segment_len.to_be_bytes());
    segment.extend_from_slice(EXIF_HEADER);
    segment.extend_from_slice(EMPTY_TIFF);

    let mut output = Vec::with_capacity(bytes.len() + segment.len());
    output.extend_from_slice(&bytes[..insert_at]);
    output.extend_from_slice(&segment);
    output.extend_from_slice(&bytes[insert_at..]);
    Ok(output)
}
