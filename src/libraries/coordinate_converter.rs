use crate::models::{DecimalCoordinate, DmsCoordinate, Hemisphere, MetadataRecord, Rational};

/// Convert an EXIF DMS triple to signed decimal degrees.
///
/// No bounds validation is applied; the result is negated for the southern
/// and western hemispheres.
pub fn decimal_from_dms(dms: &DmsCoordinate, hemisphere: Hemisphere) -> f64 {
    let decimal =
        dms.degrees.to_f64() + dms.minutes.to_f64() / 60.0 + dms.seconds.to_f64() / 3600.0;

    if hemisphere.is_negative() {
        -decimal
    } else {
        decimal
    }
}

/// Convert decimal degrees to an unsigned EXIF DMS triple.
///
/// Seconds are truncated to 1/100 of an arc-second. The hemisphere must be
/// taken from the sign of `decimal` by the caller.
pub fn dms_from_decimal(decimal: f64) -> DmsCoordinate {
    let total_seconds = decimal.abs() * 3600.0;
    let minutes_total = total_seconds.div_euclid(60.0);
    let seconds = total_seconds.rem_euclid(60.0);
    let degrees = minutes_total.div_euclid(60.0);
    let minutes = minutes_total.rem_euclid(60.0);

    DmsCoordinate {
        degrees: Rational::new(degrees as u32, 1),
        minutes: Rational::new(minutes as u32, 1),
        seconds: Rational::new((seconds * 100.0).floor() as u32, 100),
    }
}

/// Read the photo position out of the GPS block of a metadata record.
///
/// Returns `None` when any of the four latitude/longitude fields is missing
/// or malformed.
pub fn gps_coordinates(record: &MetadataRecord) -> Option<DecimalCoordinate> {
    let latitude = read_axis(record, "GPSLatitude", "GPSLatitudeRef")?;
    let longitude = read_axis(record, "GPSLongitude", "GPSLongitudeRef")?;
    Some(DecimalCoordinate::new(latitude, longitude))
}

fn read_axis(record: &MetadataRecord, value_tag: &str, ref_tag: &str) -> Option<f64> {
    let dms = DmsCoordinate::from_rationals(record.gps.get(value_tag)?.as_rationals()?)?;
    let hemisphere = Hemisphere::from_ref(record.gps.get(ref_tag)?.as_text()?)?;
    Some(decimal_from_dms(&dms, hemisphere))
}
