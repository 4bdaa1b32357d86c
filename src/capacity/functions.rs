//! The functions
//!
use log::*;

const KIB: f64 = 1024.0;

/// The units ordered longest first, so the `B` in `KB` or `MB` is never matched on its own.
pub const CAPACITY_UNITS: [(&str, f64); 6] = [
    ("PB", KIB * KIB * KIB * KIB * KIB),
    ("TB", KIB * KIB * KIB * KIB),
    ("GB", KIB * KIB * KIB),
    ("MB", KIB * KIB),
    ("KB", KIB),
    ("B", 1.0),
];

/// Convert a size such as `14.2GB` into a number of bytes.
///
/// A value without a unit is taken as bytes.
/// Anything that cannot be parsed, including an empty string or a negative number, returns 0.
pub fn parse_size(size: &str) -> f64
{
    let size = size.trim().to_uppercase();
    if size.is_empty() {
        return 0.0;
    }
    let (magnitude, multiplier) = CAPACITY_UNITS
        .iter()
        .find_map(|(unit, multiplier)| size.strip_suffix(unit).map(|magnitude| (magnitude, *multiplier)))
        .unwrap_or((size.as_str(), 1.0));

    match magnitude.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value * multiplier,
        Ok(value) => {
            debug!("size out of range: {}, using 0", value);
            0.0
        },
        Err(e) => {
            debug!("unable to parse size: '{}', error: {}, using 0", size, e);
            0.0
        },
    }
}

pub fn bytes_to_megabytes(bytes: f64) -> f64
{
    bytes / (KIB * KIB)
}

/// Round to 2 decimal places.
pub fn round_hundredths(value: f64) -> f64
{
    (value * 100.0).round() / 100.0
}
