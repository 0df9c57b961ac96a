//! Core FIT-to-GPX recovery library implemented in Rust.
//!
//! Takes the record messages of a decoded FIT activity file, tabulates the
//! GPS-bearing ones into [`Sample`]s, and renders them as a GPX 1.1 track
//! with Garmin trackpoint extensions for the sensor channels that upstream
//! services fail to carry over.

use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod gpx;
pub mod record;

pub use gpx::{render_gpx, GpxOptions};
pub use record::{decode_records, FieldValue, RecordFields};

#[derive(Error, Debug)]
pub enum RecoverError {
    #[error("failed to parse FIT file: {0}")]
    FitParse(String),
    #[error("no GPS-bearing records in input")]
    NoGpsData,
}

/// One GPS/sensor observation from a FIT record message.
///
/// Latitude and longitude are decimal degrees; the sensor channels stay
/// optional per sample and are interpreted at serialization time.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub power: Option<f64>,
    pub heart_rate: Option<f64>,
    pub cadence: Option<f64>,
    pub temperature: Option<f64>,
}

/// Convert a Garmin semicircle coordinate to decimal degrees.
///
/// Semicircles are a fixed-point encoding where +/-2^31 maps to +/-180
/// degrees. Absent inputs propagate as `Option` at the call site and never
/// reach this conversion.
pub fn semicircle_to_degrees(semicircles: f64) -> f64 {
    semicircles * (180.0 / 2_147_483_648.0)
}

/// Tabulate decoded record messages into an ordered sample sequence.
///
/// A record is retained only when `position_lat`, `position_long`, and
/// `timestamp` are all present; every other channel stays optional. Input
/// order is preserved.
pub fn extract_samples<R: RecordFields>(records: &[R]) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(records.len());
    for record in records {
        let lat = record.field("position_lat").and_then(FieldValue::as_number);
        let lon = record.field("position_long").and_then(FieldValue::as_number);
        let timestamp = record.field("timestamp").and_then(FieldValue::as_timestamp);
        let (Some(lat), Some(lon), Some(timestamp)) = (lat, lon, timestamp) else {
            continue;
        };
        samples.push(Sample {
            timestamp,
            latitude: semicircle_to_degrees(lat),
            longitude: semicircle_to_degrees(lon),
            altitude: record.field("altitude").and_then(FieldValue::as_number),
            power: record.field("power").and_then(FieldValue::as_number),
            heart_rate: record.field("heart_rate").and_then(FieldValue::as_number),
            cadence: record.field("cadence").and_then(FieldValue::as_number),
            temperature: record.field("temperature").and_then(FieldValue::as_number),
        });
    }
    samples
}

/// Fraction of samples carrying power and heart-rate data, as percentages.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coverage {
    pub power_pct: f64,
    pub heart_rate_pct: f64,
}

/// Compute sensor coverage over a sample sequence.
///
/// Presence is what counts; zero or negative readings are still covered.
/// Callers must pass a non-empty slice.
pub fn coverage(samples: &[Sample]) -> Coverage {
    let total = samples.len() as f64;
    let pct = |count: usize| count as f64 * 100.0 / total;
    Coverage {
        power_pct: pct(samples.iter().filter(|s| s.power.is_some()).count()),
        heart_rate_pct: pct(samples.iter().filter(|s| s.heart_rate.is_some()).count()),
    }
}
