//! GPX 1.1 serialization with Garmin trackpoint extensions.

use crate::{RecoverError, Sample};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const CREATOR: &str = "fit-recover";

/// Presentation knobs for the rendered track.
#[derive(Clone, Debug)]
pub struct GpxOptions {
    pub track_name: String,
    pub activity_type: String,
}

impl Default for GpxOptions {
    fn default() -> Self {
        Self {
            track_name: "Bike Ride".to_string(),
            activity_type: "cycling".to_string(),
        }
    }
}

/// Render a sample sequence as a GPX 1.1 document.
///
/// One `<trkpt>` per sample, in order. Heart rate, power, and cadence are
/// emitted only when present and strictly positive; temperature is emitted
/// whenever present, zero and below included. Sensor values are truncated
/// to integers. The sequence must be non-empty: the document's metadata
/// time is the first sample's timestamp.
pub fn render_gpx(samples: &[Sample], options: &GpxOptions) -> Result<String, RecoverError> {
    let first = samples.first().ok_or(RecoverError::NoGpsData)?;

    let mut out = String::with_capacity(256 * samples.len() + 1024);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<gpx version=\"1.1\" creator=\"{CREATOR}\"\n     \
         xmlns=\"http://www.topografix.com/GPX/1/1\"\n     \
         xmlns:gpxtpx=\"http://www.garmin.com/xmlschemas/TrackPointExtension/v1\"\n     \
         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n     \
         xsi:schemaLocation=\"http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd http://www.garmin.com/xmlschemas/TrackPointExtension/v1 http://www.garmin.com/xmlschemas/TrackPointExtensionv1.xsd\">\n"
    ));
    out.push_str("  <metadata>\n");
    out.push_str("    <name>Recovered Ride with Training Data</name>\n");
    out.push_str("    <desc>GPS track recovered from a FIT activity recording</desc>\n");
    out.push_str(&format!(
        "    <time>{}</time>\n",
        first.timestamp.format(TIME_FORMAT)
    ));
    out.push_str("  </metadata>\n");
    out.push_str("  <trk>\n");
    out.push_str(&format!("    <name>{}</name>\n", xml_escape(&options.track_name)));
    out.push_str(&format!("    <type>{}</type>\n", xml_escape(&options.activity_type)));
    out.push_str("    <trkseg>\n");

    for sample in samples {
        render_trkpt(&mut out, sample);
    }

    out.push_str("    </trkseg>\n");
    out.push_str("  </trk>\n");
    out.push_str("</gpx>\n");
    Ok(out)
}

fn render_trkpt(out: &mut String, sample: &Sample) {
    out.push_str(&format!(
        "      <trkpt lat=\"{:.6}\" lon=\"{:.6}\">\n",
        sample.latitude, sample.longitude
    ));
    out.push_str(&format!("        <ele>{:.1}</ele>\n", sample.altitude.unwrap_or(0.0)));
    out.push_str(&format!(
        "        <time>{}</time>\n",
        sample.timestamp.format(TIME_FORMAT)
    ));

    let mut extensions = Vec::new();
    if let Some(hr) = sample.heart_rate.filter(|v| *v > 0.0) {
        extensions.push(format!("          <gpxtpx:hr>{}</gpxtpx:hr>\n", hr as i64));
    }
    if let Some(power) = sample.power.filter(|v| *v > 0.0) {
        extensions.push(format!("          <gpxtpx:power>{}</gpxtpx:power>\n", power as i64));
    }
    if let Some(cadence) = sample.cadence.filter(|v| *v > 0.0) {
        extensions.push(format!("          <gpxtpx:cad>{}</gpxtpx:cad>\n", cadence as i64));
    }
    // Temperature passes through at zero, unlike the other channels.
    if let Some(temperature) = sample.temperature {
        extensions.push(format!(
            "          <gpxtpx:atemp>{}</gpxtpx:atemp>\n",
            temperature as i64
        ));
    }

    if !extensions.is_empty() {
        out.push_str("        <extensions>\n");
        out.push_str("          <gpxtpx:TrackPointExtension>\n");
        for extension in &extensions {
            out.push_str(extension);
        }
        out.push_str("          </gpxtpx:TrackPointExtension>\n");
        out.push_str("        </extensions>\n");
    }

    out.push_str("      </trkpt>\n");
}

fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn sample(lat: f64, lon: f64) -> Sample {
        Sample {
            timestamp: ts(1_700_000_000),
            latitude: lat,
            longitude: lon,
            altitude: None,
            power: None,
            heart_rate: None,
            cadence: None,
            temperature: None,
        }
    }

    #[test]
    fn empty_track_is_an_error() {
        let err = render_gpx(&[], &GpxOptions::default()).unwrap_err();
        assert!(matches!(err, RecoverError::NoGpsData));
    }

    #[test]
    fn zero_heart_rate_is_suppressed() {
        let mut point = sample(52.5, 13.4);
        point.heart_rate = Some(0.0);
        let xml = render_gpx(&[point], &GpxOptions::default()).unwrap();
        assert!(!xml.contains("gpxtpx:hr"));
        assert!(!xml.contains("<extensions>"));
    }

    #[test]
    fn positive_heart_rate_is_rendered_as_integer() {
        let mut point = sample(52.5, 13.4);
        point.heart_rate = Some(150.0);
        let xml = render_gpx(&[point], &GpxOptions::default()).unwrap();
        assert!(xml.contains("<gpxtpx:hr>150</gpxtpx:hr>"));
    }

    #[test]
    fn fractional_sensor_values_truncate() {
        let mut point = sample(52.5, 13.4);
        point.power = Some(213.9);
        point.cadence = Some(88.2);
        let xml = render_gpx(&[point], &GpxOptions::default()).unwrap();
        assert!(xml.contains("<gpxtpx:power>213</gpxtpx:power>"));
        assert!(xml.contains("<gpxtpx:cad>88</gpxtpx:cad>"));
    }

    #[test]
    fn zero_temperature_is_still_rendered() {
        let mut point = sample(52.5, 13.4);
        point.temperature = Some(0.0);
        let xml = render_gpx(&[point], &GpxOptions::default()).unwrap();
        assert!(xml.contains("<gpxtpx:atemp>0</gpxtpx:atemp>"));
    }

    #[test]
    fn negative_temperature_is_rendered() {
        let mut point = sample(52.5, 13.4);
        point.temperature = Some(-7.0);
        let xml = render_gpx(&[point], &GpxOptions::default()).unwrap();
        assert!(xml.contains("<gpxtpx:atemp>-7</gpxtpx:atemp>"));
    }

    #[test]
    fn missing_altitude_defaults_to_zero() {
        let xml = render_gpx(&[sample(52.5, 13.4)], &GpxOptions::default()).unwrap();
        assert!(xml.contains("<ele>0.0</ele>"));
    }

    #[test]
    fn coordinates_use_six_decimal_places() {
        let xml = render_gpx(&[sample(52.5, -13.4)], &GpxOptions::default()).unwrap();
        assert!(xml.contains("<trkpt lat=\"52.500000\" lon=\"-13.400000\">"));
    }

    #[test]
    fn metadata_time_is_first_sample_timestamp() {
        let mut second = sample(52.6, 13.5);
        second.timestamp = ts(1_700_000_060);
        let xml = render_gpx(&[sample(52.5, 13.4), second], &GpxOptions::default()).unwrap();
        let metadata_end = xml.find("</metadata>").unwrap();
        assert!(xml[..metadata_end].contains("<time>2023-11-14T22:13:20Z</time>"));
        assert!(xml.contains("<time>2023-11-14T22:14:20Z</time>"));
    }

    #[test]
    fn track_name_is_escaped() {
        let options = GpxOptions {
            track_name: "Coffee & Hills".to_string(),
            ..GpxOptions::default()
        };
        let xml = render_gpx(&[sample(52.5, 13.4)], &options).unwrap();
        assert!(xml.contains("<name>Coffee &amp; Hills</name>"));
    }

    #[test]
    fn elevation_keeps_one_decimal() {
        let mut point = sample(52.5, 13.4);
        point.altitude = Some(812.46);
        let xml = render_gpx(&[point], &GpxOptions::default()).unwrap();
        assert!(xml.contains("<ele>812.5</ele>"));
    }
}
