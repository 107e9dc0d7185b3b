use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use serde::Serialize;

use crate::color_scale::Rgb;
use crate::constants::{
    CHANNEL_BASE, CHANNEL_STEP_PER_MAGNITUDE, MARKER_FILL_OPACITY, MARKER_STROKE_COLOR,
    MARKER_STROKE_OPACITY, MARKER_STROKE_WEIGHT, RADIUS_PER_MAGNITUDE,
};
use crate::error::QuakeMapError;
use crate::feeds::{Feature, LatLng};

/// One earthquake as read from the feed
#[derive(Debug, Clone, PartialEq)]
pub struct EarthquakeRecord {
    pub position: LatLng,
    pub place: String,
    /// Epoch milliseconds
    pub time: Option<i64>,
    /// NaN when the feed had no usable magnitude
    pub magnitude: f64,
}

/// Result of reading a feature into a record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordCheck {
    Valid(EarthquakeRecord),
    /// Renderable, but some property was missing and has been filled with a
    /// degenerate value
    Degenerate(EarthquakeRecord, QuakeMapError),
    /// No point geometry, so there is nowhere to put a marker
    Unplaceable(QuakeMapError),
}

impl EarthquakeRecord {
    pub fn from_feature(index: usize, feature: &Feature) -> RecordCheck {
        let Some(position) = feature.position() else {
            return RecordCheck::Unplaceable(QuakeMapError::malformed(index, "no point geometry"));
        };

        let record = EarthquakeRecord {
            position,
            place: feature.place().unwrap_or_default().to_string(),
            time: feature.time(),
            magnitude: feature.magnitude().unwrap_or(f64::NAN),
        };

        if feature.properties().is_none() {
            RecordCheck::Degenerate(
                record,
                QuakeMapError::malformed(index, "properties is not an object"),
            )
        } else if record.magnitude.is_nan() {
            RecordCheck::Degenerate(record, QuakeMapError::malformed(index, "missing magnitude"))
        } else if record.time.is_none() {
            RecordCheck::Degenerate(record, QuakeMapError::malformed(index, "missing time"))
        } else {
            RecordCheck::Valid(record)
        }
    }
}

/// Everything Leaflet needs to draw one circle marker with its popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSpec {
    pub position: LatLng,
    pub radius: f64,
    pub fill_color: Rgb,
    pub stroke_color: String,
    pub stroke_weight: u32,
    pub stroke_opacity: f64,
    pub fill_opacity: f64,
    pub popup_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeDisplay {
    #[default]
    Local,
    Utc,
}

/// Turns earthquake records into marker specs.
#[derive(Debug, Clone, Default)]
pub struct MarkerStyler {
    /// Keep radius non-negative and color channels inside 0..=255
    pub clamp: bool,
    pub time_display: TimeDisplay,
}

impl MarkerStyler {
    pub fn new(clamp: bool, time_display: TimeDisplay) -> Self {
        Self { clamp, time_display }
    }

    pub fn style(&self, record: &EarthquakeRecord) -> MarkerSpec {
        let mut radius = marker_radius(record.magnitude);
        let mut fill_color = marker_fill(record.magnitude);
        if self.clamp {
            radius = radius.max(0.0);
            fill_color = fill_color.clamped();
        }

        MarkerSpec {
            position: record.position,
            radius,
            fill_color,
            stroke_color: MARKER_STROKE_COLOR.to_string(),
            stroke_weight: MARKER_STROKE_WEIGHT,
            stroke_opacity: MARKER_STROKE_OPACITY,
            fill_opacity: MARKER_FILL_OPACITY,
            popup_text: self.popup_text(record),
        }
    }

    pub fn popup_text(&self, record: &EarthquakeRecord) -> String {
        let timestamp = match self.time_display {
            TimeDisplay::Local => format_timestamp(record.time, &Local),
            TimeDisplay::Utc => format_timestamp(record.time, &Utc),
        };
        format!(
            "<h3>{}</h3><hr><p>{}</p><hr><p>Magnitude: {}</p>",
            escape_html(&record.place),
            timestamp,
            // -0.0 == 0.0, so this also drops the sign of negative zero
            if record.magnitude == 0.0 { 0.0 } else { record.magnitude }
        )
    }
}

pub fn marker_radius(magnitude: f64) -> f64 {
    RADIUS_PER_MAGNITUDE * magnitude
}

/// Red stays at full intensity; green and blue fade as the magnitude grows.
pub fn marker_fill(magnitude: f64) -> Rgb {
    // `as` saturates, and maps NaN to 0
    let channel = (CHANNEL_BASE - CHANNEL_STEP_PER_MAGNITUDE * magnitude).floor() as i32;
    Rgb::new(255, channel, channel)
}

/// Largest distance from the epoch a browser `Date` can represent
const MAX_TIMESTAMP_MILLIS: i64 = 8_640_000_000_000_000;

/// Formats epoch millis the way a browser prints a `Date`, e.g.
/// `Tue Nov 14 2023 22:13:20 GMT+0000`.
pub fn format_timestamp<Tz: TimeZone>(millis: Option<i64>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    millis
        .filter(|ms| (-MAX_TIMESTAMP_MILLIS..=MAX_TIMESTAMP_MILLIS).contains(ms))
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|utc| {
            let local = utc.with_timezone(tz);
            // chrono prefixes years past 9999 with '+'; browsers don't
            let year = match local.year() {
                y if y < 0 => format!("-{:04}", -y),
                y => format!("{:04}", y),
            };
            format!(
                "{} {} {}",
                local.format("%a %b %d"),
                year,
                local.format("%H:%M:%S GMT%z")
            )
        })
        .unwrap_or_else(|| "Invalid Date".to_string())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
