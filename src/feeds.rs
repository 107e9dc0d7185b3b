//! GeoJSON feeds and the sources they are loaded from.
//!
//! Earthquake features are kept loosely typed (each one is read from a raw
//! JSON value) so that one bad record never prevents the rest of the
//! collection from decoding. Tectonic plate boundaries are passed through to Leaflet as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::error::{QuakeMapError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// One feature, taken from whatever JSON value sits in the `features` array.
/// Shape problems surface later as missing properties, never as a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Value")]
pub struct Feature {
    pub geometry: Option<Value>,
    pub properties: Option<Value>,
}

impl From<Value> for Feature {
    fn from(value: Value) -> Self {
        let field = |key: &str| value.get(key).filter(|v| !v.is_null()).cloned();
        Self {
            geometry: field("geometry"),
            properties: field("properties"),
        }
    }
}

impl Feature {
    /// The properties mapping, if the feature has one that is an object
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.properties.as_ref()?.as_object()
    }

    fn property(&self, key: &str) -> Option<&Value> {
        self.properties()?.get(key).filter(|v| !v.is_null())
    }

    pub fn place(&self) -> Option<&str> {
        self.property("place")?.as_str()
    }

    /// Event time in epoch milliseconds
    pub fn time(&self) -> Option<i64> {
        let value = self.property("time")?;
        value.as_i64().or_else(|| value.as_f64().map(|t| t as i64))
    }

    pub fn magnitude(&self) -> Option<f64> {
        self.property("mag")?.as_f64()
    }

    /// Position of a point geometry. GeoJSON stores `[lon, lat, depth?]`.
    pub fn position(&self) -> Option<LatLng> {
        let geometry = self.geometry.as_ref()?;
        if geometry.get("type")?.as_str()? != "Point" {
            return None;
        }
        let coords = geometry.get("coordinates")?.as_array()?;
        let lng = coords.first()?.as_f64()?;
        let lat = coords.get(1)?.as_f64()?;
        Some(LatLng { lat, lng })
    }
}

pub fn parse_earthquakes(source_name: &str, raw: Value) -> Result<FeatureCollection> {
    serde_json::from_value(raw).map_err(|e| QuakeMapError::fetch_failed(source_name, e))
}

/// Something a GeoJSON document can be loaded from.
pub trait FeedSource {
    fn name(&self) -> &str;

    fn fetch(&self) -> impl Future<Output = Result<Value>> + Send;
}

/// Feed served over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFeed {
    url: String,
    client: reqwest::Client,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

impl FeedSource for HttpFeed {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Value> {
        debug!("GET {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| QuakeMapError::fetch_failed(&self.url, e))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| QuakeMapError::fetch_failed(&self.url, e))
    }
}

/// Feed read from a local GeoJSON file
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
    name: String,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl FeedSource for FileFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Value> {
        debug!("Reading {}", self.name);
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| QuakeMapError::fetch_failed(&self.name, e))?;
        serde_json::from_slice(&bytes).map_err(|e| QuakeMapError::fetch_failed(&self.name, e))
    }
}

/// Either kind of feed, picked from a location string.
#[derive(Debug, Clone)]
pub enum AnyFeed {
    Http(HttpFeed),
    File(FileFeed),
}

impl AnyFeed {
    pub fn from_location(location: &str, client: &reqwest::Client) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            AnyFeed::Http(HttpFeed::new(location, client.clone()))
        } else {
            AnyFeed::File(FileFeed::new(location))
        }
    }
}

impl FeedSource for AnyFeed {
    fn name(&self) -> &str {
        match self {
            AnyFeed::Http(feed) => feed.name(),
            AnyFeed::File(feed) => feed.name(),
        }
    }

    async fn fetch(&self) -> Result<Value> {
        match self {
            AnyFeed::Http(feed) => feed.fetch().await,
            AnyFeed::File(feed) => feed.fetch().await,
        }
    }
}

pub fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("quakemap/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn quake(mag: Value, geometry: Value) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "properties": { "place": "10km N of Testville", "time": 1700000000000i64, "mag": mag },
            "geometry": geometry,
        }))
        .unwrap()
    }

    #[test]
    fn reads_usgs_properties() {
        let feature = quake(json!(2.5), json!({ "type": "Point", "coordinates": [-117.5, 35.7, 8.2] }));
        assert_eq!(feature.place(), Some("10km N of Testville"));
        assert_eq!(feature.time(), Some(1_700_000_000_000));
        assert_eq!(feature.magnitude(), Some(2.5));
        assert_eq!(feature.position(), Some(LatLng { lat: 35.7, lng: -117.5 }));
    }

    #[test]
    fn null_or_mistyped_values_read_as_missing() {
        let feature = quake(Value::Null, json!({ "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] }));
        assert_eq!(feature.magnitude(), None);
        assert_eq!(feature.position(), None);

        let feature = quake(json!("big"), Value::Null);
        assert_eq!(feature.magnitude(), None);
        assert_eq!(feature.position(), None);
    }

    #[test]
    fn odd_feature_shapes_still_decode() {
        let collection = parse_earthquakes(
            "test",
            json!({ "features": [
                { "properties": "oops", "geometry": { "type": "Point", "coordinates": [1.0, 2.0] } },
                42,
                { "properties": { "mag": 1.5 } }
            ]}),
        )
        .unwrap();
        assert_eq!(collection.features.len(), 3);

        let first = &collection.features[0];
        assert!(first.properties().is_none());
        assert_eq!(first.magnitude(), None);
        assert_eq!(first.position(), Some(LatLng { lat: 2.0, lng: 1.0 }));

        assert!(collection.features[1].properties.is_none());
        assert_eq!(collection.features[2].magnitude(), Some(1.5));
    }

    #[test]
    fn collection_without_features_is_empty() {
        let collection = parse_earthquakes("test", json!({ "type": "FeatureCollection" })).unwrap();
        assert!(collection.features.is_empty());

        let err = parse_earthquakes("test", json!({ "features": 3 })).unwrap_err();
        assert!(matches!(err, QuakeMapError::FetchFailed { .. }));
    }

    #[test]
    fn picks_source_kind_from_location() {
        let client = reqwest::Client::new();
        assert!(matches!(
            AnyFeed::from_location("https://example.com/a.geojson", &client),
            AnyFeed::Http(_)
        ));
        assert!(matches!(AnyFeed::from_location("data/a.geojson", &client), AnyFeed::File(_)));
    }

    #[tokio::test]
    async fn file_feed_loads_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"type":"FeatureCollection","features":[]}}"#).unwrap();

        let feed = FileFeed::new(file.path());
        let value = feed.fetch().await.unwrap();
        assert_eq!(value["type"], "FeatureCollection");
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_failure() {
        let feed = FileFeed::new("/nonexistent/quakemap/plates.json");
        let err = feed.fetch().await.unwrap_err();
        assert!(matches!(err, QuakeMapError::FetchFailed { .. }));
    }
}
