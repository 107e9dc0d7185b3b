//! Composition of the map document handed to the page template.

use serde::Serialize;
use serde_json::Value;

use crate::constants::{
    DARK_TILES, PLATE_STROKE_COLOR, PLATE_STROKE_WEIGHT, SATELLITE_TILES, STREET_TILES,
    TILE_ATTRIBUTION,
};
use crate::feeds::LatLng;
use crate::legend::Legend;
use crate::marker::MarkerSpec;

/// A tile background. Only one is visible at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseLayer {
    pub name: String,
    pub url_template: String,
    pub attribution: String,
}

impl BaseLayer {
    pub fn new(name: &str, template: &str, token: &str) -> Self {
        Self {
            name: name.to_string(),
            url_template: template.replace("{token}", token),
            attribution: TILE_ATTRIBUTION.to_string(),
        }
    }

    /// Street, satellite and dark styles; the first one is shown on load.
    pub fn mapbox_styles(token: &str) -> Vec<BaseLayer> {
        vec![
            BaseLayer::new("Street Map", STREET_TILES, token),
            BaseLayer::new("Satellite", SATELLITE_TILES, token),
            BaseLayer::new("Dark Map", DARK_TILES, token),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarthquakeLayer {
    pub name: String,
    pub markers: Vec<MarkerSpec>,
}

impl EarthquakeLayer {
    pub fn new(markers: Vec<MarkerSpec>) -> Self {
        Self {
            name: "Earthquakes".to_string(),
            markers,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateLayer {
    pub name: String,
    pub style: LineStyle,
    /// Boundary GeoJSON, passed through untouched. `None` leaves the layer empty.
    pub data: Option<Value>,
}

impl PlateLayer {
    pub fn new(data: Option<Value>) -> Self {
        Self {
            name: "Tectonic Plates".to_string(),
            style: LineStyle {
                color: PLATE_STROKE_COLOR.to_string(),
                weight: PLATE_STROKE_WEIGHT,
            },
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendControl {
    pub position: String,
    pub html: String,
}

/// Everything the page script needs to build the Leaflet map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub view: MapView,
    pub base_layers: Vec<BaseLayer>,
    pub earthquakes: EarthquakeLayer,
    pub tectonic_plates: PlateLayer,
    pub legend: LegendControl,
    pub collapsed_layer_control: bool,
}

pub fn compose_map(
    view: MapView,
    base_layers: Vec<BaseLayer>,
    earthquakes: EarthquakeLayer,
    tectonic_plates: PlateLayer,
    legend: &Legend,
) -> MapDocument {
    MapDocument {
        view,
        base_layers,
        earthquakes,
        tectonic_plates,
        legend: LegendControl {
            position: legend.position.clone(),
            html: legend.to_html(),
        },
        collapsed_layer_control: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_scale::ColorScale;
    use serde_json::json;

    fn view() -> MapView {
        MapView {
            center: LatLng { lat: 37.09, lng: -95.71 },
            zoom: 5,
        }
    }

    #[test]
    fn token_is_injected_into_tile_urls() {
        let layers = BaseLayer::mapbox_styles("pk.test");
        let names: Vec<&str> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Street Map", "Satellite", "Dark Map"]);
        for layer in &layers {
            assert!(layer.url_template.ends_with("access_token=pk.test"));
            assert!(layer.url_template.contains("{z}/{x}/{y}"));
            assert!(!layer.url_template.contains("{token}"));
        }
    }

    #[test]
    fn empty_overlays_still_compose() {
        let doc = compose_map(
            view(),
            BaseLayer::mapbox_styles(""),
            EarthquakeLayer::empty(),
            PlateLayer::new(None),
            &Legend::magnitude(&ColorScale::magnitude().unwrap()),
        );
        assert_eq!(doc.base_layers.len(), 3);
        assert!(doc.earthquakes.markers.is_empty());
        assert!(doc.tectonic_plates.data.is_none());
        assert!(doc.legend.html.starts_with("Magnitude<br><hr>"));
    }

    #[test]
    fn serializes_for_the_page_script() {
        let plates = json!({ "type": "FeatureCollection", "features": [] });
        let doc = compose_map(
            view(),
            BaseLayer::mapbox_styles("t"),
            EarthquakeLayer::empty(),
            PlateLayer::new(Some(plates.clone())),
            &Legend::magnitude(&ColorScale::magnitude().unwrap()),
        );
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["view"]["center"]["lat"], 37.09);
        assert_eq!(value["view"]["zoom"], 5);
        assert_eq!(value["baseLayers"][0]["name"], "Street Map");
        assert_eq!(value["earthquakes"]["name"], "Earthquakes");
        assert_eq!(value["tectonicPlates"]["style"]["color"], "blue");
        assert_eq!(value["tectonicPlates"]["style"]["weight"], 2);
        assert_eq!(value["tectonicPlates"]["data"], plates);
        assert_eq!(value["legend"]["position"], "bottomright");
        assert_eq!(value["collapsedLayerControl"], false);
    }
}
