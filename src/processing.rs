use rayon::prelude::*;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::color_scale::ColorScale;
use crate::error::{QuakeMapError, Result};
use crate::feeds::{parse_earthquakes, FeatureCollection, FeedSource};
use crate::legend::Legend;
use crate::map::{compose_map, BaseLayer, EarthquakeLayer, MapDocument, MapView, PlateLayer};
use crate::marker::{EarthquakeRecord, MarkerSpec, MarkerStyler, RecordCheck};
use crate::settings::MalformedPolicy;

/// Whether a feed-backed layer made it onto the map.
///
/// A failed layer is rendered empty; the error is only kept here and logged.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOutcome<T> {
    Loaded(T),
    Failed(QuakeMapError),
}

impl<T> LayerOutcome<T> {
    pub fn error(&self) -> Option<&QuakeMapError> {
        match self {
            LayerOutcome::Loaded(_) => None,
            LayerOutcome::Failed(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub total_features: usize,
    pub rendered: usize,
    pub degenerate: usize,
    pub skipped: usize,
}

/// Turns every feature into a marker, applying the malformed-record policy.
/// Marker order follows feature order.
pub fn process_earthquakes(
    collection: &FeatureCollection,
    styler: &MarkerStyler,
    policy: MalformedPolicy,
) -> (Vec<MarkerSpec>, ProcessingStats) {
    let mut stats = ProcessingStats {
        total_features: collection.features.len(),
        ..Default::default()
    };

    let checks: Vec<RecordCheck> = collection
        .features
        .par_iter()
        .enumerate()
        .map(|(index, feature)| EarthquakeRecord::from_feature(index, feature))
        .collect();

    let mut records = Vec::with_capacity(checks.len());
    for check in checks {
        match check {
            RecordCheck::Valid(record) => records.push(record),
            RecordCheck::Degenerate(record, problem) => match policy {
                MalformedPolicy::RenderDegenerate => {
                    debug!("Rendering degenerate marker: {}", problem);
                    stats.degenerate += 1;
                    records.push(record);
                }
                MalformedPolicy::Skip => {
                    warn!("Skipping {}", problem);
                    stats.skipped += 1;
                }
            },
            RecordCheck::Unplaceable(problem) => {
                warn!("Skipping {}", problem);
                stats.skipped += 1;
            }
        }
    }

    let markers: Vec<MarkerSpec> = records.par_iter().map(|r| styler.style(r)).collect();
    stats.rendered = markers.len();
    (markers, stats)
}

/// Inputs for one render pass.
#[derive(Debug, Clone)]
pub struct MapRequest {
    pub view: MapView,
    pub base_layers: Vec<BaseLayer>,
    pub styler: MarkerStyler,
    pub policy: MalformedPolicy,
    pub color_scale: ColorScale,
}

#[derive(Debug, Clone)]
pub struct BuiltMap {
    pub document: MapDocument,
    pub earthquakes: LayerOutcome<ProcessingStats>,
    pub tectonic_plates: LayerOutcome<()>,
}

async fn fetch_layer<F: FeedSource>(feed: &F) -> Result<Value> {
    let start = Instant::now();
    let value = feed.fetch().await?;
    info!("📥 Loaded {} in {:.2?}", feed.name(), start.elapsed());
    Ok(value)
}

/// Fetches both feeds concurrently and composes the map. Either feed may
/// fail; its layer is then left empty and the rest of the map is unaffected.
pub async fn build_map<Q, P>(earthquake_feed: &Q, plates_feed: &P, request: &MapRequest) -> BuiltMap
where
    Q: FeedSource,
    P: FeedSource,
{
    let (quake_result, plate_result) =
        tokio::join!(fetch_layer(earthquake_feed), fetch_layer(plates_feed));

    let (earthquakes, earthquake_outcome) = match quake_result
        .and_then(|raw| parse_earthquakes(earthquake_feed.name(), raw))
    {
        Ok(collection) => {
            let start = Instant::now();
            let (markers, stats) = process_earthquakes(&collection, &request.styler, request.policy);
            info!(
                "🗺️  Styled {} of {} earthquakes in {:.2?} ({} degenerate, {} skipped)",
                stats.rendered,
                stats.total_features,
                start.elapsed(),
                stats.degenerate,
                stats.skipped
            );
            (EarthquakeLayer::new(markers), LayerOutcome::Loaded(stats))
        }
        Err(e) => {
            warn!("⚠️  Earthquake layer left empty: {}", e);
            (EarthquakeLayer::empty(), LayerOutcome::Failed(e))
        }
    };

    let (plates, plate_outcome) = match plate_result {
        Ok(raw) => (PlateLayer::new(Some(raw)), LayerOutcome::Loaded(())),
        Err(e) => {
            warn!("⚠️  Tectonic plate layer left empty: {}", e);
            (PlateLayer::new(None), LayerOutcome::Failed(e))
        }
    };

    let legend = Legend::magnitude(&request.color_scale);
    let document = compose_map(
        request.view,
        request.base_layers.clone(),
        earthquakes,
        plates,
        &legend,
    );

    BuiltMap {
        document,
        earthquakes: earthquake_outcome,
        tectonic_plates: plate_outcome,
    }
}
