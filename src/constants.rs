// Feed locations
pub const EARTHQUAKE_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/2.5_month.geojson";
pub const TECTONIC_PLATES_FEED_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

// Initial view
pub const DEFAULT_CENTER: (f64, f64) = (37.09, -95.71);
pub const DEFAULT_ZOOM: u8 = 5;

pub const DEFAULT_OUTPUT: &str = "quakemap.html";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Env var that overrides the configured tile token
pub const TOKEN_ENV_VAR: &str = "MAPBOX_ACCESS_TOKEN";

// Tile URL templates. `{token}` is filled in at startup, the rest is left for Leaflet.
pub const STREET_TILES: &str =
    "https://api.mapbox.com/styles/v1/mapbox/outdoors-v10/tiles/256/{z}/{x}/{y}?access_token={token}";
pub const SATELLITE_TILES: &str =
    "https://api.mapbox.com/styles/v1/mapbox/satellite-v9/tiles/256/{z}/{x}/{y}?access_token={token}";
pub const DARK_TILES: &str =
    "https://api.mapbox.com/styles/v1/mapbox/dark-v9/tiles/256/{z}/{x}/{y}?access_token={token}";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.mapbox.com/\">Mapbox</a> &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>";

// Marker styling
pub const RADIUS_PER_MAGNITUDE: f64 = 4.0;
pub const CHANNEL_BASE: f64 = 255.0;
pub const CHANNEL_STEP_PER_MAGNITUDE: f64 = 80.0;
pub const MARKER_STROKE_COLOR: &str = "black";
pub const MARKER_STROKE_WEIGHT: u32 = 1;
pub const MARKER_STROKE_OPACITY: f64 = 1.0;
pub const MARKER_FILL_OPACITY: f64 = 0.6;

// Plate boundary styling
pub const PLATE_STROKE_COLOR: &str = "blue";
pub const PLATE_STROKE_WEIGHT: u32 = 2;

// Legend buckets (lower bounds); the last one is open-ended
pub const LEGEND_BUCKETS: &[u8] = &[2, 3, 4, 5, 6, 7, 8];
pub const LEGEND_POSITION: &str = "bottomright";
