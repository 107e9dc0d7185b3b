use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod color_scale;
mod constants;
mod error;
mod feeds;
mod html_template;
mod legend;
mod map;
mod marker;
mod processing;
mod settings;
mod utils;

use color_scale::ColorScale;
use feeds::{http_client, AnyFeed, LatLng};
use map::{BaseLayer, MapView};
use marker::{MarkerStyler, TimeDisplay};
use processing::{build_map, MapRequest};
use settings::Settings;

/// Generate an interactive map of recent earthquakes and tectonic plate boundaries
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file (defaults to quakemap.ini in the app data directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the HTML page
    #[arg(short, long)]
    output: Option<String>,

    /// Earthquake GeoJSON feed, URL or local path
    #[arg(long)]
    earthquakes: Option<String>,

    /// Tectonic plate boundary GeoJSON, URL or local path
    #[arg(long)]
    plates: Option<String>,

    /// Show popup times in UTC instead of local time
    #[arg(long)]
    utc: bool,

    /// Write the effective settings back to the config file before rendering
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if let Some(earthquakes) = &self.earthquakes {
            settings.earthquake_feed = earthquakes.clone();
        }
        if let Some(plates) = &self.plates {
            settings.plates_feed = plates.clone();
        }
        if self.utc {
            settings.utc_times = true;
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn map_request(settings: &Settings) -> Result<MapRequest> {
    let time_display = if settings.utc_times {
        TimeDisplay::Utc
    } else {
        TimeDisplay::Local
    };

    Ok(MapRequest {
        view: MapView {
            center: LatLng {
                lat: settings.center_lat,
                lng: settings.center_lon,
            },
            zoom: settings.zoom,
        },
        base_layers: BaseLayer::mapbox_styles(&settings.mapbox_token),
        styler: MarkerStyler::new(settings.clamp_styling, time_display),
        policy: settings.malformed_records,
        color_scale: ColorScale::magnitude()?,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    info!("🌋 QuakeMap v{} starting...", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Settings::config_path);
    let mut settings = Settings::load_from(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    cli.apply(&mut settings);

    // Saved before the env override so the token from the environment never lands on disk
    if cli.save_config {
        settings.save_to(&config_path)?;
        info!("💾 Settings saved to {}", config_path.display());
    }
    settings.apply_env_overrides();

    if settings.mapbox_token.is_empty() {
        warn!(
            "⚠️  No tile token configured; set {} or mapbox_token in the config",
            constants::TOKEN_ENV_VAR
        );
    }

    let client = http_client(Duration::from_secs(settings.timeout_secs))
        .context("Failed to build HTTP client")?;
    let earthquake_feed = AnyFeed::from_location(&settings.earthquake_feed, &client);
    let plates_feed = AnyFeed::from_location(&settings.plates_feed, &client);

    let built = build_map(&earthquake_feed, &plates_feed, &map_request(&settings)?).await;
    let html = html_template::get_map_html(&built.document)?;

    let output = PathBuf::from(&settings.output);
    utils::ensure_parent_exists(&output).context("Creating output directory")?;
    tokio::fs::write(&output, html)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let describe = |error: Option<&error::QuakeMapError>| match error {
        None => "loaded".to_string(),
        Some(e) => format!("unavailable ({})", e),
    };
    info!(
        "✅ Map written to {} ({} markers; earthquakes {}, plate boundaries {})",
        output.display(),
        built.document.earthquakes.markers.len(),
        describe(built.earthquakes.error()),
        describe(built.tectonic_plates.error())
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_settings() {
        let cli = Cli::parse_from([
            "quakemap",
            "--output",
            "out/map.html",
            "--plates",
            "plates.json",
            "--utc",
        ]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.output, "out/map.html");
        assert_eq!(settings.plates_feed, "plates.json");
        assert_eq!(settings.earthquake_feed, constants::EARTHQUAKE_FEED_URL);
        assert!(settings.utc_times);
        assert!(!cli.save_config);
    }

    #[test]
    fn saved_config_keeps_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quakemap.ini");
        let cli = Cli::parse_from(["quakemap", "--earthquakes", "quakes.geojson", "--save-config"]);
        assert!(cli.save_config);

        let mut settings = Settings::load_from(&path).unwrap();
        cli.apply(&mut settings);
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(&path).unwrap();
        assert_eq!(reloaded.earthquake_feed, "quakes.geojson");
        assert_eq!(reloaded.mapbox_token, "");
    }

    #[test]
    fn request_follows_settings() {
        let settings = Settings {
            zoom: 3,
            mapbox_token: "pk.x".to_string(),
            clamp_styling: true,
            ..Settings::default()
        };
        let request = map_request(&settings).unwrap();
        assert_eq!(request.view.zoom, 3);
        assert_eq!(request.view.center, LatLng { lat: 37.09, lng: -95.71 });
        assert!(request.styler.clamp);
        assert!(request.base_layers[0].url_template.ends_with("pk.x"));
    }
}
