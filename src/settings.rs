use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_CENTER, DEFAULT_OUTPUT, DEFAULT_TIMEOUT_SECS, DEFAULT_ZOOM, EARTHQUAKE_FEED_URL,
    TECTONIC_PLATES_FEED_URL, TOKEN_ENV_VAR,
};

/// What to do with records that are missing a magnitude or time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    #[default]
    RenderDegenerate,
    Skip,
}

impl FromStr for MalformedPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "render_degenerate" => Ok(Self::RenderDegenerate),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown malformed_records policy: {}", other)),
        }
    }
}

impl MalformedPolicy {
    fn as_str(&self) -> &'static str {
        match self {
            Self::RenderDegenerate => "render_degenerate",
            Self::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub earthquake_feed: String,
    pub plates_feed: String,
    pub output: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub mapbox_token: String,
    pub timeout_secs: u64,
    pub clamp_styling: bool,
    pub utc_times: bool,
    pub malformed_records: MalformedPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            earthquake_feed: EARTHQUAKE_FEED_URL.to_string(),
            plates_feed: TECTONIC_PLATES_FEED_URL.to_string(),
            output: DEFAULT_OUTPUT.to_string(),
            center_lat: DEFAULT_CENTER.0,
            center_lon: DEFAULT_CENTER.1,
            zoom: DEFAULT_ZOOM,
            mapbox_token: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            clamp_styling: false,
            utc_times: false,
            malformed_records: MalformedPolicy::default(),
        }
    }
}

fn parse_into<T: FromStr>(map: &HashMap<String, String>, key: &str, target: &mut T) {
    if let Some(value) = map.get(key) {
        match value.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!("⚠️  Ignoring invalid value for {}: {}", key, value),
        }
    }
}

impl Settings {
    /// Loads a `quakemap.ini`, falling back to defaults when it does not exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut settings = Settings::default();
        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(settings);
        }

        let file = File::open(config_path).context("Failed to open config file")?;
        let reader = BufReader::new(file);
        let mut config_map = HashMap::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line from config")?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config_map.insert(
                    key.trim().to_string(),
                    value.trim().trim_matches('"').to_string(),
                );
            }
        }

        parse_into(&config_map, "earthquake_feed", &mut settings.earthquake_feed);
        parse_into(&config_map, "plates_feed", &mut settings.plates_feed);
        parse_into(&config_map, "output", &mut settings.output);
        parse_into(&config_map, "center_lat", &mut settings.center_lat);
        parse_into(&config_map, "center_lon", &mut settings.center_lon);
        parse_into(&config_map, "zoom", &mut settings.zoom);
        parse_into(&config_map, "mapbox_token", &mut settings.mapbox_token);
        parse_into(&config_map, "timeout_secs", &mut settings.timeout_secs);
        parse_into(&config_map, "clamp_styling", &mut settings.clamp_styling);
        parse_into(&config_map, "utc_times", &mut settings.utc_times);
        parse_into(&config_map, "malformed_records", &mut settings.malformed_records);

        Ok(settings)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Creating config directory")?;
        }

        let mut content = String::new();
        content.push_str("# QuakeMap Configuration File\n");
        content.push_str(&format!("earthquake_feed = \"{}\"\n", self.earthquake_feed));
        content.push_str(&format!("plates_feed = \"{}\"\n", self.plates_feed));
        content.push_str(&format!("output = \"{}\"\n", self.output));
        content.push_str(&format!("center_lat = {}\n", self.center_lat));
        content.push_str(&format!("center_lon = {}\n", self.center_lon));
        content.push_str(&format!("zoom = {}\n", self.zoom));
        if !self.mapbox_token.is_empty() {
            content.push_str(&format!("mapbox_token = \"{}\"\n", self.mapbox_token));
        }
        content.push_str(&format!("timeout_secs = {}\n", self.timeout_secs));
        content.push_str(&format!("clamp_styling = {}\n", self.clamp_styling));
        content.push_str(&format!("utc_times = {}\n", self.utc_times));
        content.push_str(&format!("malformed_records = {}\n", self.malformed_records.as_str()));

        std::fs::write(config_path, content).context("Failed to write to config file")?;
        Ok(())
    }

    /// The tile token is never hardcoded; the environment wins over the file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_token_override(std::env::var(TOKEN_ENV_VAR).ok());
    }

    fn apply_token_override(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.mapbox_token = token.trim().to_string();
        }
    }

    /// `quakemap.ini` in the app data directory
    pub fn config_path() -> PathBuf {
        crate::utils::get_config_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("quakemap.ini")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.zoom, 5);
        assert_eq!(settings.center_lat, 37.09);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quakemap.ini");
        let settings = Settings {
            plates_feed: "plates.json".to_string(),
            zoom: 3,
            mapbox_token: "pk.abc".to_string(),
            clamp_styling: true,
            malformed_records: MalformedPolicy::Skip,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn bad_values_and_unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quakemap.ini");
        std::fs::write(
            &path,
            "# comment\nzoom = very\ncolor = purple\nutc_times = true\nmalformed_records = explode\n",
        )
        .unwrap();
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.zoom, 5);
        assert!(settings.utc_times);
        assert_eq!(settings.malformed_records, MalformedPolicy::RenderDegenerate);
    }

    #[test]
    fn token_override() {
        let mut settings = Settings {
            mapbox_token: "from-file".to_string(),
            ..Settings::default()
        };
        settings.apply_token_override(Some("   ".to_string()));
        assert_eq!(settings.mapbox_token, "from-file");
        settings.apply_token_override(Some("from-env".to_string()));
        assert_eq!(settings.mapbox_token, "from-env");
    }
}
