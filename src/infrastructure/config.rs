use crate::application::time_index::IndexOptions;
use crate::domain::air_quality::{Device, DeviceBaseline};
use crate::domain::location::{Coordinate, LocationDirectory};
use crate::domain::playback::PlaybackSettings;
use crate::domain::time_key::TimeKey;
use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub source: SourceSettings,
    #[serde(default)]
    pub index: IndexSettings,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub backend: BackendSettings,
    /// Extra counting sites, added on top of the built-in CBD table.
    #[serde(default)]
    pub locations: Vec<LocationConfig>,
    /// Stations to simulate or to label measured readings. Empty means the built-in set.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    /// A local JSON file or an http(s) URL serving the footfall array.
    #[serde(default = "default_footfall")]
    pub footfall: String,
    /// Directory of `open.NSW-AIRQ.<code>.<PARAM>.csv` files. Unset means simulated stations.
    #[serde(default)]
    pub air_quality_dir: Option<PathBuf>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            footfall: default_footfall(),
            air_quality_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexSettings {
    #[serde(default)]
    pub range_start: Option<String>,
    #[serde(default)]
    pub range_end: Option<String>,
    #[serde(default = "default_stride")]
    pub stride: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            range_start: None,
            range_end: None,
            stride: default_stride(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaybackConfig {
    #[serde(default = "default_base_interval_ms")]
    pub base_interval_ms: u64,
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: default_base_interval_ms(),
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    #[serde(default = "default_backend_url")]
    pub base_url: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    pub code: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub pm25: f64,
    #[serde(default)]
    pub temperature: f64,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_footfall() -> String {
    "data/data.json".to_string()
}

fn default_stride() -> usize {
    1
}

fn default_base_interval_ms() -> u64 {
    1000
}

fn default_min_interval_ms() -> u64 {
    50
}

fn default_backend_url() -> String {
    "http://localhost:5080".to_string()
}

fn default_top_k() -> usize {
    5
}

/// Reads `config/timeline.toml` when present, then `TIMELINE__*` environment overrides.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/timeline").required(false))
        .add_source(config::Environment::with_prefix("TIMELINE").separator("__"))
        .build()
        .context("Failed to read configuration")?;

    Ok(settings.try_deserialize()?)
}

impl AppConfig {
    pub fn index_options(&self) -> anyhow::Result<IndexOptions> {
        let parse = |raw: &Option<String>, field: &str| -> anyhow::Result<Option<TimeKey>> {
            raw.as_deref()
                .map(|value| {
                    TimeKey::parse(value)
                        .with_context(|| format!("index.{} is not a timestamp: {}", field, value))
                })
                .transpose()
        };

        Ok(IndexOptions {
            range_start: parse(&self.index.range_start, "range_start")?,
            range_end: parse(&self.index.range_end, "range_end")?,
            stride: self.index.stride,
        })
    }

    pub fn playback_settings(&self) -> PlaybackSettings {
        PlaybackSettings {
            base_interval: Duration::from_millis(self.playback.base_interval_ms),
            min_interval: Duration::from_millis(self.playback.min_interval_ms),
        }
    }

    pub fn location_directory(&self) -> LocationDirectory {
        let mut directory = LocationDirectory::sydney_cbd();
        for location in &self.locations {
            directory.insert(
                location.code.clone(),
                location.name.clone(),
                Coordinate::new(location.lat, location.lng),
            );
        }
        directory
    }

    pub fn stations(&self) -> Vec<DeviceBaseline> {
        if self.devices.is_empty() {
            return DeviceBaseline::sydney_stations();
        }
        self.devices
            .iter()
            .map(|device| DeviceBaseline {
                device: Device::new(
                    &device.code,
                    &device.name,
                    &device.description,
                    Coordinate::new(device.lat, device.lng),
                ),
                pm25: device.pm25,
                temperature: device.temperature,
            })
            .collect()
    }
}
