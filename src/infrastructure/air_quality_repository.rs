// Air-quality repository implementation - Station CSV exports in a directory
use crate::application::error::SourceError;
use crate::application::source_repository::AirQualityRepository;
use crate::domain::air_quality::{RawReading, SensorKind};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "open.NSW-AIRQ.";
const FILE_SUFFIX: &str = ".csv";

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    begin: String,
    #[serde(default)]
    v: String,
}

#[derive(Debug, Clone)]
pub struct CsvAirQualityRepository {
    directory: PathBuf,
}

/// Splits `open.NSW-AIRQ.<code>.<PARAM>.csv` into station code and parameter.
pub fn parse_file_name(name: &str) -> Option<(String, String)> {
    let stem = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
    let (code, parameter) = stem.split_once('.')?;
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) || parameter.is_empty() {
        return None;
    }
    Some((code.to_string(), parameter.to_string()))
}

impl CsvAirQualityRepository {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    fn read_file(path: &Path, code: &str, parameter: &str) -> Result<Vec<RawReading>, SourceError> {
        let csv_error = |source| SourceError::Csv {
            file: path.display().to_string(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(csv_error)?;

        let mut readings = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(csv_error)?;
            if row.begin.is_empty() {
                continue;
            }
            readings.push(RawReading {
                device_code: code.to_string(),
                parameter: parameter.to_string(),
                begin: row.begin,
                value: row.v,
            });
        }
        Ok(readings)
    }

    fn read_all(directory: &Path) -> Result<Vec<RawReading>, SourceError> {
        let io_error = |source| SourceError::Io {
            path: directory.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(directory).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            match parse_file_name(&name) {
                Some((code, parameter)) if SensorKind::from_parameter(&parameter).is_some() => {
                    files.push((entry.path(), code, parameter));
                }
                _ => tracing::debug!("Skipping {} - not a PM2.5 or TEMP export", name),
            }
        }
        files.sort();

        let mut readings = Vec::new();
        for (path, code, parameter) in &files {
            match Self::read_file(path, code, parameter) {
                Ok(rows) => readings.extend(rows),
                // One unreadable station file should not sink the whole load
                Err(e) => tracing::warn!("Skipping air-quality file: {}", e),
            }
        }

        tracing::info!(
            "Read {} air-quality rows from {} files in {}",
            readings.len(),
            files.len(),
            directory.display()
        );
        Ok(readings)
    }
}

#[async_trait]
impl AirQualityRepository for CsvAirQualityRepository {
    async fn fetch_readings(&self) -> Result<Vec<RawReading>, SourceError> {
        let directory = self.directory.clone();
        tokio::task::spawn_blocking(move || Self::read_all(&directory))
            .await
            .map_err(|e| SourceError::Io {
                path: self.directory.clone(),
                source: std::io::Error::other(e),
            })?
    }
}
