// Timeline service - Use case for loading sources and assembling the timeline
use crate::application::assembler::{DeviceSource, assemble};
use crate::application::error::SourceError;
use crate::application::source_loader::{load, load_readings};
use crate::application::source_repository::{AirQualityRepository, FootfallRepository};
use crate::application::time_index::{IndexOptions, build_index};
use crate::domain::air_quality::{DeviceBaseline, DeviceDirectory};
use crate::domain::location::LocationDirectory;
use crate::domain::time_point::Timeline;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct TimelineBuild {
    pub timeline: Timeline,
    pub dropped_records: usize,
    pub dropped_readings: usize,
}

#[derive(Clone)]
pub struct TimelineService {
    footfall: Arc<dyn FootfallRepository>,
    air_quality: Option<Arc<dyn AirQualityRepository>>,
    locations: LocationDirectory,
    stations: Vec<DeviceBaseline>,
    options: IndexOptions,
}

impl TimelineService {
    pub fn new(
        footfall: Arc<dyn FootfallRepository>,
        locations: LocationDirectory,
        stations: Vec<DeviceBaseline>,
        options: IndexOptions,
    ) -> Self {
        Self {
            footfall,
            air_quality: None,
            locations,
            stations,
            options,
        }
    }

    /// Use measured station readings instead of simulating them.
    pub fn with_air_quality(mut self, repository: Arc<dyn AirQualityRepository>) -> Self {
        self.air_quality = Some(repository);
        self
    }

    pub async fn build(&self) -> Result<TimelineBuild, SourceError> {
        let start_time = Instant::now();

        let rows = self.footfall.fetch_records().await?;
        let report = load(rows, &self.locations);

        let (devices, dropped_readings) = match &self.air_quality {
            Some(repository) => {
                let readings = load_readings(repository.fetch_readings().await?);
                let directory: DeviceDirectory = self
                    .stations
                    .iter()
                    .map(|baseline| baseline.device.clone())
                    .collect();
                (
                    DeviceSource::Measured {
                        readings: readings.readings,
                        directory,
                    },
                    readings.dropped,
                )
            }
            None if self.stations.is_empty() => (DeviceSource::None, 0),
            None => (DeviceSource::Simulated(self.stations.clone()), 0),
        };

        let keys: Vec<_> = match &devices {
            DeviceSource::Measured { readings, .. } => report
                .records
                .iter()
                .map(|record| record.key)
                .chain(readings.iter().map(|reading| reading.key))
                .collect(),
            _ => report.records.iter().map(|record| record.key).collect(),
        };
        let index = build_index(keys, &self.options);
        let points = assemble(&index, &report.records, &devices);
        let timeline = Timeline::new(points);

        match timeline.date_range() {
            Some((start, end)) => tracing::info!(
                "Assembled {} time points from {} records ({} to {}) in {:?}",
                timeline.len(),
                report.records.len(),
                start,
                end,
                start_time.elapsed()
            ),
            None => tracing::info!(
                "No time points in range ({} records loaded)",
                report.records.len()
            ),
        }

        Ok(TimelineBuild {
            timeline,
            dropped_records: report.dropped,
            dropped_readings,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::air_quality::RawReading;
    use crate::domain::record::{RawRecord, RawValue};
    use crate::domain::stats;
    use async_trait::async_trait;

    pub(crate) struct StaticFootfall(pub Vec<RawRecord>);

    #[async_trait]
    impl FootfallRepository for StaticFootfall {
        async fn fetch_records(&self) -> Result<Vec<RawRecord>, SourceError> {
            Ok(self.0.clone())
        }
    }

    pub(crate) struct FailingFootfall;

    #[async_trait]
    impl FootfallRepository for FailingFootfall {
        async fn fetch_records(&self) -> Result<Vec<RawRecord>, SourceError> {
            Err(SourceError::Status {
                url: "http://localhost/data.json".to_string(),
                status: 503,
                body: "unavailable".to_string(),
            })
        }
    }

    struct StaticReadings(Vec<RawReading>);

    #[async_trait]
    impl AirQualityRepository for StaticReadings {
        async fn fetch_readings(&self) -> Result<Vec<RawReading>, SourceError> {
            Ok(self.0.clone())
        }
    }

    pub(crate) fn scenario_rows() -> Vec<RawRecord> {
        let text = |s: &str| RawValue::Text(s.to_string());
        vec![
            RawRecord::new("A", "Site A", text("120"), "2024-10-01T00:00:00Z"),
            RawRecord::new("B", "Site B", text("bad"), "2024-10-01T00:00:00Z"),
            RawRecord::new("A", "Site A", text("80"), "2024-10-01T08:00:00Z"),
        ]
    }

    fn service(rows: Vec<RawRecord>, stations: Vec<DeviceBaseline>) -> TimelineService {
        TimelineService::new(
            Arc::new(StaticFootfall(rows)),
            LocationDirectory::sydney_cbd(),
            stations,
            IndexOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let build = service(scenario_rows(), Vec::new()).build().await.unwrap();
        let timeline = build.timeline;

        let keys: Vec<String> = timeline.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2024-10-01T00:00:00Z", "2024-10-01T08:00:00Z"]);
        assert_eq!(timeline.len(), 2);

        let first = timeline.get(0).unwrap();
        let codes: Vec<&str> = first.pedestrians.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B"]);
        assert_eq!(stats::sum(first.pedestrians.iter().map(|r| r.value)), 120.0);

        let second = timeline.get(1).unwrap();
        assert_eq!(second.pedestrians.len(), 1);
        assert_eq!(second.pedestrians[0].value, 80.0);
        assert_eq!(build.dropped_records, 0);
    }

    #[tokio::test]
    async fn test_simulated_stations_attached_to_every_point() {
        let build = service(scenario_rows(), DeviceBaseline::sydney_stations())
            .build()
            .await
            .unwrap();
        assert!(build.timeline.points().iter().all(|p| p.devices.len() == 3));
    }

    #[tokio::test]
    async fn test_measured_readings_extend_the_index() {
        let reading = RawReading {
            device_code: "15".to_string(),
            parameter: "PM2.5".to_string(),
            begin: "2024-10-01T04:00:00Z".to_string(),
            value: "9.5".to_string(),
        };
        let build = service(scenario_rows(), DeviceBaseline::sydney_stations())
            .with_air_quality(Arc::new(StaticReadings(vec![reading])))
            .build()
            .await
            .unwrap();

        assert_eq!(build.timeline.len(), 3);
        let middle = build.timeline.get(1).unwrap();
        assert!(middle.pedestrians.is_empty());
        assert_eq!(middle.devices.len(), 1);
        assert_eq!(middle.devices[0].device.name, "ALEXANDRIA");
        assert!(build.timeline.get(0).unwrap().devices.is_empty());
    }

    #[tokio::test]
    async fn test_empty_source_builds_empty_timeline() {
        let build = service(Vec::new(), DeviceBaseline::sydney_stations())
            .build()
            .await
            .unwrap();
        assert!(build.timeline.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let service = TimelineService::new(
            Arc::new(FailingFootfall),
            LocationDirectory::sydney_cbd(),
            Vec::new(),
            IndexOptions::default(),
        );
        let err = service.build().await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 503, .. }));
    }
}
