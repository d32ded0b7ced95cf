// Time point assembler - Join every record source onto the time index
use crate::domain::air_quality::{AirQualityReading, DeviceBaseline, DeviceDirectory};
use crate::domain::record::ResolvedRecord;
use crate::domain::time_key::TimeKey;
use crate::domain::time_point::{DeviceReading, TimePoint};
use std::collections::{BTreeMap, HashMap};

const PM25_AMPLITUDE: f64 = 5.0;
const TEMPERATURE_AMPLITUDE: f64 = 1.0;
const PHASE_STEP: f64 = 0.1;

/// Where the device half of each time point comes from.
#[derive(Debug, Clone)]
pub enum DeviceSource {
    None,
    /// A fixed station set replayed at every position with a sinusoidal drift.
    Simulated(Vec<DeviceBaseline>),
    /// Per-timestamp readings; a station appears only where it has readings.
    Measured {
        readings: Vec<AirQualityReading>,
        directory: DeviceDirectory,
    },
}

/// Simulated values at index `position`. Depends on nothing but its inputs.
pub fn perturb(baseline: &DeviceBaseline, position: usize) -> DeviceReading {
    let phase = position as f64 * PHASE_STEP;
    DeviceReading {
        device: baseline.device.clone(),
        pm25: Some((baseline.pm25 + phase.sin() * PM25_AMPLITUDE).max(0.0)),
        temperature: Some(baseline.temperature + phase.cos() * TEMPERATURE_AMPLITUDE),
    }
}

/// Produces exactly one time point per index key, in index order.
pub fn assemble(
    index: &[TimeKey],
    pedestrians: &[ResolvedRecord],
    devices: &DeviceSource,
) -> Vec<TimePoint> {
    let mut by_key: HashMap<TimeKey, Vec<ResolvedRecord>> = HashMap::new();
    for record in pedestrians {
        by_key.entry(record.key).or_default().push(record.clone());
    }

    let mut measured = match devices {
        DeviceSource::Measured {
            readings,
            directory,
        } => group_readings(readings, directory),
        _ => HashMap::new(),
    };

    let points: Vec<TimePoint> = index
        .iter()
        .enumerate()
        .map(|(position, key)| {
            let devices = match devices {
                DeviceSource::None => Vec::new(),
                DeviceSource::Simulated(baselines) => baselines
                    .iter()
                    .map(|baseline| perturb(baseline, position))
                    .collect(),
                DeviceSource::Measured { .. } => measured
                    .remove(key)
                    .map(|stations| stations.into_values().collect())
                    .unwrap_or_default(),
            };

            TimePoint {
                key: *key,
                devices,
                pedestrians: by_key.remove(key).unwrap_or_default(),
            }
        })
        .collect();

    let unmatched: usize = by_key.values().map(Vec::len).sum();
    if unmatched > 0 {
        tracing::debug!("{} footfall records fall outside the time index", unmatched);
    }

    points
}

fn group_readings(
    readings: &[AirQualityReading],
    directory: &DeviceDirectory,
) -> HashMap<TimeKey, BTreeMap<String, DeviceReading>> {
    let mut grouped: HashMap<TimeKey, BTreeMap<String, DeviceReading>> = HashMap::new();
    for reading in readings {
        grouped
            .entry(reading.key)
            .or_default()
            .entry(reading.device_code.clone())
            .or_insert_with(|| DeviceReading::new(directory.lookup(&reading.device_code)))
            .set(reading.kind, reading.value);
    }
    grouped
}
