// Assembled time points and the immutable timeline
use super::air_quality::{Device, SensorKind};
use super::record::ResolvedRecord;
use super::time_key::TimeKey;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReading {
    pub device: Device,
    pub pm25: Option<f64>,
    pub temperature: Option<f64>,
}

impl DeviceReading {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            pm25: None,
            temperature: None,
        }
    }

    pub fn value(&self, kind: SensorKind) -> Option<f64> {
        match kind {
            SensorKind::Pm25 => self.pm25,
            SensorKind::Temperature => self.temperature,
        }
    }

    pub fn set(&mut self, kind: SensorKind, value: f64) {
        match kind {
            SensorKind::Pm25 => self.pm25 = Some(value),
            SensorKind::Temperature => self.temperature = Some(value),
        }
    }
}

/// All sources joined at a single timestamp key.
#[derive(Debug, Clone, PartialEq)]
pub struct TimePoint {
    pub key: TimeKey,
    pub devices: Vec<DeviceReading>,
    pub pedestrians: Vec<ResolvedRecord>,
}

impl TimePoint {
    pub fn new(key: TimeKey) -> Self {
        Self {
            key,
            devices: Vec::new(),
            pedestrians: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.pedestrians.is_empty()
    }
}

/// Time points in index order. Never mutated once assembled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    points: Vec<TimePoint>,
}

impl Timeline {
    pub fn new(points: Vec<TimePoint>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimePoint> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn keys(&self) -> impl Iterator<Item = TimeKey> + '_ {
        self.points.iter().map(|point| point.key)
    }

    /// First and last keys, or `None` for an empty timeline.
    pub fn date_range(&self) -> Option<(TimeKey, TimeKey)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.key, last.key)),
            _ => None,
        }
    }
}
