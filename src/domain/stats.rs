// Aggregations over the currently selected time point
use super::air_quality::SensorKind;
use super::time_point::TimePoint;

pub fn count<I: IntoIterator<Item = f64>>(values: I) -> usize {
    values.into_iter().count()
}

pub fn sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().sum()
}

/// Arithmetic mean; 0 for an empty collection.
pub fn average<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let (total, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(total, n), value| (total + value, n + 1));
    if n == 0 { 0.0 } else { total / n as f64 }
}

/// Largest value; 0 for an empty collection.
pub fn max<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().fold(None, |best: Option<f64>, value| match best {
        Some(current) if current >= value => Some(current),
        _ => Some(value),
    })
    .unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimePointSummary {
    pub pedestrian_sites: usize,
    pub pedestrian_total: f64,
    pub pedestrian_average: f64,
    pub pedestrian_max: f64,
    pub device_count: usize,
    pub pm25_average: f64,
    pub pm25_max: f64,
    pub temperature_average: f64,
}

impl TimePointSummary {
    pub fn of(point: &TimePoint) -> Self {
        let counts = || point.pedestrians.iter().map(|record| record.value);
        let sensor = |kind: SensorKind| {
            point
                .devices
                .iter()
                .filter_map(move |reading| reading.value(kind))
        };

        Self {
            pedestrian_sites: count(counts()),
            pedestrian_total: sum(counts()),
            pedestrian_average: average(counts()),
            pedestrian_max: max(counts()),
            device_count: point.devices.len(),
            pm25_average: average(sensor(SensorKind::Pm25)),
            pm25_max: max(sensor(SensorKind::Pm25)),
            temperature_average: average(sensor(SensorKind::Temperature)),
        }
    }
}

/// Input for marker sizing: the renderer normalizes `value` against `max_value_in_set`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerScale {
    pub code: String,
    pub value: f64,
    pub max_value_in_set: f64,
}

pub fn pedestrian_markers(point: &TimePoint) -> Vec<MarkerScale> {
    let max_value_in_set = max(point.pedestrians.iter().map(|record| record.value));
    point
        .pedestrians
        .iter()
        .map(|record| MarkerScale {
            code: record.code.clone(),
            value: record.value,
            max_value_in_set,
        })
        .collect()
}

pub fn pm25_markers(point: &TimePoint) -> Vec<MarkerScale> {
    let max_value_in_set = max(point.devices.iter().filter_map(|reading| reading.pm25));
    point
        .devices
        .iter()
        .filter_map(|reading| {
            reading.pm25.map(|value| MarkerScale {
                code: reading.device.code.clone(),
                value,
                max_value_in_set,
            })
        })
        .collect()
}
