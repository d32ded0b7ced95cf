// Source loader - Resolve raw rows into typed, located, timestamped records
use crate::domain::air_quality::{AirQualityReading, RawReading, SensorKind};
use crate::domain::location::LocationDirectory;
use crate::domain::record::{RawRecord, RawValue, ResolvedRecord};
use crate::domain::time_key::TimeKey;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub records: Vec<ResolvedRecord>,
    /// Rows discarded because their timestamp could not be parsed.
    pub dropped: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingReport {
    pub readings: Vec<AirQualityReading>,
    pub dropped: usize,
}

/// Permissive count parsing: whitespace and thousands separators are ignored,
/// anything non-numeric becomes 0.
pub fn coerce_number(value: Option<&RawValue>) -> f64 {
    let parsed = match value {
        Some(RawValue::Number(n)) => Some(*n),
        Some(RawValue::Text(text)) => parse_numeric_text(text),
        None => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '_')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

pub fn load(rows: Vec<RawRecord>, locations: &LocationDirectory) -> LoadReport {
    let total = rows.len();
    let mut report = LoadReport {
        records: Vec::with_capacity(total),
        dropped: 0,
    };

    for row in rows {
        let Some(key) = TimeKey::parse(&row.timestamp) else {
            tracing::debug!(
                "Dropping footfall row for {}: unparseable timestamp {:?}",
                row.code,
                row.timestamp
            );
            report.dropped += 1;
            continue;
        };

        let value = coerce_number(row.value.as_ref());
        let (coordinate, location_known) = locations.resolve(&row.code);
        let name = match (row.name.is_empty(), locations.get(&row.code)) {
            (true, Some(location)) => location.name.clone(),
            _ => row.name,
        };

        report.records.push(ResolvedRecord {
            code: row.code,
            name,
            value,
            coordinate,
            key,
            location_known,
            details: row.details,
        });
    }

    if report.dropped > 0 {
        tracing::warn!(
            "Dropped {} of {} footfall rows with unparseable timestamps",
            report.dropped,
            total
        );
    }
    tracing::debug!("Resolved {} footfall records", report.records.len());

    report
}

/// Resolves air-quality rows. Unlike counts, a missing or non-numeric reading is
/// not treated as zero: the row is dropped.
pub fn load_readings(rows: Vec<RawReading>) -> ReadingReport {
    let total = rows.len();
    let mut report = ReadingReport::default();

    for row in rows {
        let Some(kind) = SensorKind::from_parameter(&row.parameter) else {
            tracing::debug!("Skipping unsupported parameter {}", row.parameter);
            report.dropped += 1;
            continue;
        };

        let value = match row.value.trim() {
            "" | "null" => None,
            text => parse_numeric_text(text).filter(|n| n.is_finite()),
        };

        match (TimeKey::parse(&row.begin), value) {
            (Some(key), Some(value)) => report.readings.push(AirQualityReading {
                device_code: row.device_code,
                kind,
                value,
                key,
            }),
            _ => report.dropped += 1,
        }
    }

    if report.dropped > 0 {
        tracing::warn!(
            "Dropped {} of {} air-quality rows with missing values or timestamps",
            report.dropped,
            total
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::location::CITY_CENTER;

    fn text(s: &str) -> RawValue {
        RawValue::Text(s.to_string())
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(Some(&text("120"))), 120.0);
        assert_eq!(coerce_number(Some(&text(" 1,204 "))), 1204.0);
        assert_eq!(coerce_number(Some(&text("12.5"))), 12.5);
        assert_eq!(coerce_number(Some(&text("bad"))), 0.0);
        assert_eq!(coerce_number(Some(&text(""))), 0.0);
        assert_eq!(coerce_number(Some(&text("NaN"))), 0.0);
        assert_eq!(coerce_number(Some(&RawValue::Number(7.0))), 7.0);
        assert_eq!(coerce_number(Some(&RawValue::Number(f64::INFINITY))), 0.0);
        assert_eq!(coerce_number(None), 0.0);
    }

    #[test]
    fn test_load_resolves_values_and_coordinates() {
        let rows = vec![
            RawRecord::new("A", "Site A", text("120"), "2024-10-01T00:00:00Z"),
            RawRecord::new("B", "Site B", text("bad"), "2024-10-01T00:00:00Z"),
            RawRecord::new("A", "Site A", text("80"), "2024-10-01T08:00:00Z"),
        ];

        let report = load(rows, &LocationDirectory::sydney_cbd());

        assert_eq!(report.dropped, 0);
        let values: Vec<(String, f64)> = report
            .records
            .iter()
            .map(|r| (r.code.clone(), r.value))
            .collect();
        assert_eq!(
            values,
            vec![
                ("A".to_string(), 120.0),
                ("B".to_string(), 0.0),
                ("A".to_string(), 80.0)
            ]
        );
        assert!(report.records.iter().all(|r| r.coordinate == CITY_CENTER));
        assert!(report.records.iter().all(|r| !r.location_known));
    }

    #[test]
    fn test_load_drops_unparseable_timestamps() {
        let rows = vec![
            RawRecord::new("A001", "", text("5"), "2024-10-01T00:00:00Z"),
            RawRecord::new("A001", "", text("6"), "not a date"),
            RawRecord::new("A002", "", text("7"), ""),
        ];

        let report = load(rows, &LocationDirectory::sydney_cbd());

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.dropped, 2);
        let record = &report.records[0];
        assert!(record.location_known);
        assert_eq!(record.name, "Bridge Street");
    }

    #[test]
    fn test_load_readings() {
        let row = |parameter: &str, begin: &str, value: &str| RawReading {
            device_code: "15".to_string(),
            parameter: parameter.to_string(),
            begin: begin.to_string(),
            value: value.to_string(),
        };
        let rows = vec![
            row("PM2.5", "2024-10-01T00:00:00Z", "14.2"),
            row("TEMP", "2024-10-01T00:00:00Z", "21.0"),
            row("PM2.5", "2024-10-01T01:00:00Z", "null"),
            row("PM2.5", "2024-10-01T02:00:00Z", ""),
            row("PM2.5", "garbage", "3"),
            row("NO2", "2024-10-01T00:00:00Z", "3"),
        ];

        let report = load_readings(rows);

        assert_eq!(report.readings.len(), 2);
        assert_eq!(report.dropped, 4);
        assert_eq!(report.readings[0].kind, SensorKind::Pm25);
        assert_eq!(report.readings[0].value, 14.2);
        assert_eq!(report.readings[1].kind, SensorKind::Temperature);
    }
}
