// Footfall record domain models
use super::location::Coordinate;
use super::time_key::TimeKey;
use serde::Deserialize;
use std::collections::BTreeMap;

/// A count as delivered by the source: exports mix quoted and bare numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

/// One footfall row as exported by the counting network.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Location_code")]
    pub code: String,
    #[serde(rename = "Location_Name", default)]
    pub name: String,
    #[serde(rename = "Date")]
    pub timestamp: String,
    #[serde(rename = "TotalCount", default)]
    pub value: Option<RawValue>,
    /// Remaining descriptive columns (`Hour`, `Day`, `Week`, ...), kept verbatim.
    #[serde(flatten)]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl RawRecord {
    pub fn new(code: &str, name: &str, value: RawValue, timestamp: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            timestamp: timestamp.to_string(),
            value: Some(value),
            details: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecord {
    pub code: String,
    pub name: String,
    pub value: f64,
    pub coordinate: Coordinate,
    pub key: TimeKey,
    /// False when the coordinate is the city-centre fallback.
    pub location_known: bool,
    pub details: BTreeMap<String, serde_json::Value>,
}
