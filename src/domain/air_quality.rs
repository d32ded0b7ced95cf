// Air-quality station domain models
use super::location::{CITY_CENTER, Coordinate};
use super::time_key::TimeKey;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensorKind {
    Pm25,
    Temperature,
}

impl SensorKind {
    /// Maps the parameter segment of an `open.NSW-AIRQ` file name.
    pub fn from_parameter(parameter: &str) -> Option<Self> {
        match parameter {
            "PM2.5" => Some(SensorKind::Pm25),
            "TEMP" => Some(SensorKind::Temperature),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SensorKind::Pm25 => "PM2.5",
            SensorKind::Temperature => "TEMP",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Pm25 => "µg/m³",
            SensorKind::Temperature => "°C",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub code: String,
    pub name: String,
    pub description: String,
    pub coordinate: Coordinate,
}

impl Device {
    pub fn new(code: &str, name: &str, description: &str, coordinate: Coordinate) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            coordinate,
        }
    }
}

/// Starting values for a simulated station.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceBaseline {
    pub device: Device,
    pub pm25: f64,
    pub temperature: f64,
}

impl DeviceBaseline {
    /// The three NSW stations used when no measured readings are loaded.
    pub fn sydney_stations() -> Vec<DeviceBaseline> {
        vec![
            DeviceBaseline {
                device: Device::new(
                    "15",
                    "ALEXANDRIA",
                    "Sydney East - ALEXANDRIA",
                    Coordinate::new(-33.9053170, 151.1972670),
                ),
                pm25: 15.5,
                temperature: 22.3,
            },
            DeviceBaseline {
                device: Device::new(
                    "1001",
                    "COOK AND PHILLIP",
                    "Sydney East - COOK AND PHILLIP",
                    Coordinate::new(-33.8728800, 151.2132300),
                ),
                pm25: 12.8,
                temperature: 21.7,
            },
            DeviceBaseline {
                device: Device::new(
                    "107",
                    "LIVERPOOL",
                    "Sydney South-west - LIVERPOOL",
                    Coordinate::new(-33.9313200, 150.9072700),
                ),
                pm25: 18.2,
                temperature: 23.1,
            },
        ]
    }
}

/// One CSV row from an `open.NSW-AIRQ.<code>.<PARAM>.csv` file, unparsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub device_code: String,
    pub parameter: String,
    pub begin: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirQualityReading {
    pub device_code: String,
    pub kind: SensorKind,
    pub value: f64,
    pub key: TimeKey,
}

#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    devices: HashMap<String, Device>,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, device: Device) {
        self.devices.insert(device.code.clone(), device);
    }

    /// Unknown stations are placed at the city centre under their bare code.
    pub fn lookup(&self, code: &str) -> Device {
        self.devices
            .get(code)
            .cloned()
            .unwrap_or_else(|| Device::new(code, code, "", CITY_CENTER))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.devices.contains_key(code)
    }
}

impl FromIterator<Device> for DeviceDirectory {
    fn from_iter<I: IntoIterator<Item = Device>>(iter: I) -> Self {
        let mut directory = DeviceDirectory::new();
        for device in iter {
            directory.insert(device);
        }
        directory
    }
}
