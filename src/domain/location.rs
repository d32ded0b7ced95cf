// Location domain model - Code to coordinate lookup
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Sydney CBD map centre, used for any code missing from the directory.
pub const CITY_CENTER: Coordinate = Coordinate::new(-33.8688, 151.2093);

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, Default)]
pub struct LocationDirectory {
    entries: HashMap<String, Location>,
}

impl LocationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counting sites on the major CBD streets.
    pub fn sydney_cbd() -> Self {
        let mut directory = Self::new();
        directory.insert("A001", "Bridge Street", Coordinate::new(-33.8688, 151.2093));
        directory.insert("A002", "Elizabeth Street", Coordinate::new(-33.8737, 151.2098));
        directory.insert("A003", "Market Street", Coordinate::new(-33.8730, 151.2065));
        directory.insert("A004", "Park Street", Coordinate::new(-33.8725, 151.2070));
        directory
    }

    pub fn insert(&mut self, code: impl Into<String>, name: impl Into<String>, coordinate: Coordinate) {
        self.entries.insert(
            code.into(),
            Location {
                name: name.into(),
                coordinate,
            },
        );
    }

    pub fn get(&self, code: &str) -> Option<&Location> {
        self.entries.get(code)
    }

    /// Returns the coordinate for `code` and whether the code was known.
    pub fn resolve(&self, code: &str) -> (Coordinate, bool) {
        match self.entries.get(code) {
            Some(location) => (location.coordinate, true),
            None => (CITY_CENTER, false),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_and_unknown() {
        let directory = LocationDirectory::sydney_cbd();

        let (coordinate, known) = directory.resolve("A002");
        assert!(known);
        assert_eq!(coordinate, Coordinate::new(-33.8737, 151.2098));

        let (coordinate, known) = directory.resolve("Z999");
        assert!(!known);
        assert_eq!(coordinate, CITY_CENTER);
    }

    #[test]
    fn test_insert_overrides_existing_code() {
        let mut directory = LocationDirectory::sydney_cbd();
        directory.insert("A001", "Bridge St (moved)", Coordinate::new(-33.86, 151.21));

        assert_eq!(directory.len(), 4);
        assert_eq!(directory.get("A001").unwrap().name, "Bridge St (moved)");
    }
}
