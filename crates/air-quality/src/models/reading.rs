use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;
use super::pollutant::PollutantSet;
use crate::index::{category_for, AqiCategory, MAX_INDEX};

/// City used when the geocoder answered but named no city, town or village.
pub const UNKNOWN_CITY: &str = "Metropolitan Area";

/// City used when the geocoder could not be reached at all.
pub const REMOTE_CITY: &str = "Remote Coordinate";

/// Where a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// The highest-priority live provider.
    Live,
    /// A lower-priority live provider.
    Fallback,
    /// Synthesized locally because every live provider failed.
    Simulated,
}

/// Human-readable address breakdown for a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub road: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighbourhood: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
}

impl Address {
    /// An address that only names a city.
    pub fn city_only(city: impl Into<String>) -> Self {
        Self {
            road: None,
            suburb: None,
            neighbourhood: None,
            city: city.into(),
            house_number: None,
        }
    }
}

/// A coordinate together with its resolved address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(flatten)]
    pub coordinate: Coordinate,
    pub address: Address,
}

impl Location {
    pub fn new(coordinate: Coordinate, address: Address) -> Self {
        Self {
            coordinate,
            address,
        }
    }
}

/// Normalized air-quality reading.
///
/// The index is clamped to `[0, 500]` on construction and the category is
/// always derived from it, so the two can never disagree. Once returned a
/// reading is an immutable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedReading {
    index: u16,
    category: AqiCategory,
    pollutants: PollutantSet,
    location: Location,
    retrieved_at: DateTime<Utc>,
    provenance: Provenance,
    source: String,
}

impl NormalizedReading {
    pub fn new(
        index: u16,
        pollutants: PollutantSet,
        location: Location,
        retrieved_at: DateTime<Utc>,
        provenance: Provenance,
        source: impl Into<String>,
    ) -> Self {
        let index = index.min(MAX_INDEX);
        Self {
            index,
            category: category_for(u32::from(index)),
            pollutants,
            location,
            retrieved_at,
            provenance,
            source: source.into(),
        }
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn category(&self) -> AqiCategory {
        self.category
    }

    /// Label of the category, e.g. "Moderate".
    pub fn category_label(&self) -> &'static str {
        self.category.label()
    }

    pub fn pollutants(&self) -> &PollutantSet {
        &self.pollutants
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    /// Provider id that produced the reading (WAQI, OPENAQ, SIMULATED).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Replace the address, keeping every other field.
    pub fn with_address(mut self, address: Address) -> Self {
        self.location.address = address;
        self
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        Location::new(
            Coordinate::new(12.97, 77.59),
            Address::city_only("Bengaluru"),
        )
    }

    #[test]
    fn test_category_follows_index() {
        let reading = NormalizedReading::new(
            151,
            PollutantSet::default(),
            location(),
            Utc::now(),
            Provenance::Live,
            "WAQI",
        );
        assert_eq!(reading.index(), 151);
        assert_eq!(reading.category(), AqiCategory::Unhealthy);
        assert_eq!(reading.category_label(), "Unhealthy");
    }

    #[test]
    fn test_index_is_clamped() {
        let reading = NormalizedReading::new(
            999,
            PollutantSet::default(),
            location(),
            Utc::now(),
            Provenance::Live,
            "WAQI",
        );
        assert_eq!(reading.index(), 500);
        assert_eq!(reading.category_label(), "Hazardous");
    }

    #[test]
    fn test_serializes_camel_case_with_label() {
        let reading = NormalizedReading::new(
            42,
            PollutantSet::default(),
            location(),
            Utc::now(),
            Provenance::Simulated,
            "SIMULATED",
        );
        let json = serde_json::to_value(&reading).expect("reading should serialize");
        assert_eq!(json["index"], 42);
        assert_eq!(json["category"], "Good");
        assert_eq!(json["provenance"], "simulated");
        assert_eq!(json["location"]["lat"], 12.97);
        assert_eq!(json["location"]["address"]["city"], "Bengaluru");
        assert!(json.get("retrievedAt").is_some());
    }
}
