//! Flat address rows shared by both sources.

use serde::{Deserialize, Serialize};

use super::OsmType;

/// Canonical address row.
///
/// OSM-derived rows fill the structured fields; rows loaded from the
/// authoritative table only carry `full_address` and `postcode`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Unique identifier within its source ("way/123", a UPRN, ...)
    pub source_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub osm_type: Option<OsmType>,

    pub unit: Option<String>,
    pub flats: Option<String>,
    pub house_name: Option<String>,
    pub house_number: Option<String>,
    pub substreet: Option<String>,
    /// `addr:street`, or `addr:place` when there is no street
    pub thoroughfare: Option<String>,
    pub parentstreet: Option<String>,
    pub suburb: Option<String>,
    /// First of city / town / village / hamlet
    pub city_like: Option<String>,
    pub district: Option<String>,
    pub county: Option<String>,
    pub postcode: Option<String>,

    /// `building=*` value
    pub building: Option<String>,
    /// `name=*` value
    pub name: Option<String>,

    pub latitude: f64,
    pub longitude: f64,

    /// Display address, only set when non-empty
    pub full_address: Option<String>,
}

impl AddressRecord {
    /// Create a record with only an id and a location
    pub fn new(source_id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            source_id: source_id.into(),
            latitude,
            longitude,
            ..Self::default()
        }
    }

    /// Has at least one of unit / house name / house number
    pub fn has_unit_level(&self) -> bool {
        self.unit.is_some() || self.house_name.is_some() || self.house_number.is_some()
    }

    /// Has a thoroughfare (street or place)
    pub fn has_street_level(&self) -> bool {
        self.thoroughfare.is_some()
    }

    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postal_levels() {
        let mut record = AddressRecord::new("node/1", 51.5, -0.1);
        assert!(!record.has_unit_level());
        assert!(!record.has_street_level());

        record.house_name = Some("Rose Cottage".to_string());
        record.thoroughfare = Some("Mill Lane".to_string());
        assert!(record.has_unit_level());
        assert!(record.has_street_level());
    }

    #[test]
    fn test_nan_coordinates() {
        let record = AddressRecord::new("1", f64::NAN, -0.1);
        assert!(!record.has_coordinates());
    }
}
