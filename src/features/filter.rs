//! Tag filtering and projection of raw features into address rows.

use clap::ValueEnum;
use serde::Deserialize;

use super::geometry::representative_point;
use crate::address::display_address;
use crate::models::{AddressRecord, RawFeature};

/// `building=*` values accepted by the residential policy.
/// "residental" is a common misspelling in UK data and is kept on purpose.
pub const RESIDENTIAL_BUILDINGS: [&str; 13] = [
    "apartments",
    "detached",
    "terrace",
    "semidetached_house",
    "hut",
    "ger",
    "houseboat",
    "static_caravan",
    "house",
    "dwelling_house",
    "residences",
    "residence",
    "residental",
];

const CITY_KEYS: [&str; 4] = ["addr:city", "addr:town", "addr:village", "addr:hamlet"];

/// Which features count as addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterPolicy {
    /// Unit-level identifier and a street or place
    #[default]
    Postal,
    /// Postal, plus a postcode and a residential building type
    Residential,
}

impl FilterPolicy {
    pub fn accepts(&self, record: &AddressRecord) -> bool {
        if !(record.has_unit_level() && record.has_street_level()) {
            return false;
        }

        match self {
            FilterPolicy::Postal => true,
            FilterPolicy::Residential => {
                record.postcode.is_some()
                    && record
                        .building
                        .as_deref()
                        .map(|b| RESIDENTIAL_BUILDINGS.contains(&b))
                        .unwrap_or(false)
            }
        }
    }
}

/// Outcome of projecting one feature
#[derive(Debug)]
pub enum Projection {
    Address(AddressRecord),
    /// Parsed fine but is not an address under the policy
    Filtered,
    /// No usable representative point
    Malformed,
}

/// Map a feature's tags and geometry into an address row, then apply `policy`.
pub fn project_feature(feature: &RawFeature, policy: FilterPolicy) -> Projection {
    let Some(point) = representative_point(&feature.geometry) else {
        return Projection::Malformed;
    };

    let owned = |key: &str| feature.tag(key).map(str::to_string);

    let mut record = AddressRecord {
        source_id: feature.id.clone(),
        osm_type: feature.osm_type,
        unit: owned("addr:unit"),
        flats: owned("addr:flats"),
        house_name: owned("addr:housename"),
        house_number: owned("addr:housenumber"),
        substreet: owned("addr:substreet"),
        thoroughfare: feature
            .first_tag(&["addr:street", "addr:place"])
            .map(str::to_string),
        parentstreet: owned("addr:parentstreet"),
        suburb: owned("addr:suburb"),
        city_like: feature.first_tag(&CITY_KEYS).map(str::to_string),
        district: owned("addr:district"),
        county: owned("addr:county"),
        postcode: owned("addr:postcode"),
        building: owned("building"),
        name: owned("name"),
        latitude: point.y(),
        longitude: point.x(),
        full_address: None,
    };

    if !policy.accepts(&record) {
        return Projection::Filtered;
    }

    // Tags that are present but blank leave nothing to display
    let Some(full_address) = display_address(&record) else {
        return Projection::Filtered;
    };
    record.full_address = Some(full_address);
    Projection::Address(record)
}
