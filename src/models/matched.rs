use serde::{Deserialize, Serialize};

use super::AddressRecord;

/// One labelled correspondence between an authoritative record (A) and a
/// derived record (B).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub id_a: String,
    pub id_b: String,
    pub full_address_a: Option<String>,
    pub full_address_b: Option<String>,
    pub postcode_a: Option<String>,
    pub postcode_b: Option<String>,
    pub lat_a: f64,
    pub lon_a: f64,
    pub lat_b: f64,
    pub lon_b: f64,
    pub distance_meters: f64,
}

impl MatchedPair {
    pub fn new(a: &AddressRecord, b: &AddressRecord, distance_meters: f64) -> Self {
        Self {
            id_a: a.source_id.clone(),
            id_b: b.source_id.clone(),
            full_address_a: a.full_address.clone(),
            full_address_b: b.full_address.clone(),
            postcode_a: a.postcode.clone(),
            postcode_b: b.postcode.clone(),
            lat_a: a.latitude,
            lon_a: a.longitude,
            lat_b: b.latitude,
            lon_b: b.longitude,
            distance_meters,
        }
    }
}
