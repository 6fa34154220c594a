//! Raw map features as read from an OSM GeoJSON export.

use geo::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Type of OSM element a feature was exported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsmType {
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for OsmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsmType::Node => write!(f, "node"),
            OsmType::Way => write!(f, "way"),
            OsmType::Relation => write!(f, "relation"),
        }
    }
}

impl FromStr for OsmType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" | "n" => Ok(OsmType::Node),
            "way" | "w" => Ok(OsmType::Way),
            "relation" | "r" => Ok(OsmType::Relation),
            _ => Err(()),
        }
    }
}

/// One feature from the input dump: id, element kind, geometry and tag bag.
#[derive(Debug, Clone)]
pub struct RawFeature {
    /// Element id as exported (`@id`), falls back to the feature id
    pub id: String,

    /// Element kind (`@type`), if the export carried it
    pub osm_type: Option<OsmType>,

    pub geometry: Geometry<f64>,

    /// Tag bag. Values are kept verbatim, including empty strings.
    pub tags: HashMap<String, String>,
}

impl RawFeature {
    /// Get a tag value, treating empty strings as absent
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// First non-empty value among `keys`, in order
    pub fn first_tag(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.tag(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Point;

    fn feature(tags: &[(&str, &str)]) -> RawFeature {
        RawFeature {
            id: "1".to_string(),
            osm_type: Some(OsmType::Node),
            geometry: Geometry::Point(Point::new(-0.1, 51.5)),
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_empty_tag_is_absent() {
        let f = feature(&[("addr:street", "")]);
        assert_eq!(f.tag("addr:street"), None);
    }

    #[test]
    fn test_first_tag_priority() {
        let f = feature(&[("addr:town", "Reading"), ("addr:village", "Tilehurst")]);
        assert_eq!(
            f.first_tag(&["addr:city", "addr:town", "addr:village"]),
            Some("Reading")
        );
    }

    #[test]
    fn test_osm_type_parse() {
        assert_eq!("way".parse::<OsmType>(), Ok(OsmType::Way));
        assert_eq!("r".parse::<OsmType>(), Ok(OsmType::Relation));
        assert!("area".parse::<OsmType>().is_err());
    }
}
