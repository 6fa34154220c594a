//! Spatial index over projected address points.

use rstar::primitives::GeomWithData;
use rstar::RTree;
use tracing::{info, warn};

use super::projection::{planar_distance, to_web_mercator};
use crate::models::AddressRecord;

/// Projected point tagged with the record's position in the source slice
type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// R-tree over the authoritative records, in Web Mercator metres
pub struct AddressIndex {
    tree: RTree<IndexedPoint>,
    skipped: usize,
}

impl AddressIndex {
    /// Build the index. Records whose coordinates cannot be projected are
    /// skipped and counted.
    pub fn build(records: &[AddressRecord]) -> Self {
        info!("Building spatial index for {} records...", records.len());

        let mut skipped = 0;
        let points: Vec<IndexedPoint> = records
            .iter()
            .enumerate()
            .filter_map(|(i, record)| {
                let projected = to_web_mercator(record.longitude, record.latitude);
                if projected.is_none() {
                    skipped += 1;
                }
                projected.map(|p| GeomWithData::new(p, i))
            })
            .collect();

        if skipped > 0 {
            warn!("Skipped {} records with unusable coordinates", skipped);
        }

        let tree = RTree::bulk_load(points);
        info!("Spatial index built with {} entries", tree.size());

        Self { tree, skipped }
    }

    /// All indexed records within `radius` metres of `point`, with distances.
    pub fn within(&self, point: [f64; 2], radius: f64) -> Vec<(usize, f64)> {
        self.tree
            .locate_within_distance(point, radius * radius)
            .map(|entry| (entry.data, planar_distance(*entry.geom(), point)))
            .filter(|(_, distance)| *distance <= radius)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Records left out of the index
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_index() {
        let index = AddressIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.within([0.0, 0.0], 100.0).is_empty());
    }

    #[test]
    fn test_within_radius() {
        let records = vec![
            AddressRecord::new("1", 51.5, -0.1),
            AddressRecord::new("2", 51.5001, -0.1),
            AddressRecord::new("3", 52.0, -0.1),
            AddressRecord::new("bad", f64::NAN, -0.1),
        ];
        let index = AddressIndex::build(&records);
        assert_eq!(index.len(), 3);
        assert_eq!(index.skipped(), 1);

        let query = to_web_mercator(-0.1, 51.5).unwrap();
        let mut hits = index.within(query, 10.0);
        hits.sort_by_key(|(i, _)| *i);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, 0);
        assert!(hits[0].1 < 1e-6);

        let hits = index.within(query, 20.0);
        assert_eq!(hits.len(), 2);
    }
}
