//! Proximity join with a uniqueness rule.
//!
//! Every derived record (B) is paired with the authoritative records (A)
//! inside the search radius. A B record is labelled only when exactly one A
//! record is in range; anything ambiguous is dropped rather than resolved to
//! the nearest.

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use tracing::{debug, info};

use super::index::AddressIndex;
use super::projection::to_web_mercator;
use crate::models::{AddressRecord, MatchedPair};

/// Thresholds for one matching run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchParams {
    /// Candidate search radius, projected metres
    pub radius_m: f64,
    /// The single surviving candidate must also be this close
    pub accept_radius_m: Option<f64>,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            radius_m: 10.0,
            accept_radius_m: Some(2.0),
        }
    }
}

/// A pair within the search radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Index into A
    pub a: usize,
    /// Index into B
    pub b: usize,
    pub distance: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MatchStats {
    pub candidates_total: usize,
    /// B records that could not be projected
    pub unprojectable: usize,
    /// B ids with no A record in range
    pub unmatched: usize,
    /// B ids with more than one A record in range
    pub ambiguous: usize,
    /// Unique candidates rejected by the acceptance radius
    pub too_far: usize,
    pub matched: usize,
}

/// Step 1: all (a, b) pairs within `radius_m`.
pub fn candidate_pairs(
    index: &AddressIndex,
    b: &[AddressRecord],
    radius_m: f64,
) -> Vec<Candidate> {
    b.par_iter()
        .enumerate()
        .flat_map_iter(|(b_idx, record)| {
            let hits = match to_web_mercator(record.longitude, record.latitude) {
                Some(point) => index.within(point, radius_m),
                None => Vec::new(),
            };
            hits.into_iter().map(move |(a_idx, distance)| Candidate {
                a: a_idx,
                b: b_idx,
                distance,
            })
        })
        .collect()
}

/// Steps 2 and 3: group candidates by B id across the whole run, keep the
/// groups with exactly one member, and emit them as pairs.
pub fn unique_matches(
    a: &[AddressRecord],
    b: &[AddressRecord],
    candidates: &[Candidate],
    accept_radius_m: Option<f64>,
) -> (Vec<MatchedPair>, MatchStats) {
    let mut by_b_id: HashMap<&str, Vec<&Candidate>> = HashMap::new();
    for candidate in candidates {
        by_b_id
            .entry(b[candidate.b].source_id.as_str())
            .or_default()
            .push(candidate);
    }

    let mut stats = MatchStats {
        candidates_total: candidates.len(),
        ..MatchStats::default()
    };

    let mut kept: Vec<&Candidate> = Vec::new();
    for (b_id, group) in &by_b_id {
        match group.as_slice() {
            [single] => match accept_radius_m {
                Some(limit) if single.distance > limit => stats.too_far += 1,
                _ => kept.push(*single),
            },
            many => {
                debug!("{} has {} candidates in range, dropping", b_id, many.len());
                stats.ambiguous += 1;
            }
        }
    }

    // Deterministic output regardless of hash order
    kept.sort_by_key(|c| c.b);

    let pairs: Vec<MatchedPair> = kept
        .into_iter()
        .map(|c| MatchedPair::new(&a[c.a], &b[c.b], c.distance))
        .collect();

    stats.matched = pairs.len();
    // Unprojectable rows are counted on their own, not as unmatched
    let mut projected_ids: HashSet<&str> = HashSet::new();
    for record in b {
        if to_web_mercator(record.longitude, record.latitude).is_some() {
            projected_ids.insert(record.source_id.as_str());
        } else {
            stats.unprojectable += 1;
        }
    }
    stats.unmatched = projected_ids
        .iter()
        .filter(|id| !by_b_id.contains_key(**id))
        .count();

    (pairs, stats)
}

/// Match B against A.
pub fn match_records(
    a: &[AddressRecord],
    b: &[AddressRecord],
    params: MatchParams,
) -> (Vec<MatchedPair>, MatchStats) {
    let index = AddressIndex::build(a);

    info!(
        "Searching {} candidate records within {} m",
        b.len(),
        params.radius_m
    );
    let candidates = candidate_pairs(&index, b, params.radius_m);

    let (pairs, stats) = unique_matches(a, b, &candidates, params.accept_radius_m);

    info!(
        "{} candidate pairs; {} matched, {} ambiguous, {} beyond acceptance radius, {} without candidates",
        stats.candidates_total, stats.matched, stats.ambiguous, stats.too_far, stats.unmatched
    );

    (pairs, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, lat: f64, lon: f64) -> AddressRecord {
        AddressRecord::new(id, lat, lon)
    }

    fn strict(radius_m: f64) -> MatchParams {
        MatchParams {
            radius_m,
            accept_radius_m: None,
        }
    }

    /// Latitude offset that projects to `metres` at 51.5°N
    fn lat_offset(metres: f64) -> f64 {
        // 1e-4 degrees ≈ 17.88 projected metres here
        metres / 17.882_248 * 1e-4
    }

    #[test]
    fn test_only_point_inside_radius_matches() {
        let a = vec![rec("1", 51.5, -0.1)];
        let b = vec![rec("a", 51.5, -0.1), rec("b", 51.5001, -0.1)];

        let (pairs, stats) = match_records(&a, &b, strict(10.0));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].id_a, "1");
        assert_eq!(pairs[0].id_b, "a");
        assert!(pairs[0].distance_meters < 1e-6);
        assert_eq!(stats.unmatched, 1);
    }

    #[test]
    fn test_two_in_range_drops_record() {
        let a = vec![rec("1", 51.5, -0.1), rec("2", 51.5 + lat_offset(3.0), -0.1)];
        let b = vec![rec("x", 51.5, -0.1)];

        let (pairs, stats) = match_records(&a, &b, strict(10.0));
        assert!(pairs.is_empty());
        assert_eq!(stats.ambiguous, 1);
        assert_eq!(stats.candidates_total, 2);
    }

    #[test]
    fn test_accept_radius() {
        let a = vec![rec("1", 51.5, -0.1), rec("2", 52.0, -0.1)];
        let b = vec![
            rec("near", 51.5 + lat_offset(1.0), -0.1),
            rec("far", 52.0 + lat_offset(5.0), -0.1),
        ];
        let params = MatchParams {
            radius_m: 10.0,
            accept_radius_m: Some(2.0),
        };

        let (pairs, stats) = match_records(&a, &b, params);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].id_b, "near");
        assert!((pairs[0].distance_meters - 1.0).abs() < 0.01);
        assert_eq!(stats.too_far, 1);
    }

    #[test]
    fn test_duplicate_b_ids_grouped_globally() {
        // Same B id twice, each with one candidate: the id has two in total
        let a = vec![rec("1", 51.5, -0.1), rec("2", 52.0, -0.1)];
        let b = vec![rec("dup", 51.5, -0.1), rec("dup", 52.0, -0.1)];

        let (pairs, stats) = match_records(&a, &b, strict(10.0));
        assert!(pairs.is_empty());
        assert_eq!(stats.ambiguous, 1);
    }

    #[test]
    fn test_unprojectable_not_counted_as_unmatched() {
        let a = vec![rec("1", 51.5, -0.1)];
        let b = vec![
            rec("a", 51.5, -0.1),
            rec("far", 52.5, -0.1),
            rec("pole", 89.9, -0.1),
        ];

        let (pairs, stats) = match_records(&a, &b, strict(10.0));
        assert_eq!(pairs.len(), 1);
        assert_eq!(stats.unprojectable, 1);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.matched, 1);
    }

    #[test]
    fn test_pair_fields() {
        let mut a1 = rec("100023336956", 51.5, -0.1);
        a1.full_address = Some("10 HIGH STREET, LONDON".to_string());
        a1.postcode = Some("E1 1AA".to_string());
        let mut b1 = rec("node/5", 51.5, -0.1);
        b1.full_address = Some("10 High Street, London".to_string());

        let (pairs, _) = match_records(&[a1], &[b1], MatchParams::default());
        let pair = &pairs[0];
        assert_eq!(pair.full_address_a.as_deref(), Some("10 HIGH STREET, LONDON"));
        assert_eq!(pair.full_address_b.as_deref(), Some("10 High Street, London"));
        assert_eq!(pair.postcode_a.as_deref(), Some("E1 1AA"));
        assert_eq!(pair.postcode_b, None);
        assert_eq!(pair.lat_b, 51.5);
        assert_eq!(pair.lon_a, -0.1);
    }

    #[test]
    fn test_output_sorted_by_b_position() {
        let a: Vec<_> = (0..20)
            .map(|i| rec(&i.to_string(), 51.0 + i as f64 * 0.01, -1.0))
            .collect();
        let b: Vec<_> = (0..20)
            .rev()
            .map(|i| rec(&format!("b{}", i), 51.0 + i as f64 * 0.01, -1.0))
            .collect();

        let (pairs, _) = match_records(&a, &b, strict(5.0));
        assert_eq!(pairs.len(), 20);
        assert_eq!(pairs[0].id_b, "b19");
        assert_eq!(pairs[19].id_b, "b0");
    }
}
