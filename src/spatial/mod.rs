//! Spatial matching between two address tables.
//!
//! Points are projected to Web Mercator and indexed in an R-tree; see
//! [`matcher`] for the uniqueness rule.

mod index;
pub mod matcher;
mod projection;

pub use index::AddressIndex;
pub use matcher::{
    candidate_pairs, match_records, unique_matches, Candidate, MatchParams, MatchStats,
};
pub use projection::{planar_distance, to_web_mercator, EARTH_RADIUS_M};
