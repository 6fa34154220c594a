//! Core data models for the address pipeline.

pub mod address;
pub mod feature;
pub mod matched;

pub use address::AddressRecord;
pub use feature::{OsmType, RawFeature};
pub use matched::MatchedPair;
