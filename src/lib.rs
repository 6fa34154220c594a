//! osm-addr-bench - builds a labelled address-matching evaluation set
//!
//! This library provides the shared stages used by the `extract` and
//! `match` binaries: feature filtering and projection, address
//! normalization and deduplication, spatial matching and Parquet I/O.

pub mod address;
pub mod columnar;
pub mod config;
pub mod error;
pub mod features;
pub mod models;
pub mod spatial;

pub use error::PipelineError;
pub use models::{AddressRecord, MatchedPair, OsmType, RawFeature};
