use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::features::FilterPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    #[serde(rename = "match")]
    pub matching: MatchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExtractConfig {
    /// NDJSON feature dump (optionally gzipped)
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub policy: FilterPolicy,
    /// Drop rows whose all-fields key repeats an earlier row
    pub dedupe: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: PathBuf::from("all_uk_addresses_osm.parquet"),
            policy: FilterPolicy::Postal,
            dedupe: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MatchConfig {
    /// Authoritative address table (A side)
    pub reference: Option<PathBuf>,
    /// Extracted address table (B side)
    pub candidates: PathBuf,
    pub output: PathBuf,
    /// Candidate search radius in projected metres
    pub radius_m: f64,
    /// Final acceptance radius for the single surviving candidate
    pub accept_radius_m: Option<f64>,
    /// Remove the postcode from the authoritative full address
    pub strip_postcode: bool,
    pub reference_columns: ReferenceColumns,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            reference: None,
            candidates: PathBuf::from("all_uk_addresses_osm.parquet"),
            output: PathBuf::from("os_vs_osm_matched.parquet"),
            radius_m: 10.0,
            accept_radius_m: Some(2.0),
            strip_postcode: true,
            reference_columns: ReferenceColumns::default(),
        }
    }
}

/// Column names of the authoritative table
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReferenceColumns {
    pub id: String,
    pub full_address: String,
    pub postcode: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for ReferenceColumns {
    fn default() -> Self {
        Self {
            id: "uprn".to_string(),
            full_address: "fulladdress".to_string(),
            postcode: "postcode".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise start from defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(self.radius_m.is_finite() && self.radius_m > 0.0) {
            return Err(PipelineError::Config(format!(
                "radius_m must be positive, got {}",
                self.radius_m
            )));
        }
        if let Some(accept) = self.accept_radius_m {
            if !(0.0..=self.radius_m).contains(&accept) {
                return Err(PipelineError::Config(format!(
                    "accept_radius_m must be within [0, {}], got {}",
                    self.radius_m, accept
                )));
            }
        }
        Ok(())
    }
}
