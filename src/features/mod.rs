//! Feature filter & projector.
//!
//! Streams an NDJSON GeoJSON dump, keeps features that look like postal
//! addresses and reduces each one to a flat [`AddressRecord`].

mod filter;
mod geometry;
mod reader;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

pub use filter::{project_feature, FilterPolicy, Projection, RESIDENTIAL_BUILDINGS};
pub use geometry::representative_point;
pub use reader::{open_features, parse_feature};

use crate::error::{PipelineError, Result};
use crate::models::AddressRecord;

/// Lines handed to the thread pool at a time
const CHUNK_SIZE: usize = 50_000;

/// Counters for one extraction run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub lines: u64,
    pub malformed: u64,
    pub filtered: u64,
    pub emitted: u64,
}

impl ExtractStats {
    fn record(&mut self, projection: &Projection) {
        match projection {
            Projection::Address(_) => self.emitted += 1,
            Projection::Filtered => self.filtered += 1,
            Projection::Malformed => self.malformed += 1,
        }
    }
}

/// Project a batch of raw lines. Order of the output follows the input.
pub fn project_lines(lines: &[String], policy: FilterPolicy) -> Vec<Projection> {
    lines
        .par_iter()
        .map(|line| match parse_feature(line) {
            Some(feature) => project_feature(&feature, policy),
            None => Projection::Malformed,
        })
        .collect()
}

/// Read every feature in `path` and return the accepted address rows.
pub fn extract_addresses(
    path: &Path,
    policy: FilterPolicy,
) -> Result<(Vec<AddressRecord>, ExtractStats)> {
    info!(
        "Extracting addresses from {} ({:?} policy)",
        path.display(),
        policy
    );

    let reader = open_features(path)?;

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {pos} lines ({per_sec})")
    {
        pb.set_style(style);
    }

    let mut stats = ExtractStats::default();
    let mut records = Vec::new();
    let mut chunk = Vec::with_capacity(CHUNK_SIZE);

    let mut flush = |chunk: &mut Vec<String>, stats: &mut ExtractStats| {
        for projection in project_lines(chunk, policy) {
            stats.record(&projection);
            if let Projection::Address(record) = projection {
                records.push(record);
            }
        }
        chunk.clear();
    };

    for line in reader.lines() {
        let line = line.map_err(|e| PipelineError::io(path, e))?;
        if reader::trim_line(&line).is_empty() {
            continue;
        }
        stats.lines += 1;
        chunk.push(line);

        if chunk.len() >= CHUNK_SIZE {
            flush(&mut chunk, &mut stats);
            pb.set_position(stats.lines);
        }
    }
    flush(&mut chunk, &mut stats);

    pb.finish_with_message("Extraction complete");

    if stats.malformed > 0 {
        warn!("Skipped {} malformed features", stats.malformed);
    }
    info!(
        "Read {} features: {} addresses, {} filtered out, {} malformed",
        stats.lines, stats.emitted, stats.filtered, stats.malformed
    );

    Ok((records, stats))
}
