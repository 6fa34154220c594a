//! Reading newline-delimited GeoJSON features.

use flate2::read::GzDecoder;
use geojson::{feature::Id, GeoJson};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{PipelineError, Result};
use crate::models::{OsmType, RawFeature};

/// RFC 8142 record separator used by GeoJSON text sequences
const RECORD_SEPARATOR: char = '\u{1e}';

/// Strip record separators and surrounding whitespace from a raw line.
pub(crate) fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c == RECORD_SEPARATOR || c.is_whitespace())
}

/// Open a feature dump, transparently decompressing `.gz` files.
pub fn open_features(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let reader: Box<dyn Read + Send> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    Ok(Box::new(BufReader::with_capacity(1 << 20, reader)))
}

/// Parse one line of the dump. Returns `None` for anything that is not a
/// Feature with a convertible geometry.
pub fn parse_feature(line: &str) -> Option<RawFeature> {
    let line = trim_line(line);
    if line.is_empty() {
        return None;
    }

    let feature = match line.parse::<GeoJson>().ok()? {
        GeoJson::Feature(f) => f,
        _ => return None,
    };

    let geometry = geo::Geometry::<f64>::try_from(feature.geometry?).ok()?;

    let mut tags = HashMap::new();
    if let Some(properties) = feature.properties {
        for (key, value) in properties {
            match value {
                Value::String(s) => {
                    tags.insert(key, s);
                }
                Value::Number(n) => {
                    tags.insert(key, n.to_string());
                }
                Value::Bool(b) => {
                    tags.insert(key, b.to_string());
                }
                _ => {}
            }
        }
    }

    let osm_type = tags.get("@type").and_then(|t| t.parse::<OsmType>().ok());
    let raw_id = tags.get("@id").cloned().or_else(|| {
        feature.id.map(|id| match id {
            Id::String(s) => s,
            Id::Number(n) => n.to_string(),
        })
    })?;

    // Node and way ids overlap, so qualify with the element kind when known
    let id = match osm_type {
        Some(kind) if !raw_id.contains('/') => format!("{}/{}", kind, raw_id),
        _ => raw_id,
    };

    Some(RawFeature {
        id,
        osm_type,
        geometry,
        tags,
    })
}
