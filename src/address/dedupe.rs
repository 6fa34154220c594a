use hashbrown::HashSet;
use tracing::info;

use super::normalize::dedup_key;
use crate::models::AddressRecord;

/// Remove records whose key repeats an earlier one, keeping the first.
///
/// Exact byte equality of the key is the only criterion. Running it again
/// on its own output changes nothing.
pub fn dedupe_by<F>(records: Vec<AddressRecord>, key: F) -> Vec<AddressRecord>
where
    F: Fn(&AddressRecord) -> String,
{
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);

    let kept: Vec<AddressRecord> = records
        .into_iter()
        .filter(|record| seen.insert(key(record)))
        .collect();

    info!(
        "Deduplicated {} records down to {} ({} duplicates removed)",
        before,
        kept.len(),
        before - kept.len()
    );

    kept
}

/// Deduplicate on the all-fields key
pub fn dedupe(records: Vec<AddressRecord>) -> Vec<AddressRecord> {
    dedupe_by(records, dedup_key)
}
