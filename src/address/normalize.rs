use crate::models::AddressRecord;

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Join the non-empty parts with `sep`, skipping absent ones entirely.
fn join_present<'a>(parts: impl IntoIterator<Item = Option<&'a str>>, sep: &str) -> String {
    parts.into_iter().flatten().collect::<Vec<_>>().join(sep)
}

/// Human readable address line.
///
/// Segments, in order: name, unit, "house_name house_number thoroughfare",
/// suburb, city, county. Segments are joined with ", " and empty ones are
/// dropped along with their separator. Postcode is deliberately not part of
/// the display string.
pub fn display_address(record: &AddressRecord) -> Option<String> {
    let street_part = join_present(
        [
            present(&record.house_name),
            present(&record.house_number),
            present(&record.thoroughfare),
        ],
        " ",
    );

    let full = join_present(
        [
            present(&record.name),
            present(&record.unit),
            Some(street_part.as_str()).filter(|s| !s.is_empty()),
            present(&record.suburb),
            present(&record.city_like),
            present(&record.county),
        ],
        ", ",
    );

    if full.is_empty() {
        None
    } else {
        Some(full)
    }
}

/// Distinctness key built from every structured field.
///
/// Fields are space-joined with absent values rendered as "", so two rows
/// collide only when every field matches exactly.
pub fn dedup_key(record: &AddressRecord) -> String {
    [
        &record.unit,
        &record.flats,
        &record.house_name,
        &record.house_number,
        &record.substreet,
        &record.thoroughfare,
        &record.parentstreet,
        &record.suburb,
        &record.city_like,
        &record.postcode,
    ]
    .iter()
    .map(|field| field.as_deref().unwrap_or(""))
    .collect::<Vec<_>>()
    .join(" ")
}
