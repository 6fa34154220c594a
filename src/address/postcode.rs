use regex::Regex;
use std::sync::OnceLock;

fn spaces() -> &'static Regex {
    static SPACES: OnceLock<Regex> = OnceLock::new();
    SPACES.get_or_init(|| Regex::new(r"\s{2,}").expect("whitespace pattern is valid"))
}

/// Remove every case-insensitive occurrence of `postcode` from `address`.
///
/// Authoritative addresses end with the postcode, which the derived side
/// never carries in its display string. Runs of whitespace left behind are
/// collapsed and trailing separators trimmed.
pub fn strip_postcode(address: &str, postcode: Option<&str>) -> String {
    let needle = match postcode.map(str::trim) {
        Some(pc) if !pc.is_empty() => pc.to_ascii_lowercase(),
        _ => return address.trim().to_string(),
    };

    // ASCII lowering keeps byte offsets aligned with `address`
    let haystack = address.to_ascii_lowercase();
    let mut stripped = String::with_capacity(address.len());
    let mut last = 0;
    for (start, matched) in haystack.match_indices(&needle) {
        stripped.push_str(&address[last..start]);
        last = start + matched.len();
    }
    stripped.push_str(&address[last..]);

    spaces()
        .replace_all(&stripped, " ")
        .trim()
        .trim_end_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}
