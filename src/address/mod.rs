//! Address normalization: display strings, distinctness keys and
//! deduplication.

mod dedupe;
mod normalize;
mod postcode;

pub use dedupe::{dedupe, dedupe_by};
pub use normalize::{dedup_key, display_address};
pub use postcode::strip_postcode;
