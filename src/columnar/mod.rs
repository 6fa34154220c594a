//! Parquet persistence for address and matched-pair tables.

mod reader;
mod schema;
mod writer;

pub use reader::{read_addresses, read_reference};
pub use schema::{address_schema, matched_schema, ColumnarRows, ADDRESS_TEXT_COLUMNS};
pub use writer::{write_parquet, DEFAULT_BATCH_SIZE};
