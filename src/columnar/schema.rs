//! Arrow schemas for the address and matched-pair tables.

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{AddressRecord, MatchedPair};

/// Rows that can be written as an Arrow record batch
pub trait ColumnarRows: Sized {
    fn schema() -> SchemaRef;
    fn to_batch(rows: &[Self]) -> Result<RecordBatch>;
}

/// Optional string columns of the address table, in output order
pub const ADDRESS_TEXT_COLUMNS: [&str; 15] = [
    "osm_type",
    "unit",
    "flats",
    "house_name",
    "house_number",
    "substreet",
    "thoroughfare",
    "parentstreet",
    "suburb",
    "city_like",
    "district",
    "county",
    "postcode",
    "building",
    "name",
];

pub fn address_schema() -> SchemaRef {
    let mut fields = vec![Field::new("source_id", DataType::Utf8, false)];
    fields.extend(
        ADDRESS_TEXT_COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true)),
    );
    fields.push(Field::new("latitude", DataType::Float64, false));
    fields.push(Field::new("longitude", DataType::Float64, false));
    fields.push(Field::new("full_address", DataType::Utf8, true));
    Arc::new(Schema::new(fields))
}

pub fn matched_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id_a", DataType::Utf8, false),
        Field::new("id_b", DataType::Utf8, false),
        Field::new("full_address_a", DataType::Utf8, true),
        Field::new("full_address_b", DataType::Utf8, true),
        Field::new("postcode_a", DataType::Utf8, true),
        Field::new("postcode_b", DataType::Utf8, true),
        Field::new("lat_a", DataType::Float64, false),
        Field::new("lon_a", DataType::Float64, false),
        Field::new("lat_b", DataType::Float64, false),
        Field::new("lon_b", DataType::Float64, false),
        Field::new("distance_meters", DataType::Float64, false),
    ]))
}

/// Value of one of [`ADDRESS_TEXT_COLUMNS`] for a record
pub(crate) fn address_text(record: &AddressRecord, column: &str) -> Option<String> {
    let value = match column {
        "osm_type" => return record.osm_type.map(|t| t.to_string()),
        "unit" => &record.unit,
        "flats" => &record.flats,
        "house_name" => &record.house_name,
        "house_number" => &record.house_number,
        "substreet" => &record.substreet,
        "thoroughfare" => &record.thoroughfare,
        "parentstreet" => &record.parentstreet,
        "suburb" => &record.suburb,
        "city_like" => &record.city_like,
        "district" => &record.district,
        "county" => &record.county,
        "postcode" => &record.postcode,
        "building" => &record.building,
        "name" => &record.name,
        _ => return None,
    };
    value.clone()
}

/// Set one of [`ADDRESS_TEXT_COLUMNS`] on a record
pub(crate) fn set_address_text(record: &mut AddressRecord, column: &str, value: Option<String>) {
    let slot = match column {
        "osm_type" => {
            record.osm_type = value.and_then(|v| v.parse().ok());
            return;
        }
        "unit" => &mut record.unit,
        "flats" => &mut record.flats,
        "house_name" => &mut record.house_name,
        "house_number" => &mut record.house_number,
        "substreet" => &mut record.substreet,
        "thoroughfare" => &mut record.thoroughfare,
        "parentstreet" => &mut record.parentstreet,
        "suburb" => &mut record.suburb,
        "city_like" => &mut record.city_like,
        "district" => &mut record.district,
        "county" => &mut record.county,
        "postcode" => &mut record.postcode,
        "building" => &mut record.building,
        "name" => &mut record.name,
        _ => return,
    };
    *slot = value;
}

fn strings<'a>(values: impl Iterator<Item = Option<&'a str>>) -> ArrayRef {
    Arc::new(values.collect::<StringArray>())
}

fn floats(values: impl Iterator<Item = f64>) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(values))
}

impl ColumnarRows for AddressRecord {
    fn schema() -> SchemaRef {
        address_schema()
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(ADDRESS_TEXT_COLUMNS.len() + 4);
        columns.push(strings(rows.iter().map(|r| Some(r.source_id.as_str()))));

        for column in ADDRESS_TEXT_COLUMNS {
            let values: Vec<Option<String>> =
                rows.iter().map(|r| address_text(r, column)).collect();
            columns.push(strings(values.iter().map(|v| v.as_deref())));
        }

        columns.push(floats(rows.iter().map(|r| r.latitude)));
        columns.push(floats(rows.iter().map(|r| r.longitude)));
        columns.push(strings(rows.iter().map(|r| r.full_address.as_deref())));

        Ok(RecordBatch::try_new(address_schema(), columns)?)
    }
}

impl ColumnarRows for MatchedPair {
    fn schema() -> SchemaRef {
        matched_schema()
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            strings(rows.iter().map(|r| Some(r.id_a.as_str()))),
            strings(rows.iter().map(|r| Some(r.id_b.as_str()))),
            strings(rows.iter().map(|r| r.full_address_a.as_deref())),
            strings(rows.iter().map(|r| r.full_address_b.as_deref())),
            strings(rows.iter().map(|r| r.postcode_a.as_deref())),
            strings(rows.iter().map(|r| r.postcode_b.as_deref())),
            floats(rows.iter().map(|r| r.lat_a)),
            floats(rows.iter().map(|r| r.lon_a)),
            floats(rows.iter().map(|r| r.lat_b)),
            floats(rows.iter().map(|r| r.lon_b)),
            floats(rows.iter().map(|r| r.distance_meters)),
        ];

        Ok(RecordBatch::try_new(matched_schema(), columns)?)
    }
}
