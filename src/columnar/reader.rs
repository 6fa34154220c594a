use arrow::array::{Array, ArrayRef, AsArray, Float64Array, StringArray};
use arrow::compute::{can_cast_types, cast};
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

use super::schema::{set_address_text, ADDRESS_TEXT_COLUMNS};
use super::writer::DEFAULT_BATCH_SIZE;
use crate::address::strip_postcode;
use crate::config::ReferenceColumns;
use crate::error::{PipelineError, Result};
use crate::models::AddressRecord;

fn open_parquet(path: &Path) -> Result<ParquetRecordBatchReader> {
    if !path.exists() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build()?)
}

fn cast_column(batch: &RecordBatch, name: &str, to: &DataType) -> Result<Option<ArrayRef>> {
    let Some(array) = batch.column_by_name(name) else {
        return Ok(None);
    };
    if !can_cast_types(array.data_type(), to) {
        return Err(PipelineError::ColumnType {
            column: name.to_string(),
            data_type: array.data_type().to_string(),
        });
    }
    Ok(Some(cast(array, to)?))
}

/// String view of a column, casting numbers (e.g. integer ids) to text
fn optional_text(batch: &RecordBatch, name: &str) -> Result<Option<StringArray>> {
    Ok(cast_column(batch, name, &DataType::Utf8)?.map(|a| a.as_string::<i32>().clone()))
}

fn required_text(batch: &RecordBatch, name: &str) -> Result<StringArray> {
    optional_text(batch, name)?.ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
}

fn required_float(batch: &RecordBatch, name: &str) -> Result<Float64Array> {
    cast_column(batch, name, &DataType::Float64)?
        .map(|a| a.as_primitive::<Float64Type>().clone())
        .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
}

fn text_at(array: &StringArray, i: usize) -> Option<String> {
    if array.is_null(i) {
        None
    } else {
        Some(array.value(i).to_string())
    }
}

fn float_at(array: &Float64Array, i: usize) -> Option<f64> {
    if array.is_null(i) {
        None
    } else {
        Some(array.value(i))
    }
}

/// Read an address table written by [`super::write_parquet`].
///
/// Only `source_id`, `latitude` and `longitude` are required; missing
/// optional columns read as nulls. Rows without coordinates are skipped.
pub fn read_addresses(path: &Path) -> Result<Vec<AddressRecord>> {
    info!("Reading address table {}", path.display());

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for batch in open_parquet(path)? {
        let batch = batch?;
        let ids = required_text(&batch, "source_id")?;
        let lats = required_float(&batch, "latitude")?;
        let lons = required_float(&batch, "longitude")?;
        let full = optional_text(&batch, "full_address")?;
        let texts = ADDRESS_TEXT_COLUMNS
            .iter()
            .map(|c| Ok((*c, optional_text(&batch, c)?)))
            .collect::<Result<Vec<_>>>()?;

        for i in 0..batch.num_rows() {
            let (Some(id), Some(lat), Some(lon)) =
                (text_at(&ids, i), float_at(&lats, i), float_at(&lons, i))
            else {
                skipped += 1;
                continue;
            };

            let mut record = AddressRecord::new(id, lat, lon);
            for (column, array) in &texts {
                if let Some(array) = array {
                    set_address_text(&mut record, column, text_at(array, i));
                }
            }
            record.full_address = full.as_ref().and_then(|a| text_at(a, i));
            records.push(record);
        }
    }

    if skipped > 0 {
        warn!("Skipped {} rows without id or coordinates", skipped);
    }
    info!("Loaded {} address records", records.len());
    Ok(records)
}

/// Read the authoritative address table using the configured column names.
///
/// Returns the records and the number of rows skipped for a missing id or
/// coordinate.
pub fn read_reference(
    path: &Path,
    columns: &ReferenceColumns,
    strip_postcodes: bool,
) -> Result<(Vec<AddressRecord>, usize)> {
    info!("Reading reference table {}", path.display());

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for batch in open_parquet(path)? {
        let batch = batch?;
        let ids = required_text(&batch, &columns.id)?;
        let addresses = required_text(&batch, &columns.full_address)?;
        let postcodes = optional_text(&batch, &columns.postcode)?;
        let lats = required_float(&batch, &columns.latitude)?;
        let lons = required_float(&batch, &columns.longitude)?;

        for i in 0..batch.num_rows() {
            let (Some(id), Some(lat), Some(lon)) =
                (text_at(&ids, i), float_at(&lats, i), float_at(&lons, i))
            else {
                skipped += 1;
                continue;
            };

            let mut record = AddressRecord::new(id, lat, lon);
            record.postcode = postcodes.as_ref().and_then(|a| text_at(a, i));
            record.full_address = text_at(&addresses, i)
                .map(|address| {
                    if strip_postcodes {
                        strip_postcode(&address, record.postcode.as_deref())
                    } else {
                        address
                    }
                })
                .filter(|a| !a.is_empty());
            records.push(record);
        }
    }

    if skipped > 0 {
        warn!("Skipped {} reference rows without id or coordinates", skipped);
    }
    info!("Loaded {} reference records", records.len());
    Ok((records, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columnar::write_parquet;
    use crate::models::OsmType;
    use arrow::array::Int64Array;
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;
    use std::sync::Arc;

    #[test]
    fn test_address_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("addresses.parquet");

        let mut full = AddressRecord::new(
            "way/123456789",
            51.507_350_912_345_67,
            -0.127_758_123_456_789,
        );
        full.osm_type = Some(OsmType::Way);
        full.unit = Some("Flat 3".to_string());
        full.flats = Some("1-6".to_string());
        full.house_name = Some("Tŷ Gwyn".to_string());
        full.house_number = Some("12a".to_string());
        full.substreet = Some("Back Lane".to_string());
        full.thoroughfare = Some("Long Street With A Name That Must Not Be Truncated".to_string());
        full.parentstreet = Some("Main Road".to_string());
        full.suburb = Some("Canton".to_string());
        full.city_like = Some("Cardiff".to_string());
        full.district = Some("Cardiff".to_string());
        full.county = Some("South Glamorgan".to_string());
        full.postcode = Some("CF11 9AA".to_string());
        full.building = Some("apartments".to_string());
        full.name = Some("Riverside Court".to_string());
        full.full_address = crate::address::display_address(&full);

        let sparse = AddressRecord::new("node/1", -89.999_999_999, 179.999_999_999);

        let rows = vec![full, sparse];
        write_parquet(&path, &rows).unwrap();
        let back = read_addresses(&path).unwrap();

        assert_eq!(back, rows);
        assert_eq!(back[0].latitude.to_bits(), rows[0].latitude.to_bits());
    }

    #[test]
    fn test_missing_input() {
        let err = read_addresses(Path::new("/nonexistent/all_uk_addresses_osm.parquet"));
        assert!(matches!(err, Err(PipelineError::MissingInput(_))));
    }

    fn write_reference(path: &Path) {
        let schema = Arc::new(Schema::new(vec![
            Field::new("uprn", DataType::Int64, false),
            Field::new("fulladdress", DataType::Utf8, true),
            Field::new("postcode", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(vec![100023336956, 200, 300])),
            Arc::new(StringArray::from(vec![
                Some("10 DOWNING STREET, LONDON, SW1A 2AA"),
                Some("1 HIGH STREET, LEEDS, LS1 1AA"),
                None,
            ])),
            Arc::new(StringArray::from(vec![Some("SW1A 2AA"), Some("LS1 1AA"), None])),
            Arc::new(Float64Array::from(vec![Some(51.5034), None, Some(53.8)])),
            Arc::new(Float64Array::from(vec![Some(-0.1276), Some(-1.5), Some(-1.5)])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let mut writer =
            ArrowWriter::try_new(File::create(path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_read_reference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("os.parquet");
        write_reference(&path);

        let (records, skipped) =
            read_reference(&path, &ReferenceColumns::default(), true).unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_id, "100023336956");
        assert_eq!(
            records[0].full_address.as_deref(),
            Some("10 DOWNING STREET, LONDON")
        );
        assert_eq!(records[0].postcode.as_deref(), Some("SW1A 2AA"));
        assert_eq!(records[1].source_id, "300");
        assert_eq!(records[1].full_address, None);
    }

    #[test]
    fn test_reference_column_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("os.parquet");
        write_reference(&path);

        let columns = ReferenceColumns {
            id: "UPRN".to_string(),
            ..ReferenceColumns::default()
        };
        assert!(matches!(
            read_reference(&path, &columns, false),
            Err(PipelineError::MissingColumn(c)) if c == "UPRN"
        ));
    }
}
