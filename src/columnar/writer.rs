use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::path::Path;
use tempfile::Builder;
use tracing::info;

use super::schema::ColumnarRows;
use crate::error::{PipelineError, Result};

/// Rows per record batch / row group chunk
pub const DEFAULT_BATCH_SIZE: usize = 65_536;

fn writer_properties() -> Result<WriterProperties> {
    Ok(WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::try_new(3)?))
        .build())
}

/// Write `rows` to a Parquet file at `path`.
///
/// Data goes to a temporary file next to `path` that is renamed into place
/// only after the footer is written, so a failed run never leaves a file that
/// looks complete.
pub fn write_parquet<T: ColumnarRows>(path: &Path, rows: &[T]) -> Result<usize> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = Builder::new()
        .prefix(".addr-bench-")
        .suffix(".parquet.tmp")
        .tempfile_in(dir)
        .map_err(|e| PipelineError::io(dir, e))?;

    {
        let mut writer =
            ArrowWriter::try_new(tmp.as_file_mut(), T::schema(), Some(writer_properties()?))?;

        if rows.is_empty() {
            writer.write(&T::to_batch(rows)?)?;
        }
        for chunk in rows.chunks(DEFAULT_BATCH_SIZE) {
            writer.write(&T::to_batch(chunk)?)?;
        }
        writer.close()?;
    }

    tmp.as_file()
        .sync_all()
        .map_err(|e| PipelineError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| PipelineError::io(path, e.error))?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AddressRecord;

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        let rows = vec![AddressRecord::new("node/1", 51.5, -0.1)];

        assert_eq!(write_parquet(&path, &rows).unwrap(), 1);

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["out.parquet".to_string()]);
    }

    #[test]
    fn test_unwritable_destination_fails() {
        let path = Path::new("/nonexistent-dir/out.parquet");
        let rows: Vec<AddressRecord> = Vec::new();
        assert!(matches!(
            write_parquet(path, &rows),
            Err(PipelineError::Io { .. })
        ));
        assert!(!path.exists());
    }
}
