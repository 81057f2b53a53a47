//! Parquet file operations
//!
//! Reading the loader's Parquet output into Arrow record batches. A table
//! is either a single `<Table>.parquet` file or a directory of parts.

use std::path::{Path, PathBuf};

use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use rayon::prelude::*;

use crate::error::util::{safe_open_file, validate_directory};
use crate::error::{Error, Result};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Helper for creating projection mask from schema
///
/// # Returns
/// A projection mask over the leaves of `file_schema` that appear in
/// `schema`, or `None` when nothing matched and every column should be read
#[must_use]
pub fn create_projection(
    schema: &Schema,
    file_schema: &Schema,
    parquet_schema: &parquet::schema::types::SchemaDescriptor,
) -> Option<ProjectionMask> {
    let projection = schema
        .fields()
        .iter()
        .filter_map(|f| {
            let field_name = f.name();
            file_schema.index_of(field_name).map_or_else(
                |_| {
                    log_warning(
                        &format!("Field {field_name} not found in parquet file, skipping"),
                        None,
                    );
                    None
                },
                Some,
            )
        })
        .sorted()
        .collect_vec();

    if projection.is_empty() {
        log_warning(
            "No matching fields found in schema projection, reading all columns",
            None,
        );
        None
    } else {
        Some(ProjectionMask::roots(parquet_schema, projection))
    }
}

/// Read a parquet file into Arrow record batches
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `schema` - Optional Arrow Schema for projecting specific columns
/// * `batch_size` - Rows per decoded batch
pub fn read_parquet(
    path: &Path,
    schema: Option<&Schema>,
    batch_size: usize,
) -> Result<Vec<RecordBatch>> {
    let start = std::time::Instant::now();
    log_operation_start("Reading parquet file", path);

    let file = safe_open_file(path, "relational table")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| {
        Error::store_unavailable(path, format!("not a readable parquet file: {e}"))
    })?;

    let projection = schema.and_then(|schema| {
        create_projection(schema, builder.schema(), builder.parquet_schema())
    });
    let builder = match projection {
        Some(mask) => builder.with_projection(mask),
        None => builder,
    };

    let reader = builder
        .with_batch_size(batch_size)
        .build()
        .map_err(|e| Error::store_unavailable(path, format!("failed to build parquet reader: {e}")))?;

    let batches = reader
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::store_unavailable(path, format!("failed to read record batch: {e}")))?;

    log_operation_complete("read", path, batches.len(), Some(start.elapsed()));
    Ok(batches)
}

/// Find all Parquet files in a directory, sorted by file name so parts
/// keep their storage order
pub fn find_parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    log_operation_start("Searching for parquet files in", dir);
    validate_directory(dir, "parquet parts")?;

    let parquet_files = std::fs::read_dir(dir)
        .map_err(|e| Error::store_unavailable(dir, format!("failed to read directory: {e}")))?
        .filter_map(|entry_result| match entry_result {
            Ok(entry) => {
                let path = entry.path();
                (path.is_file() && path.extension().is_some_and(|ext| ext == "parquet"))
                    .then_some(Ok(path))
            }
            Err(e) => Some(Err(Error::store_unavailable(
                dir,
                format!("failed to read directory entry: {e}"),
            ))),
        })
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .sorted()
        .collect_vec();

    if parquet_files.is_empty() {
        log_warning("No Parquet files found in directory", Some(dir));
    } else {
        log_operation_complete("found", dir, parquet_files.len(), None);
    }

    Ok(parquet_files)
}

/// Load every part of a table directory in parallel, preserving part order
pub fn load_parquet_files_parallel(
    dir: &Path,
    schema: Option<&Schema>,
    batch_size: usize,
) -> Result<Vec<RecordBatch>> {
    let parquet_files = find_parquet_files(dir)?;
    if parquet_files.is_empty() {
        return Ok(Vec::new());
    }

    let all_batches: Vec<Result<Vec<RecordBatch>>> = parquet_files
        .par_iter()
        .map(|path| read_parquet(path, schema, batch_size))
        .collect();

    let mut combined_batches = Vec::new();
    for result in all_batches {
        combined_batches.extend(result?);
    }

    log::info!(
        "Successfully loaded {} batches from {} Parquet files",
        combined_batches.len(),
        parquet_files.len()
    );

    Ok(combined_batches)
}

/// Locate a table's storage under `data_dir`
///
/// Returns the single-file form when present, otherwise the parts
/// directory, otherwise `None`.
#[must_use]
pub fn locate_table(data_dir: &Path, table_name: &str) -> Option<TableLocation> {
    let file = data_dir.join(format!("{table_name}.parquet"));
    if file.is_file() {
        return Some(TableLocation::File(file));
    }
    let dir = data_dir.join(table_name);
    dir.is_dir().then_some(TableLocation::Parts(dir))
}

/// Where a table's Parquet data lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLocation {
    File(PathBuf),
    Parts(PathBuf),
}

impl TableLocation {
    /// Read the table into batches
    pub fn read(&self, schema: Option<&Schema>, batch_size: usize) -> Result<Vec<RecordBatch>> {
        match self {
            Self::File(path) => read_parquet(path, schema, batch_size),
            Self::Parts(dir) => load_parquet_files_parallel(dir, schema, batch_size),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) | Self::Parts(path) => path,
        }
    }
}
