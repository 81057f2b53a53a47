//! Utilities for working with Arrow arrays
//!
//! Column access by name with typed downcasts, and the whole-column
//! reductions used by range discovery and dimension lookups.

use std::collections::BTreeSet;

use arrow::array::{Array, ArrayRef, Int32Array, StringArray};
use arrow::compute::{max, min};
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};

/// Downcast an array reference to a specific array type
///
/// # Errors
/// `InvalidDataType` when the array is not an `A`
pub fn downcast_array<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    column_name: &str,
    expected_type_name: &str,
) -> Result<&'a A> {
    array
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| {
            Error::InvalidDataType {
                column: column_name.to_string(),
                expected: expected_type_name.to_string(),
            }
            .into()
        })
}

/// Get a column from a record batch by name
///
/// # Errors
/// `ColumnNotFound` when the batch has no such column
pub fn get_column_by_name<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<&'a ArrayRef> {
    batch.column_by_name(column_name).ok_or_else(|| {
        Error::ColumnNotFound {
            column: column_name.to_string(),
        }
        .into()
    })
}

/// `(min, max)` of an `Int32` column across batches, ignoring nulls
///
/// Returns `None` when there are no non-null values.
pub fn int32_range(batches: &[RecordBatch], column_name: &str) -> Result<Option<(i32, i32)>> {
    let mut range: Option<(i32, i32)> = None;
    for batch in batches {
        let column = get_column_by_name(batch, column_name)?;
        let values = downcast_array::<Int32Array>(column, column_name, "Int32")?;
        if let (Some(lo), Some(hi)) = (min(values), max(values)) {
            range = Some(match range {
                Some((cur_lo, cur_hi)) => (cur_lo.min(lo), cur_hi.max(hi)),
                None => (lo, hi),
            });
        }
    }
    Ok(range)
}

/// Distinct non-null values of a `Utf8` column across batches
pub fn distinct_strings(batches: &[RecordBatch], column_name: &str) -> Result<BTreeSet<String>> {
    let mut values = BTreeSet::new();
    for batch in batches {
        let column = get_column_by_name(batch, column_name)?;
        let strings = downcast_array::<StringArray>(column, column_name, "Utf8")?;
        values.extend(strings.iter().flatten().map(str::to_string));
    }
    Ok(values)
}

/// Distinct non-null values of an `Int32` column across batches
pub fn distinct_int32(batches: &[RecordBatch], column_name: &str) -> Result<BTreeSet<i32>> {
    let mut values = BTreeSet::new();
    for batch in batches {
        let column = get_column_by_name(batch, column_name)?;
        let ints = downcast_array::<Int32Array>(column, column_name, "Int32")?;
        values.extend(ints.iter().flatten());
    }
    Ok(values)
}
