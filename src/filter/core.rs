//! Core filtering functionality for record batches
//!
//! Defines the `BatchFilter` trait the relational store applies to every
//! scanned table, and the mask application shared by all filters.

use std::collections::HashSet;

use anyhow::Context;
use arrow::array::{Array, ArrayRef, BooleanArray};
use arrow::compute::filter as arrow_filter;
use arrow::record_batch::RecordBatch;

use crate::error::{Error, Result};

/// Filter a record batch based on a boolean mask
///
/// Rows where the mask is false or null are dropped, which gives SQL
/// semantics for comparisons against null values.
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(Error::Filter(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        ))
        .into());
    }

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, mask))
        .collect::<arrow::error::Result<_>>()
        .with_context(|| "Failed to apply boolean filter to columns")?;

    RecordBatch::try_new(batch.schema(), filtered_columns)
        .with_context(|| "Failed to create filtered record batch")
}

/// Trait for objects that can filter record batches
pub trait BatchFilter: std::fmt::Debug {
    /// Filter a record batch
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch>;

    /// Returns the set of column names required by this filter
    fn required_columns(&self) -> HashSet<String>;
}

/// Apply a filter to every batch, dropping batches left empty
pub fn filter_batches(
    batches: &[RecordBatch],
    filter: &dyn BatchFilter,
) -> Result<Vec<RecordBatch>> {
    let mut kept = Vec::with_capacity(batches.len());
    for batch in batches {
        let filtered = filter.filter(batch)?;
        if filtered.num_rows() > 0 {
            kept.push(filtered);
        }
    }
    Ok(kept)
}
