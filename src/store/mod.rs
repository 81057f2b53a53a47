//! Read-only access to the loader's output
//!
//! The relational tables live in memory as Arrow record batches after a
//! one-time load from Parquet. The drug poisoning document is deserialized
//! once from XML. Both are injected into the query engine through the
//! traits defined here and in [`document`].

pub mod document;
pub mod lookup;
pub mod rows;

use std::time::Instant;

use arrow::record_batch::RecordBatch;
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::config::ExplorerConfig;
use crate::error::{Error, Result};
use crate::filter::{BatchFilter, Expr, ExpressionFilter, filter_batches};
use crate::schema::{Table, adapt_record_batch, check_table_schema};
use crate::utils::io::{TableLocation, locate_table};

pub use document::{DocumentStore, DrugPoisoningDocument, DrugPoisoningStatistic};
pub use rows::{TableRow, decode_rows, encode_rows, scan_rows};

/// Parameterized read access to the relational tables
pub trait RelationalStore: Send + Sync {
    /// Rows of `table` that satisfy `filter`, in storage order
    fn scan(&self, table: Table, filter: Option<&Expr>) -> Result<Vec<RecordBatch>>;
}

/// In-memory relational store keyed by table
#[derive(Debug, Default, Clone)]
pub struct TableStore {
    tables: FxHashMap<Table, Vec<RecordBatch>>,
}

impl TableStore {
    /// Load every table from the configured data directory
    ///
    /// # Errors
    /// `StoreUnavailable` when a table is missing from the directory, is not
    /// readable Parquet, or lacks a declared column.
    pub fn open(config: &ExplorerConfig) -> Result<Self> {
        let start = Instant::now();
        crate::error::util::validate_directory(&config.data_dir, "relational store")?;

        let locations = Table::ALL
            .iter()
            .map(|&table| {
                locate_table(&config.data_dir, table.name())
                    .map(|location| (table, location))
                    .ok_or_else(|| {
                        Error::store_unavailable(
                            config.data_dir.join(format!("{}.parquet", table.name())),
                            format!("table {table} not found"),
                        )
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let load = |(table, location): &(Table, TableLocation)| {
            load_table(*table, location, config.batch_size).map(|batches| (*table, batches))
        };
        let loaded: Vec<(Table, Vec<RecordBatch>)> = if config.parallel_load {
            locations.par_iter().map(load).collect::<Result<_>>()?
        } else {
            locations.iter().map(load).collect::<Result<_>>()?
        };

        let store = Self {
            tables: loaded.into_iter().collect(),
        };
        log::info!(
            "Loaded {} tables ({} rows) from {} in {:?}",
            store.tables.len(),
            Table::ALL.iter().map(|&t| store.row_count(t)).sum::<usize>(),
            config.data_dir.display(),
            start.elapsed()
        );
        Ok(store)
    }

    /// Build a store from batches already in memory
    ///
    /// Batches are projected and cast to each table's declared schema.
    /// Tables not supplied are absent and scanning them is an error.
    pub fn from_batches(
        tables: impl IntoIterator<Item = (Table, Vec<RecordBatch>)>,
    ) -> Result<Self> {
        let mut store = Self::default();
        for (table, batches) in tables {
            let adapted = batches
                .iter()
                .map(|batch| adapt_record_batch(table, batch))
                .collect::<Result<Vec<_>>>()?;
            store.tables.entry(table).or_default().extend(adapted);
        }
        Ok(store)
    }

    /// Build a store from typed rows, one call per table
    pub fn with_rows<R: TableRow>(mut self, rows: &[R]) -> Result<Self> {
        let batch = encode_rows(rows)?;
        let batch = adapt_record_batch(R::TABLE, &batch)?;
        self.tables.entry(R::TABLE).or_default().push(batch);
        Ok(self)
    }

    /// Number of rows held for `table`
    #[must_use]
    pub fn row_count(&self, table: Table) -> usize {
        self.tables
            .get(&table)
            .map_or(0, |batches| batches.iter().map(RecordBatch::num_rows).sum())
    }
}

impl RelationalStore for TableStore {
    fn scan(&self, table: Table, filter: Option<&Expr>) -> Result<Vec<RecordBatch>> {
        let batches = self
            .tables
            .get(&table)
            .ok_or_else(|| Error::MissingTable {
                table: table.name().to_string(),
            })?;

        let Some(expr) = filter else {
            return Ok(batches.clone());
        };

        let filter = ExpressionFilter::new(expr.clone());
        let schema = table.schema();
        if let Some(column) = filter
            .required_columns()
            .into_iter()
            .find(|column| schema.field_with_name(column).is_err())
        {
            return Err(Error::ColumnNotFound {
                column: format!("{table}.{column}"),
            }
            .into());
        }

        filter_batches(batches, &filter)
    }
}

fn load_table(
    table: Table,
    location: &TableLocation,
    batch_size: usize,
) -> Result<Vec<RecordBatch>> {
    let schema = table.schema();
    let batches = location.read(Some(schema.as_ref()), batch_size)?;

    let mut adapted = Vec::with_capacity(batches.len());
    for batch in &batches {
        let report = check_table_schema(table, batch.schema().as_ref());
        if let Some(issue) = report.issues.first() {
            return Err(Error::store_unavailable(location.path(), issue.description.clone()).into());
        }
        adapted.push(adapt_record_batch(table, batch)?);
    }

    log::debug!(
        "Table {} loaded with {} rows",
        table,
        adapted.iter().map(RecordBatch::num_rows).sum::<usize>()
    );
    Ok(adapted)
}
