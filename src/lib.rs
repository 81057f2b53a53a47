//! Exploration of four NCHS public-health datasets.
//!
//! Three datasets live as Parquet tables in a relational store, the fourth
//! as an XML document. Seven fixed analytical queries run over them, with
//! parameters validated against the years, states and questions the
//! stores actually contain.

pub mod app;
pub mod config;
pub mod error;
pub mod filter;
pub mod query;
pub mod schema;
pub mod store;
pub mod utils;

// Core types
pub use config::ExplorerConfig;
pub use error::{Error, Result};
pub use query::{ChronicDiseaseParams, QueryEngine, ResultRow, ResultSet};
pub use schema::{SchemaCompatibilityReport, SchemaIssue, Table};
pub use store::{DocumentStore, DrugPoisoningDocument, RelationalStore, TableStore};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;

// Filtering capabilities
pub use filter::{Expr, LiteralValue};

// Utility functions
pub use utils::{DEFAULT_BATCH_SIZE, read_parquet};
