//! Utility functions shared by the stores, the query engine and the binary

pub mod arrow;
pub mod io;
pub mod logging;

pub use io::{DEFAULT_BATCH_SIZE, TableLocation, locate_table, read_parquet};
