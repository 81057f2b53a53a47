//! I/O utilities for the persisted tables

pub mod parquet;

pub use parquet::{
    DEFAULT_BATCH_SIZE, TableLocation, find_parquet_files, load_parquet_files_parallel,
    locate_table, read_parquet,
};
