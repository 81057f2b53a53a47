//! Logging utilities for output and progress tracking
//!
//! Standardized log lines for store loading, a spinner for the load phase
//! and the plain-text table renderer used for query results.

pub mod console;
pub mod log;
pub mod progress;

pub use console::render_table;
pub use log::{log_operation_complete, log_operation_start, log_query, log_warning};
pub use progress::{create_spinner, finish_progress_bar};
