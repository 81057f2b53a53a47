//! Logging utilities
//!
//! Consistent log lines for file operations and query execution.

use std::path::Path;
use std::time::Duration;

/// Log the start of an operation on a file or directory
pub fn log_operation_start(operation: &str, path: &Path) {
    log::debug!("{} {}", operation, path.display());
}

/// Log the completion of an operation on a file or directory
///
/// # Arguments
/// * `operation` - Past-tense verb for what happened
/// * `path` - File or directory that was operated on
/// * `items` - Number of items produced
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    items: usize,
    elapsed: Option<Duration>,
) {
    match elapsed {
        Some(duration) => log::debug!(
            "Successfully {operation} {items} items from {} in {duration:?}",
            path.display()
        ),
        None => log::debug!("Successfully {operation} {items} items from {}", path.display()),
    }
}

/// Log a warning, optionally tied to a path
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}

/// Log a finished query with its parameters and result size
pub fn log_query(name: &str, parameters: &str, rows: usize, elapsed: Duration) {
    log::debug!("{name}({parameters}) returned {rows} rows in {elapsed:?}");
}
