//! Utility functions for error handling
//!
//! Path checks used when opening the stores. Every failure here is a
//! `StoreUnavailable`, since nothing can be queried without the files.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Safely open a file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
/// * `purpose` - Why the file is being opened (for error context)
pub fn safe_open_file(path: &Path, purpose: &str) -> Result<fs::File> {
    if !path.exists() {
        return Err(Error::store_unavailable(path, format!("file not found (needed for {purpose})")).into());
    }

    if !path.is_file() {
        return Err(Error::store_unavailable(path, format!("not a file (expected one for {purpose})")).into());
    }

    fs::File::open(path).map_err(|e| {
        let reason = match e.kind() {
            io::ErrorKind::PermissionDenied => "permission denied - check file permissions".to_string(),
            _ => format!("failed to open file for {purpose}: {e}"),
        };
        Error::store_unavailable(path, reason).into()
    })
}

/// Check if a directory exists and is readable, with rich error information
pub fn validate_directory(path: &Path, purpose: &str) -> Result<()> {
    if !path.exists() {
        return Err(Error::store_unavailable(path, format!("directory not found (needed for {purpose})")).into());
    }

    if !path.is_dir() {
        return Err(Error::store_unavailable(path, format!("not a directory (expected one for {purpose})")).into());
    }

    match fs::read_dir(path) {
        Ok(_) => Ok(()),
        Err(e) => {
            let reason = match e.kind() {
                io::ErrorKind::PermissionDenied => {
                    "permission denied - check directory permissions".to_string()
                }
                _ => format!("failed to access directory for {purpose}: {e}"),
            };
            Err(Error::store_unavailable(path, reason).into())
        }
    }
}
