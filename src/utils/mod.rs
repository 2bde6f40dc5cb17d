use std::path::PathBuf;
use which::which;

use crate::errors::{RestoreError, Result};

/// Finds the psql executable in the system PATH.
pub fn find_psql_executable() -> Result<PathBuf> {
    which("psql").map_err(|_| {
        RestoreError::Config(
            "psql executable not found in PATH. Please ensure PostgreSQL client tools are installed and in your PATH.".to_string(),
        )
    })
}

/// Finds the npm executable in the system PATH.
pub fn find_npm_executable() -> Result<PathBuf> {
    which("npm").map_err(|_| {
        RestoreError::Config(
            "npm executable not found in PATH. Please ensure Node.js is installed and in your PATH.".to_string(),
        )
    })
}
