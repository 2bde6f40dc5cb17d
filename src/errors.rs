use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot connect to database '{database}': {source}")]
    Connection {
        database: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Backup archive not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to decompress backup archive {}: {source}", .path.display())]
    CorruptArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed backup archive: {0}")]
    MalformedArchive(String),

    #[error("Failed to restore table '{table}': {reason}")]
    TableRestore { table: String, reason: String },

    #[error("Failed to restore web application files: {0}")]
    FileRestore(String),

    #[error("Failed to update web application configuration: {0}")]
    ConfigUpdate(String),

    #[error("Web application build failed: {0}")]
    Build(String),

    #[error("Cleanup failed: {0}")]
    Cleanup(String),

    #[error("Restoration cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RestoreError>;
