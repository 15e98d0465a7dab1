//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while parsing a single dump file.
///
/// Most of these are intentionally non-fatal at the call site (§7 of the
/// spec): the caller logs and skips rather than aborting the rebuild.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("cannot derive a timestamp from filename {0:?}")]
    BadFilename(std::path::PathBuf),

    #[error("unsupported compression suffix in {0:?}")]
    UnsupportedCompression(std::path::PathBuf),

    #[error("failed to read dump file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while aggregating a host's dumps into derived
/// structures.
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("host directory does not exist or is not readable: {0:?}")]
    MissingHostDir(std::path::PathBuf),
}

/// Errors that can occur while encoding or writing persisted records.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open store at {0:?}: {1}")]
    OpenFailed(std::path::PathBuf, sled::Error),

    #[error("store operation failed: {0}")]
    Sled(#[from] sled::Error),

    #[error("failed to serialize record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
