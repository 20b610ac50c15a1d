//! Error types for flag store backends.

use thiserror::Error;

/// Errors that can occur reading or writing flags.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem read/write failure.
    #[error("flag store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// On-disk contents were not a valid flag map.
    #[error("flag store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
