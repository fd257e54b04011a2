use std::path::PathBuf;
use thiserror::Error;

/// Library error type for slideview operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured photo directory is invalid or unreadable.
    #[error("invalid photo directory: {0}")]
    BadDir(String),

    /// The scan completed but found no images.
    #[error("no images found in the scanned directory")]
    EmptyScan,

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// A decode attempt failed for one photo.
    #[error("decode failed for {path}: {kind}")]
    Decode { path: PathBuf, kind: DecodeErrorKind },

    /// The memory budget is smaller than one window's worth of payloads.
    /// Reported once; the cache degrades to in-window eviction rather than
    /// exceeding the budget.
    #[error("memory budget smaller than the active window")]
    CacheOverflow,
}

/// Why a single decode attempt failed. Recorded in the failed slot so the
/// caller can tell unreadable files apart from stuck I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("io: {0}")]
    Io(String),

    #[error("malformed image: {0}")]
    Malformed(String),

    #[error("decode timed out")]
    Timeout,
}
