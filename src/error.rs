use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a sync before or at its top-level roots.
///
/// Failures below the roots are not errors: they are collected as
/// [`SyncWarning`](crate::sync::SyncWarning)s and the walk continues.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to read directory: {path}\nCause: {source}\nCheck that the directory exists and you have read permissions.")]
    ReadDirError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
