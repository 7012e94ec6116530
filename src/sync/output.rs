use serde::Serialize;
use std::path::PathBuf;

/// JSON output mode for machine-readable sync events
/// Uses NDJSON format (newline-delimited JSON)
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    Start {
        source: PathBuf,
        destination: PathBuf,
        mode: String,
        dry_run: bool,
    },
    Mkdir {
        path: PathBuf,
    },
    Create {
        path: PathBuf,
        bytes_transferred: u64,
    },
    Update {
        path: PathBuf,
        bytes_transferred: u64,
    },
    Skip {
        path: PathBuf,
    },
    Delete {
        path: PathBuf,
    },
    Rmdir {
        path: PathBuf,
    },
    Warning {
        path: PathBuf,
        operation: String,
        error: String,
    },
    Summary {
        dirs_created: usize,
        files_created: usize,
        files_updated: usize,
        files_skipped: usize,
        files_deleted: usize,
        dirs_deleted: usize,
        bytes_transferred: u64,
        warnings: usize,
        duration_secs: f64,
    },
}

impl SyncEvent {
    /// Emit this event as JSON to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }
}
