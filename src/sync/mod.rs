pub mod copy;
pub mod output;
pub mod prune;
pub mod scanner;
pub mod strategy;
pub mod structure;
pub mod transfer;

use crate::cli::SyncMode;
use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use output::SyncEvent;
use scanner::{DirEntry, DirScan};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use strategy::StrategyPlanner;
use transfer::Transferrer;

/// How an incremental copy treats the contents of subdirectories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubdirPolicy {
    /// Compare every file by mtime, at every depth
    #[default]
    Incremental,
    /// Force-copy everything below the top level (`--force-subdirs`)
    ForceCopy,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub dry_run: bool,
    pub preserve_times: bool,
    pub subdir_policy: SubdirPolicy,
    pub quiet: bool,
    pub json: bool,
}

/// The filesystem step a warning came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    CreateDir,
    Copy,
    SetPermissions,
    SetTimes,
    RemoveFile,
    RemoveDir,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list directory",
            Self::CreateDir => "create directory",
            Self::Copy => "copy file",
            Self::SetPermissions => "set permissions",
            Self::SetTimes => "set modification time",
            Self::RemoveFile => "remove file",
            Self::RemoveDir => "remove directory",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-entry failure that did not stop the walk
#[derive(Debug)]
pub struct SyncWarning {
    pub path: PathBuf,
    pub operation: Operation,
    pub error: io::Error,
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed for {}: {}",
            self.operation,
            self.path.display(),
            self.error
        )
    }
}

#[derive(Debug, Default)]
pub struct SyncStats {
    pub dirs_created: usize,
    pub files_created: usize,
    pub files_updated: usize,
    pub files_skipped: usize,
    pub files_deleted: usize,
    pub dirs_deleted: usize,
    pub bytes_transferred: u64,
    pub duration: Duration,
    pub warnings: Vec<SyncWarning>,
}

impl SyncStats {
    /// Fold the result of a later pass into this one
    pub fn merge(&mut self, other: SyncStats) {
        self.dirs_created += other.dirs_created;
        self.files_created += other.files_created;
        self.files_updated += other.files_updated;
        self.files_skipped += other.files_skipped;
        self.files_deleted += other.files_deleted;
        self.dirs_deleted += other.dirs_deleted;
        self.bytes_transferred += other.bytes_transferred;
        self.duration += other.duration;
        self.warnings.extend(other.warnings);
    }

    /// True if the run created, copied or deleted anything
    pub fn has_changes(&self) -> bool {
        self.dirs_created
            + self.files_created
            + self.files_updated
            + self.files_deleted
            + self.dirs_deleted
            > 0
    }
}

/// One tree walk over a (source, destination) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Structure,
    PruneFiles,
    PruneDirs,
    CopyAll,
    CopyNewAndUpdated,
}

fn passes(mode: SyncMode) -> &'static [Pass] {
    match mode {
        SyncMode::Mirror => &[
            Pass::Structure,
            Pass::PruneFiles,
            Pass::PruneDirs,
            Pass::CopyNewAndUpdated,
        ],
        SyncMode::Update => &[Pass::Structure, Pass::CopyNewAndUpdated],
        SyncMode::Copy => &[Pass::Structure, Pass::CopyAll],
        SyncMode::Structure => &[Pass::Structure],
        SyncMode::Prune => &[Pass::PruneFiles, Pass::PruneDirs],
    }
}

/// Runs the tree walks that mirror one directory onto another
///
/// Every walk is a synchronous depth-first recursion over the two trees in
/// lock-step by entry name. Only failing to list a root is an error; all
/// other failures become warnings in the returned [`SyncStats`].
pub struct SyncEngine {
    transferrer: Transferrer,
    planner: StrategyPlanner,
    subdir_policy: SubdirPolicy,
    json: bool,
    progress: ProgressBar,
}

impl SyncEngine {
    pub fn new(options: SyncOptions) -> Self {
        let progress = if options.quiet || options.json {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} entries {wide_msg}")
            {
                pb.set_style(style);
            }
            pb
        };

        Self {
            transferrer: Transferrer::new(options.dry_run, options.preserve_times),
            planner: StrategyPlanner::new(),
            subdir_policy: options.subdir_policy,
            json: options.json,
            progress,
        }
    }

    /// Run every pass of `mode` in order over the same pair of roots
    pub fn run(&self, mode: SyncMode, source: &Path, destination: &Path) -> Result<SyncStats> {
        let start = Instant::now();
        tracing::info!(
            "Starting {} sync: {} → {}",
            mode,
            source.display(),
            destination.display()
        );
        self.emit(SyncEvent::Start {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            mode: mode.to_string(),
            dry_run: self.transferrer.dry_run(),
        });

        let result = match mode {
            SyncMode::Mirror => self.sync(source, destination),
            other => self.run_passes(passes(other), source, destination),
        };
        self.progress.finish_and_clear();
        let mut stats = result?;
        stats.duration = start.elapsed();

        tracing::info!(
            "Sync complete: {} dirs created, {} created, {} updated, {} skipped, {} deleted, {} dirs removed, {} warnings",
            stats.dirs_created,
            stats.files_created,
            stats.files_updated,
            stats.files_skipped,
            stats.files_deleted,
            stats.dirs_deleted,
            stats.warnings.len()
        );
        self.emit(SyncEvent::Summary {
            dirs_created: stats.dirs_created,
            files_created: stats.files_created,
            files_updated: stats.files_updated,
            files_skipped: stats.files_skipped,
            files_deleted: stats.files_deleted,
            dirs_deleted: stats.dirs_deleted,
            bytes_transferred: stats.bytes_transferred,
            warnings: stats.warnings.len(),
            duration_secs: stats.duration.as_secs_f64(),
        });

        Ok(stats)
    }

    /// Full mirror: structure, prune files, prune directories, incremental copy
    pub fn sync(&self, source: &Path, destination: &Path) -> Result<SyncStats> {
        self.run_passes(passes(SyncMode::Mirror), source, destination)
    }

    fn run_passes(&self, passes: &[Pass], source: &Path, destination: &Path) -> Result<SyncStats> {
        let mut stats = SyncStats::default();
        let mut files_pruned = false;
        for pass in passes {
            tracing::debug!("Running pass {:?}", pass);
            let pass_stats = match pass {
                Pass::Structure => self.mirror_structure(source, destination)?,
                Pass::PruneFiles => {
                    files_pruned = true;
                    self.prune_missing_files(source, destination)?
                }
                Pass::PruneDirs => self.prune_dirs(source, destination, files_pruned)?,
                Pass::CopyAll => self.copy_all(source, destination)?,
                Pass::CopyNewAndUpdated => self.copy_new_and_updated(source, destination)?,
            };
            stats.merge(pass_stats);
        }
        Ok(stats)
    }

    /// Open a directory below one of the roots, downgrading failure to a warning
    fn open_nested(&self, path: &Path, stats: &mut SyncStats) -> Option<DirScan> {
        match DirScan::open(path) {
            Ok(scan) => Some(scan),
            Err(e) => {
                self.warn(stats, Operation::List, path, e);
                None
            }
        }
    }

    /// Next classifiable entry of a scan; unreadable entries become warnings
    fn next_entry(&self, scan: &mut DirScan, stats: &mut SyncStats) -> Option<DirEntry> {
        loop {
            match scan.next()? {
                Ok(entry) => return Some(entry),
                Err(e) => {
                    let root = scan.root().to_path_buf();
                    self.warn(stats, Operation::List, &root, e);
                }
            }
        }
    }

    /// Create a destination directory if missing; false if it cannot exist
    fn ensure_dir(&self, path: &Path, stats: &mut SyncStats) -> bool {
        match self.transferrer.create_dir(path) {
            Ok(created) => {
                if created {
                    stats.dirs_created += 1;
                    self.tick(path);
                    self.emit(SyncEvent::Mkdir {
                        path: path.to_path_buf(),
                    });
                }
                true
            }
            Err(e) => {
                self.warn(stats, Operation::CreateDir, path, e);
                false
            }
        }
    }

    fn warn(&self, stats: &mut SyncStats, operation: Operation, path: &Path, error: io::Error) {
        tracing::warn!("Failed to {} {}: {}", operation, path.display(), error);
        self.emit(SyncEvent::Warning {
            path: path.to_path_buf(),
            operation: operation.to_string(),
            error: error.to_string(),
        });
        stats.warnings.push(SyncWarning {
            path: path.to_path_buf(),
            operation,
            error,
        });
    }

    fn tick(&self, path: &Path) {
        self.progress.set_message(path.display().to_string());
        self.progress.inc(1);
    }

    fn emit(&self, event: SyncEvent) {
        if self.json {
            event.emit();
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;

    pub fn engine() -> SyncEngine {
        SyncEngine::new(SyncOptions {
            quiet: true,
            ..Default::default()
        })
    }

    pub fn engine_with(options: SyncOptions) -> SyncEngine {
        SyncEngine::new(SyncOptions {
            quiet: true,
            ..options
        })
    }

    /// Relative path -> file content (`None` for directories)
    pub fn snapshot(root: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
        walkdir::WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|e| e.unwrap())
            .map(|e| {
                let rel = e
                    .path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                let content = if e.file_type().is_dir() {
                    None
                } else {
                    Some(fs::read(e.path()).unwrap())
                };
                (rel, content)
            })
            .collect()
    }

    pub fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}
