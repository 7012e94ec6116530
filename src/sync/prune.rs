use super::output::SyncEvent;
use super::scanner::DirScan;
use super::{Operation, SyncEngine, SyncStats};
use crate::error::Result;
use crate::fs_util::{dir_exists, file_exists};
use std::path::Path;

impl SyncEngine {
    /// Delete destination files that are not regular files in the source
    ///
    /// Descends into every destination directory whether or not the source has
    /// it; removing whole directories is left to
    /// [`prune_missing_directories`](Self::prune_missing_directories).
    pub fn prune_missing_files(&self, source: &Path, destination: &Path) -> Result<SyncStats> {
        tracing::debug!("Pruning files missing from {}", source.display());

        let mut stats = SyncStats::default();
        let scan = DirScan::open_root(destination)?;
        self.prune_files_in(scan, source, destination, &mut stats);
        Ok(stats)
    }

    fn prune_files_in(
        &self,
        mut scan: DirScan,
        source: &Path,
        destination: &Path,
        stats: &mut SyncStats,
    ) {
        while let Some(entry) = self.next_entry(&mut scan, stats) {
            let src_path = source.join(&entry.name);
            let dst_path = destination.join(&entry.name);

            if entry.is_dir() {
                if let Some(sub) = self.open_nested(&dst_path, stats) {
                    self.prune_files_in(sub, &src_path, &dst_path, stats);
                }
            } else if !file_exists(&src_path) {
                self.delete_file(&dst_path, stats);
            }
        }
    }

    /// Delete destination directories that are not directories in the source
    pub fn prune_missing_directories(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<SyncStats> {
        tracing::debug!("Pruning directories missing from {}", source.display());

        self.prune_dirs(source, destination, false)
    }

    /// `files_pruned`: the file pass already ran in this run, so in a dry run
    /// the files below a stale directory have been reported once already
    pub(crate) fn prune_dirs(
        &self,
        source: &Path,
        destination: &Path,
        files_pruned: bool,
    ) -> Result<SyncStats> {
        let report_files = !(files_pruned && self.transferrer.dry_run());

        let mut stats = SyncStats::default();
        let scan = DirScan::open_root(destination)?;
        self.prune_dirs_in(scan, source, destination, report_files, &mut stats);
        Ok(stats)
    }

    fn prune_dirs_in(
        &self,
        mut scan: DirScan,
        source: &Path,
        destination: &Path,
        report_files: bool,
        stats: &mut SyncStats,
    ) {
        while let Some(entry) = self.next_entry(&mut scan, stats) {
            if !entry.is_dir() {
                continue;
            }

            let src_dir = source.join(&entry.name);
            let dst_dir = destination.join(&entry.name);

            if !dir_exists(&src_dir) {
                self.delete_tree(&dst_dir, report_files, stats);
            } else if let Some(sub) = self.open_nested(&dst_dir, stats) {
                self.prune_dirs_in(sub, &src_dir, &dst_dir, report_files, stats);
            }
        }
    }

    /// Delete `root` and everything below it
    pub fn delete_recursive(&self, root: &Path) -> Result<SyncStats> {
        let mut stats = SyncStats::default();
        let scan = DirScan::open_root(root)?;
        self.delete_tree_from(scan, root, true, &mut stats);
        Ok(stats)
    }

    fn delete_tree(&self, root: &Path, report_files: bool, stats: &mut SyncStats) {
        match DirScan::open(root) {
            Ok(scan) => self.delete_tree_from(scan, root, report_files, stats),
            Err(e) => {
                self.warn(stats, Operation::List, root, e);
                // An unlistable directory may still be empty
                self.delete_dir(root, stats);
            }
        }
    }

    /// Post-order: children first, then the directory once its scan is closed
    fn delete_tree_from(
        &self,
        mut scan: DirScan,
        root: &Path,
        report_files: bool,
        stats: &mut SyncStats,
    ) {
        while let Some(entry) = self.next_entry(&mut scan, stats) {
            let path = root.join(&entry.name);
            if entry.is_dir() {
                self.delete_tree(&path, report_files, stats);
            } else if report_files {
                self.delete_file(&path, stats);
            }
        }

        drop(scan);
        self.delete_dir(root, stats);
    }

    fn delete_file(&self, path: &Path, stats: &mut SyncStats) {
        match self.transferrer.remove_file(path) {
            Ok(()) => {
                stats.files_deleted += 1;
                self.tick(path);
                self.emit(SyncEvent::Delete {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => self.warn(stats, Operation::RemoveFile, path, e),
        }
    }

    fn delete_dir(&self, path: &Path, stats: &mut SyncStats) {
        match self.transferrer.remove_dir(path) {
            Ok(()) => {
                stats.dirs_deleted += 1;
                self.tick(path);
                self.emit(SyncEvent::Rmdir {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => self.warn(stats, Operation::RemoveDir, path, e),
        }
    }
}
