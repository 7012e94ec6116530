use super::output::SyncEvent;
use super::scanner::DirScan;
use super::strategy::SyncAction;
use super::{Operation, SubdirPolicy, SyncEngine, SyncStats};
use crate::error::Result;
use crate::fs_util::file_exists;
use std::path::Path;

type Walk = fn(&SyncEngine, DirScan, &Path, &Path, &mut SyncStats);

impl SyncEngine {
    /// Copy every source file over its destination counterpart, unconditionally
    pub fn copy_all(&self, source: &Path, destination: &Path) -> Result<SyncStats> {
        tracing::debug!(
            "Copying all files: {} → {}",
            source.display(),
            destination.display()
        );

        let mut stats = SyncStats::default();
        let scan = DirScan::open_root(source)?;
        self.copy_all_in(scan, source, destination, &mut stats);
        Ok(stats)
    }

    fn copy_all_in(&self, mut scan: DirScan, source: &Path, destination: &Path, stats: &mut SyncStats) {
        while let Some(entry) = self.next_entry(&mut scan, stats) {
            let src_path = source.join(&entry.name);
            let dst_path = destination.join(&entry.name);

            if entry.is_dir() {
                self.copy_subdir(&src_path, &dst_path, stats, Self::copy_all_in);
            } else {
                let is_update = file_exists(&dst_path);
                self.discard(&dst_path, stats);
                self.copy_file(&src_path, &dst_path, is_update, stats);
            }
        }
    }

    /// Copy source files that are missing from, or strictly newer than, the destination
    pub fn copy_new_and_updated(&self, source: &Path, destination: &Path) -> Result<SyncStats> {
        tracing::debug!(
            "Copying new and updated files: {} → {}",
            source.display(),
            destination.display()
        );

        let mut stats = SyncStats::default();
        let scan = DirScan::open_root(source)?;
        self.copy_new_and_updated_in(scan, source, destination, &mut stats);
        Ok(stats)
    }

    fn copy_new_and_updated_in(
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
                let walk: Walk = match self.subdir_policy {
                    SubdirPolicy::Incremental => Self::copy_new_and_updated_in,
                    SubdirPolicy::ForceCopy => Self::copy_all_in,
                };
                self.copy_subdir(&src_path, &dst_path, stats, walk);
                continue;
            }

            match self.planner.plan_file(&src_path, &dst_path) {
                SyncAction::Create => self.copy_file(&src_path, &dst_path, false, stats),
                SyncAction::Update => {
                    self.discard(&dst_path, stats);
                    self.copy_file(&src_path, &dst_path, true, stats);
                }
                SyncAction::Skip => {
                    tracing::debug!("Skipping unchanged: {}", dst_path.display());
                    stats.files_skipped += 1;
                    self.tick(&dst_path);
                    self.emit(SyncEvent::Skip { path: dst_path });
                }
            }
        }
    }

    fn copy_subdir(&self, source: &Path, destination: &Path, stats: &mut SyncStats, walk: Walk) {
        // In a dry run the structure pass has already reported the directory
        if !self.transferrer.dry_run() && !self.ensure_dir(destination, stats) {
            return;
        }

        if let Some(sub) = self.open_nested(source, stats) {
            walk(self, sub, source, destination, stats);
        }
    }

    fn discard(&self, path: &Path, stats: &mut SyncStats) {
        if let Err(e) = self.transferrer.discard(path) {
            self.warn(stats, Operation::RemoveFile, path, e);
        }
    }

    /// Contents first, then permissions, then (with `--times`) the mtime
    ///
    /// `is_update` picks the counter: an existing file was replaced, or a new one created.
    fn copy_file(&self, source: &Path, dest: &Path, is_update: bool, stats: &mut SyncStats) {
        let bytes = match self.transferrer.copy_contents(source, dest) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.warn(stats, Operation::Copy, dest, e);
                return;
            }
        };

        if let Err(e) = self.transferrer.copy_permissions(source, dest) {
            self.warn(stats, Operation::SetPermissions, dest, e);
        }
        if let Err(e) = self.transferrer.copy_mtime(source, dest) {
            self.warn(stats, Operation::SetTimes, dest, e);
        }

        stats.bytes_transferred += bytes;
        self.tick(dest);

        let path = dest.to_path_buf();
        if is_update {
            stats.files_updated += 1;
            self.emit(SyncEvent::Update {
                path,
                bytes_transferred: bytes,
            });
        } else {
            stats.files_created += 1;
            self.emit(SyncEvent::Create {
                path,
                bytes_transferred: bytes,
            });
        }
    }
}
