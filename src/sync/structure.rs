use super::scanner::DirScan;
use super::{SyncEngine, SyncStats};
use crate::error::Result;
use std::path::Path;

impl SyncEngine {
    /// Create every source subdirectory that is missing on the destination side
    ///
    /// Files are never looked at. Existing destination directories are left as
    /// they are, including their mode.
    pub fn mirror_structure(&self, source: &Path, destination: &Path) -> Result<SyncStats> {
        tracing::debug!(
            "Mirroring directory structure: {} → {}",
            source.display(),
            destination.display()
        );

        let mut stats = SyncStats::default();
        let scan = DirScan::open_root(source)?;
        self.mirror_structure_in(scan, source, destination, &mut stats);
        Ok(stats)
    }

    fn mirror_structure_in(
        &self,
        mut scan: DirScan,
        source: &Path,
        destination: &Path,
        stats: &mut SyncStats,
    ) {
        while let Some(entry) = self.next_entry(&mut scan, stats) {
            if !entry.is_dir() {
                continue;
            }

            let src_dir = source.join(&entry.name);
            let dst_dir = destination.join(&entry.name);

            self.ensure_dir(&dst_dir, stats);
            if let Some(sub) = self.open_nested(&src_dir, stats) {
                self.mirror_structure_in(sub, &src_dir, &dst_dir, stats);
            }
        }
    }
}
