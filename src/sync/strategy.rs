use crate::fs_util::{file_exists, is_newer};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Skip - destination is as new as the source, or newer
    Skip,
    /// Create - file missing from the destination
    Create,
    /// Update - source modified strictly after the destination copy
    Update,
}

/// Decides whether an incremental copy needs to touch a file
///
/// Comparison is by modification time only. Nothing is cached: both sides
/// are stat'ed at the moment of the decision since an earlier pass may have
/// changed the destination.
#[derive(Debug, Default)]
pub struct StrategyPlanner;

impl StrategyPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan_file(&self, source: &Path, dest: &Path) -> SyncAction {
        if !file_exists(dest) {
            SyncAction::Create
        } else if is_newer(source, dest) {
            SyncAction::Update
        } else {
            SyncAction::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.txt");
        let dst = temp.path().join("dst.txt");
        fs::write(&src, "source").unwrap();
        (temp, src, dst)
    }

    #[test]
    fn test_plan_missing_destination() {
        let (_temp, src, dst) = setup();
        assert_eq!(StrategyPlanner::new().plan_file(&src, &dst), SyncAction::Create);
    }

    #[test]
    fn test_plan_newer_source() {
        let (_temp, src, dst) = setup();
        fs::write(&dst, "stale").unwrap();
        set_file_mtime(&dst, FileTime::from_unix_time(1_000, 0)).unwrap();
        set_file_mtime(&src, FileTime::from_unix_time(2_000, 0)).unwrap();

        assert_eq!(StrategyPlanner::new().plan_file(&src, &dst), SyncAction::Update);
    }

    #[test]
    fn test_plan_equal_or_older_source() {
        let (_temp, src, dst) = setup();
        fs::write(&dst, "kept").unwrap();
        let planner = StrategyPlanner::new();

        set_file_mtime(&src, FileTime::from_unix_time(2_000, 0)).unwrap();
        set_file_mtime(&dst, FileTime::from_unix_time(2_000, 0)).unwrap();
        assert_eq!(planner.plan_file(&src, &dst), SyncAction::Skip);

        set_file_mtime(&dst, FileTime::from_unix_time(3_000, 0)).unwrap();
        assert_eq!(planner.plan_file(&src, &dst), SyncAction::Skip);
    }

    #[test]
    fn test_plan_destination_is_directory() {
        let (_temp, src, dst) = setup();
        fs::create_dir(&dst).unwrap();

        // A directory is not a file, so the copy is attempted (and fails softly)
        assert_eq!(StrategyPlanner::new().plan_file(&src, &dst), SyncAction::Create);
    }
}
