use crate::error::{Result, SyncError};
use std::ffi::OsString;
use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

/// Type tag for a listed entry
///
/// Only directories matter to the tree walks; everything else (regular files,
/// symlinks, fifos, devices) is handled as a plain file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Other,
}

/// One item yielded while scanning a directory
#[derive(Debug)]
pub struct DirEntry {
    pub name: OsString,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Open listing of a single directory (non-recursive)
///
/// Holds the underlying directory handle until dropped. Callers that delete
/// the scanned directory must drop the scan first.
pub struct DirScan {
    root: PathBuf,
    inner: ReadDir,
}

impl DirScan {
    /// Open a directory for listing
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        let inner = fs::read_dir(&root)?;
        Ok(Self { root, inner })
    }

    /// Open one of the two roots of a pass
    ///
    /// Failing to list a root is the one fatal condition of a tree walk.
    pub fn open_root(root: &Path) -> Result<Self> {
        Self::open(root).map_err(|e| SyncError::ReadDirError {
            path: root.to_path_buf(),
            source: e,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Iterator for DirScan {
    type Item = io::Result<DirEntry>;

    // read_dir never yields "." or "..", so there is nothing to filter here.
    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e)),
        };

        Some(classify(&entry).map(|kind| DirEntry {
            name: entry.file_name(),
            kind,
        }))
    }
}

/// Classify an entry from the type the listing reported
///
/// Some filesystems don't fill in the entry type. In that case fall back to
/// an lstat of the entry, which answers the same question without following
/// symlinks.
fn classify(entry: &fs::DirEntry) -> io::Result<EntryKind> {
    let file_type = match entry.file_type() {
        Ok(ft) => ft,
        Err(e) => {
            tracing::trace!(
                "Entry type unavailable for {} ({}), falling back to lstat",
                entry.path().display(),
                e
            );
            fs::symlink_metadata(entry.path())?.file_type()
        }
    };

    Ok(if file_type.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::Other
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scan_sorted(root: &Path) -> Vec<(String, EntryKind)> {
        let mut entries: Vec<_> = DirScan::open(root)
            .unwrap()
            .map(|e| {
                let e = e.unwrap();
                (e.name.to_string_lossy().into_owned(), e.kind)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    #[test]
    fn test_scan_basic() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::write(root.join("file1.txt"), "content").unwrap();
        fs::write(root.join("dir1/file2.txt"), "content").unwrap();

        // Only direct children, no recursion
        assert_eq!(
            scan_sorted(root),
            vec![
                ("dir1".to_string(), EntryKind::Directory),
                ("file1.txt".to_string(), EntryKind::Other),
            ]
        );
    }

    #[test]
    fn test_scan_empty_dir() {
        let temp = TempDir::new().unwrap();
        assert!(scan_sorted(temp.path()).is_empty());
    }

    #[test]
    fn test_open_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");

        match DirScan::open_root(&missing) {
            Err(SyncError::ReadDirError { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected ReadDirError, got {:?}", other.map(|s| s.root().to_path_buf())),
        }
    }

    #[test]
    fn test_open_file_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "content").unwrap();

        assert!(DirScan::open(&file).is_err());
    }

    #[test]
    #[cfg(unix)]
    fn test_symlink_to_dir_is_not_a_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("real")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

        assert_eq!(
            scan_sorted(root),
            vec![
                ("link".to_string(), EntryKind::Other),
                ("real".to_string(), EntryKind::Directory),
            ]
        );
    }
}
