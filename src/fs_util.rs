use std::fs;
use std::path::Path;

/// Mode for directories created on the destination side (rwxr-xr-x).
///
/// Applied regardless of the source directory's own mode; the process umask
/// still applies on top of it.
pub const DIR_MODE: u32 = 0o755;

/// Check if a path resolves to a regular file
///
/// Follows symlinks. A failed stat (missing, unreadable, dangling link) is
/// reported the same as "not a file".
pub fn file_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Check if a path resolves to a directory
///
/// Same failure policy as [`file_exists`].
pub fn dir_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Check if `a` was modified strictly after `b`
///
/// Returns false when either side cannot be stat'ed or the platform does not
/// report modification times.
pub fn is_newer(a: &Path, b: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();

    match (modified(a), modified(b)) {
        (Some(a), Some(b)) => a > b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use tempfile::TempDir;

    #[test]
    fn test_file_exists() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, b"test").unwrap();

        assert!(file_exists(&file));
        assert!(!file_exists(temp.path()));
        assert!(!file_exists(&temp.path().join("missing.txt")));
    }

    #[test]
    fn test_dir_exists() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, b"test").unwrap();

        assert!(dir_exists(temp.path()));
        assert!(!dir_exists(&file));
        assert!(!dir_exists(&temp.path().join("missing")));
    }

    #[test]
    fn test_is_newer_strict() {
        let temp = TempDir::new().unwrap();
        let old = temp.path().join("old.txt");
        let new = temp.path().join("new.txt");
        fs::write(&old, b"old").unwrap();
        fs::write(&new, b"new").unwrap();

        set_file_mtime(&old, FileTime::from_unix_time(1_000_000, 0)).unwrap();
        set_file_mtime(&new, FileTime::from_unix_time(2_000_000, 0)).unwrap();

        assert!(is_newer(&new, &old));
        assert!(!is_newer(&old, &new));

        // Equal times are not newer
        set_file_mtime(&old, FileTime::from_unix_time(2_000_000, 0)).unwrap();
        assert!(!is_newer(&new, &old));
    }

    #[test]
    fn test_is_newer_missing_side() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, b"test").unwrap();
        let missing = temp.path().join("missing.txt");

        assert!(!is_newer(&file, &missing));
        assert!(!is_newer(&missing, &file));
    }

    #[test]
    #[cfg(unix)]
    fn test_file_exists_follows_symlinks() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target.txt");
        let link = temp.path().join("link.txt");
        let dangling = temp.path().join("dangling.txt");
        fs::write(&target, b"test").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone"), &dangling).unwrap();

        assert!(file_exists(&link));
        assert!(!file_exists(&dangling));
    }
}
