use crate::fs_util::{dir_exists, DIR_MODE};
use filetime::FileTime;
use std::fs::{self, DirBuilder, File};
use std::io::{self, Read, Write};
use std::path::Path;

// 256KB chunks for the content copy
const CHUNK_SIZE: usize = 256 * 1024;

/// Performs the filesystem mutations for the tree walks
///
/// Every method returns the raw `io::Result` so the caller decides whether a
/// failure is fatal or only a warning. In dry-run mode nothing is touched and
/// every mutation reports success.
pub struct Transferrer {
    dry_run: bool,
    preserve_times: bool,
}

impl Transferrer {
    pub fn new(dry_run: bool, preserve_times: bool) -> Self {
        Self {
            dry_run,
            preserve_times,
        }
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Create a single directory with [`DIR_MODE`]
    ///
    /// Returns `Ok(false)` if the directory already exists.
    pub fn create_dir(&self, path: &Path) -> io::Result<bool> {
        if dir_exists(path) {
            return Ok(false);
        }

        if self.dry_run {
            tracing::info!("Would create directory: {}", path.display());
            return Ok(true);
        }

        let mut builder = DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(DIR_MODE);
        }

        match builder.create(path) {
            Ok(()) => {
                tracing::info!("Created directory: {}", path.display());
                Ok(true)
            }
            // Lost a race with another creator; still fine if it is a directory
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir_exists(path) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Copy file contents, truncating or creating the destination
    ///
    /// Both handles are closed when this returns, on success or failure.
    pub fn copy_contents(&self, source: &Path, dest: &Path) -> io::Result<u64> {
        if self.dry_run {
            tracing::info!("Would copy: {} -> {}", source.display(), dest.display());
            return Ok(fs::metadata(source).map(|m| m.len()).unwrap_or(0));
        }

        let mut source_file = File::open(source)?;
        let mut dest_file = File::create(dest)?;

        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut bytes_written = 0u64;

        loop {
            let bytes_read = match source_file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            dest_file.write_all(&buffer[..bytes_read])?;
            bytes_written += bytes_read as u64;
        }

        dest_file.flush()?;

        tracing::info!(
            "Copied: {} -> {} ({} bytes)",
            source.display(),
            dest.display(),
            bytes_written
        );
        Ok(bytes_written)
    }

    /// Apply the source's permission bits to the destination
    ///
    /// If the source can no longer be stat'ed the step is skipped, not failed.
    pub fn copy_permissions(&self, source: &Path, dest: &Path) -> io::Result<()> {
        if self.dry_run {
            return Ok(());
        }

        let permissions = match fs::metadata(source) {
            Ok(meta) => meta.permissions(),
            Err(e) => {
                tracing::debug!(
                    "Cannot read permissions of {} ({}), leaving {} as created",
                    source.display(),
                    e,
                    dest.display()
                );
                return Ok(());
            }
        };

        fs::set_permissions(dest, permissions)
    }

    /// Apply the source's modification time to the destination (`--times`)
    pub fn copy_mtime(&self, source: &Path, dest: &Path) -> io::Result<()> {
        if self.dry_run || !self.preserve_times {
            return Ok(());
        }

        let meta = fs::metadata(source)?;
        filetime::set_file_mtime(dest, FileTime::from_last_modification_time(&meta))
    }

    /// Remove a single non-directory entry
    pub fn remove_file(&self, path: &Path) -> io::Result<()> {
        if self.dry_run {
            tracing::info!("Would delete: {}", path.display());
            return Ok(());
        }

        fs::remove_file(path)?;
        tracing::info!("Deleted: {}", path.display());
        Ok(())
    }

    /// Remove whatever non-directory entry sits where a copy is about to land
    ///
    /// Writing into a fresh file sidesteps read-only targets and symlinks at
    /// the destination. An absent destination is not an error.
    pub fn discard(&self, path: &Path) -> io::Result<()> {
        if self.dry_run {
            return Ok(());
        }

        match fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!("Removed old copy: {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Remove an empty directory
    pub fn remove_dir(&self, path: &Path) -> io::Result<()> {
        if self.dry_run {
            tracing::info!("Would remove directory: {}", path.display());
            return Ok(());
        }

        fs::remove_dir(path)?;
        tracing::info!("Removed directory: {}", path.display());
        Ok(())
    }
}
