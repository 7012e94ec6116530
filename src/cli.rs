use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which passes a run performs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// Create directories, delete extras, copy new and updated files (default)
    #[default]
    Mirror,

    /// Create directories and copy new and updated files, never delete
    Update,

    /// Create directories and overwrite every file, never delete
    Copy,

    /// Only create missing directories
    Structure,

    /// Only delete destination entries missing from the source
    Prune,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mirror => "mirror",
            Self::Update => "update",
            Self::Copy => "copy",
            Self::Structure => "structure",
            Self::Prune => "prune",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Parser, Debug)]
#[command(name = "dirsync")]
#[command(about = "Mirror a source directory tree onto a destination tree", long_about = None)]
#[command(version)]
#[command(after_help = "EXAMPLES:
    # Mirror (create, update and delete)
    dirsync /source /destination

    # Preview changes without applying
    dirsync /source /destination --dry-run

    # Copy new and updated files but never delete
    dirsync /source /destination --mode update

    # Overwrite every file
    dirsync /source /destination --mode copy

    # Keep modification times on copied files
    dirsync /source /destination --times

    # Use a saved profile
    dirsync --profile backup")]
pub struct Cli {
    /// Source directory
    /// Optional when using --profile
    pub source: Option<PathBuf>,

    /// Destination directory (must already exist)
    /// Optional when using --profile
    pub destination: Option<PathBuf>,

    /// Passes to run [default: mirror]
    #[arg(short, long, value_enum)]
    pub mode: Option<SyncMode>,

    /// Show changes without applying them (dry-run)
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Preserve modification times on copied files
    #[arg(short = 't', long)]
    pub times: bool,

    /// Force-copy every file inside subdirectories instead of comparing mtimes
    #[arg(long)]
    pub force_subdirs: bool,

    /// Quiet mode (only show errors)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output NDJSON events instead of the human-readable summary
    #[arg(long)]
    pub json: bool,

    /// Config file [default: <config dir>/dirsync/config.toml]
    #[arg(long, env = "DIRSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Load source, destination and options from a named profile
    #[arg(long)]
    pub profile: Option<String>,

    /// List configured profiles and exit
    #[arg(long)]
    pub list_profiles: bool,

    /// Print a profile and exit
    #[arg(long, value_name = "NAME")]
    pub show_profile: Option<String>,
}

impl Cli {
    pub fn validate(&self) -> anyhow::Result<()> {
        // --list-profiles and --show-profile don't need source/destination
        if self.list_profiles || self.show_profile.is_some() {
            return Ok(());
        }

        let (Some(source), Some(destination)) = (&self.source, &self.destination) else {
            anyhow::bail!("Source and destination are required (or use --profile)");
        };

        check_directory(source, "Source")?;
        check_directory(destination, "Destination")?;

        if let (Ok(s), Ok(d)) = (source.canonicalize(), destination.canonicalize()) {
            if s == d {
                anyhow::bail!(
                    "Source and destination are the same directory: {}",
                    s.display()
                );
            }
        }

        Ok(())
    }

    pub fn sync_mode(&self) -> SyncMode {
        self.mode.unwrap_or_default()
    }

    pub fn log_level(&self) -> tracing::Level {
        if self.quiet || self.json {
            return tracing::Level::ERROR;
        }

        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// A root must exist, be a directory, and be listable
fn check_directory(path: &std::path::Path, role: &str) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("{} path does not exist: {}", role, path.display());
    }
    if !path.is_dir() {
        anyhow::bail!("{} path is not a directory: {}", role, path.display());
    }
    if let Err(e) = std::fs::read_dir(path) {
        anyhow::bail!("Cannot open directory '{}': {}", path.display(), e);
    }
    Ok(())
}
