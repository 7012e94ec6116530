use crate::cli::SyncMode;
use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings stored under `[profiles.<name>]`
///
/// Every field is optional; unset fields fall back to the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<SyncMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_subdirs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Config {
    /// Default location: `<config dir>/dirsync/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("dirsync").join("config.toml"))
            .ok_or_else(|| SyncError::Config("Cannot determine config directory".to_string()))
    }

    /// Load from the default location; a missing file is an empty config
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                tracing::debug!("{}", e);
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config = Self::parse(&content)
            .map_err(|e| SyncError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(
            "Loaded {} profile(s) from {}",
            config.profiles.len(),
            path.display()
        );
        Ok(config)
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn list_profiles(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Profile rendered back to TOML for `--show-profile`
    pub fn show_profile(&self, name: &str) -> Option<String> {
        let profile = self.get_profile(name)?;
        let body = toml::to_string_pretty(profile).ok()?;
        Some(format!("[profiles.{}]\n{}", name, body))
    }
}
