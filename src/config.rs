//! Optional defaults file.
//!
//! Flag defaults can be kept next to the repository in `.git-dch.toml` or
//! per user in `<config-dir>/git-dch/config.toml`; command-line flags
//! always win over file values. A missing file simply yields defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DchError, Result};

const LOCAL_CONFIG_FILE: &str = ".git-dch.toml";

/// Defaults applied when the matching command-line flag is absent.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// Default target distribution
    #[serde(default)]
    pub distribution: Option<String>,

    /// Default urgency level
    #[serde(default)]
    pub urgency: Option<String>,

    /// Drop merge commits from generated entries
    #[serde(default)]
    pub ignore_merges: bool,

    /// Changelog path used when no positional argument is given
    #[serde(default)]
    pub changelog: Option<String>,
}

/// Load configuration from an explicit path, the working directory, or
/// the user configuration directory, in that order of preference.
///
/// An explicit path must exist; the search locations are optional.
pub fn load_config(path: Option<&str>) -> Result<Config> {
    if let Some(path) = path {
        return parse_file(Path::new(path));
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return parse_file(&local);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let user = config_dir.join("git-dch").join("config.toml");
        if user.exists() {
            return parse_file(&user);
        }
    }

    Ok(Config::default())
}

fn parse_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        DchError::config(format!("cannot read config file {}: {}", path.display(), e))
    })?;

    toml::from_str(&content).map_err(|e| {
        DchError::config(format!("cannot parse config file {}: {}", path.display(), e))
    })
}
