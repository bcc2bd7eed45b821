//! Path resolution for stpconf
//!
//! # Environment Variables
//!
//! - `STPCONF_CONFIG_DIR` - Override config directory
//!
//! # Path Resolution Priority
//!
//! 1. `STPCONF_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/stpconf` (if set)
//! 3. `~/.config/stpconf`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "STPCONF_CONFIG_DIR";

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "config.toml";

/// Get the stpconf config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("stpconf");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("stpconf");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Default settings file path
pub fn settings_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(SETTINGS_FILE))
}

/// Expand ~ and environment variables in a path string.
///
/// Unset variables are left as written.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

/// Expand a path and anchor it at `base` when it is relative.
pub fn resolve(path: &str, base: &Path) -> PathBuf {
    let expanded = expand(path);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}
