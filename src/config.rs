//! Settings and invocation files.
//!
//! The settings file (`~/.config/stpconf/config.toml`) names the devices
//! stpconf can reach. An invocation file describes one run and may be TOML
//! or JSON, chosen by extension.

use crate::paths;
use anyhow::{Context, Result, bail};
use reconcile::{Invocation, Platform, SpanningTree, State};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Device used when `--device` is not given
    #[serde(default)]
    pub default_device: Option<String>,

    #[serde(default)]
    pub devices: BTreeMap<String, DeviceProfile>,

    /// Directory relative paths in profiles are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// How to reach one device
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceProfile {
    /// Platform model (e.g. `N9K-C93180YC-EX`)
    #[serde(default)]
    pub platform: Option<String>,

    /// Program printing `show running-config spanning-tree`
    #[serde(default)]
    pub facts_command: Option<Vec<String>>,

    /// Program printing `show version`, used when `platform` is not set
    #[serde(default)]
    pub version_command: Option<Vec<String>>,

    /// Saved running-config instead of a live command
    #[serde(default)]
    pub running_config_file: Option<String>,

    /// Program receiving the commands on stdin
    #[serde(default)]
    pub apply_command: Option<Vec<String>>,

    /// File applied commands are appended to
    #[serde(default)]
    pub transcript: Option<String>,
}

/// A device profile chosen for one run
#[derive(Debug, Clone)]
pub struct Device {
    pub name: String,
    pub profile: DeviceProfile,
    pub base_dir: PathBuf,
}

impl Settings {
    /// Load settings from `path`, or the default location.
    ///
    /// A missing default file yields empty settings; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = paths::settings_file()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    log::debug!("no settings file at {}", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let mut settings: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        settings.base_dir = parent_dir(path);

        for (name, profile) in &settings.devices {
            profile
                .check()
                .with_context(|| format!("Invalid device '{name}'"))?;
        }
        if let Some(name) = &settings.default_device
            && !settings.devices.contains_key(name)
        {
            bail!("default_device '{name}' is not defined under [devices]");
        }
        Ok(settings)
    }

    /// Pick the device for this run: the named one, else the default.
    pub fn device(&self, name: Option<&str>) -> Result<Option<Device>> {
        let Some(name) = name.or(self.default_device.as_deref()) else {
            return Ok(None);
        };
        let profile = self.devices.get(name).with_context(|| {
            let known: Vec<&str> = self.devices.keys().map(String::as_str).collect();
            if known.is_empty() {
                format!("Unknown device '{name}' (no devices configured)")
            } else {
                format!("Unknown device '{name}' (known: {})", known.join(", "))
            }
        })?;
        Ok(Some(Device {
            name: name.to_string(),
            profile: profile.clone(),
            base_dir: self.base_dir.clone(),
        }))
    }
}

impl DeviceProfile {
    fn check(&self) -> Result<()> {
        if self.facts_command.is_some() && self.running_config_file.is_some() {
            bail!("facts_command and running_config_file are mutually exclusive");
        }
        for (key, argv) in [
            ("facts_command", &self.facts_command),
            ("version_command", &self.version_command),
            ("apply_command", &self.apply_command),
        ] {
            if argv.as_ref().is_some_and(Vec::is_empty) {
                bail!("{key} must not be empty");
            }
        }
        Ok(())
    }
}

// ============================================================================
// Invocation files
// ============================================================================

/// On-disk form of an invocation
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct InvocationFile {
    #[serde(default)]
    state: State,

    #[serde(default)]
    check_mode: bool,

    #[serde(default)]
    running_config: Option<String>,

    #[serde(default)]
    running_config_file: Option<String>,

    #[serde(default)]
    platform: Option<Platform>,

    #[serde(default)]
    config: Vec<SpanningTree>,
}

/// Load an invocation, resolving `running_config_file` next to it.
pub fn load_invocation(path: &Path) -> Result<Invocation> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;

    let file: InvocationFile = if is_json(path) {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid invocation file {}", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Invalid invocation file {}", path.display()))?
    };

    let running_config = match (file.running_config, file.running_config_file) {
        (Some(_), Some(_)) => bail!("running_config and running_config_file are mutually exclusive"),
        (Some(text), None) => Some(text),
        (None, Some(raw)) => {
            let source = paths::resolve(&raw, &parent_dir(path));
            let text = fs::read_to_string(&source)
                .with_context(|| format!("Could not read {}", source.display()))?;
            Some(text)
        }
        (None, None) => None,
    };

    Ok(Invocation {
        state: file.state,
        config: file.config,
        running_config,
        check_mode: file.check_mode,
        platform: file.platform,
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
