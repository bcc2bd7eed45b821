//! Device adapters for the reconcile collaborator traits.
//!
//! Facts come from a command's output or a saved running-config; commands
//! go to a program's stdin and/or a transcript file.

use crate::config::Device;
use crate::paths;
use crate::runner;
use anyhow::{Context, Result};
use chrono::Local;
use reconcile::{CommandExecutor, FactSource, Facts, GatherSubset, Platform};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Where running-config text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Command(Vec<String>),
    File(PathBuf),
    /// Only raw text passed by the caller can be parsed
    Offline,
}

/// Fact source backed by a device profile
#[derive(Debug, Clone)]
pub struct DeviceFacts {
    source: ConfigSource,
    platform: Option<Platform>,
    version_command: Option<Vec<String>>,
}

impl DeviceFacts {
    pub fn new(source: ConfigSource) -> Self {
        Self {
            source,
            platform: None,
            version_command: None,
        }
    }

    pub fn with_platform(mut self, platform: Option<Platform>) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_version_command(mut self, argv: Option<Vec<String>>) -> Self {
        self.version_command = argv;
        self
    }

    /// Facts for the selected device, or offline facts without one.
    pub fn for_device(device: Option<&Device>) -> Self {
        let Some(device) = device else {
            return Self::new(ConfigSource::Offline);
        };
        let profile = &device.profile;
        let source = if let Some(argv) = &profile.facts_command {
            ConfigSource::Command(argv.clone())
        } else if let Some(file) = &profile.running_config_file {
            ConfigSource::File(paths::resolve(file, &device.base_dir))
        } else {
            ConfigSource::Offline
        };
        Self::new(source)
            .with_platform(profile.platform.clone().map(Platform::new))
            .with_version_command(profile.version_command.clone())
    }

    fn running_config(&self) -> Result<String> {
        match &self.source {
            ConfigSource::Command(argv) => runner::run_capture(argv),
            ConfigSource::File(path) => fs::read_to_string(path)
                .with_context(|| format!("Could not read {}", path.display())),
            ConfigSource::Offline => {
                anyhow::bail!("no device selected; configure facts_command or running_config_file")
            }
        }
    }

    fn platform(&self) -> Result<Platform> {
        if let Some(platform) = &self.platform {
            return Ok(platform.clone());
        }
        match &self.version_command {
            Some(argv) => {
                let output = runner::run_capture(argv)?;
                let platform = nxfacts::detect_platform(&output);
                log::info!("detected platform '{platform}'");
                Ok(platform)
            }
            None => Ok(Platform::default()),
        }
    }

    fn gather(&self, subset: GatherSubset, data: Option<&str>) -> Result<Facts> {
        let records = match data {
            Some(text) => nxfacts::parse_string(text)?,
            None => nxfacts::parse_string(&self.running_config()?)?,
        };
        // Device facts are only needed when commands will be synthesized.
        let platform = match subset {
            GatherSubset::Min => self.platform()?,
            GatherSubset::None => self.platform.clone().unwrap_or_default(),
        };
        log::debug!("gathered {} record(s)", records.len());
        Ok(Facts { records, platform })
    }
}

impl FactSource for DeviceFacts {
    fn get_facts(
        &mut self,
        subset: GatherSubset,
        resources: &[&str],
        data: Option<&str>,
    ) -> reconcile::Result<Facts> {
        log::debug!("get_facts subset={subset:?} resources={resources:?}");
        self.gather(subset, data)
            .map_err(|e| reconcile::Error::Facts(format!("{e:#}")))
    }
}

/// Executor backed by a device profile
#[derive(Debug, Clone, Default)]
pub struct DeviceExecutor {
    device: String,
    apply_command: Option<Vec<String>>,
    transcript: Option<PathBuf>,
}

impl DeviceExecutor {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }

    pub fn with_apply_command(mut self, argv: Option<Vec<String>>) -> Self {
        self.apply_command = argv;
        self
    }

    pub fn with_transcript(mut self, path: Option<PathBuf>) -> Self {
        self.transcript = path;
        self
    }

    /// Executor for the selected device, or `None` when it cannot apply.
    pub fn for_device(device: Option<&Device>) -> Option<Self> {
        let device = device?;
        let profile = &device.profile;
        if profile.apply_command.is_none() && profile.transcript.is_none() {
            return None;
        }
        Some(
            Self::new(&device.name)
                .with_apply_command(profile.apply_command.clone())
                .with_transcript(
                    profile
                        .transcript
                        .as_deref()
                        .map(|t| paths::resolve(t, &device.base_dir)),
                ),
        )
    }

    fn send(&self, commands: &[String]) -> Result<()> {
        let mut payload = commands.join("\n");
        payload.push('\n');

        if let Some(argv) = &self.apply_command {
            let output = runner::run_with_input(argv, &payload)?;
            if !output.trim().is_empty() {
                log::info!("{}: {}", self.device, output.trim());
            }
        }

        if let Some(path) = &self.transcript {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Could not create {}", parent.display()))?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Could not open {}", path.display()))?;
            writeln!(file, "! {} {}", Local::now().to_rfc3339(), self.device)?;
            file.write_all(payload.as_bytes())
                .with_context(|| format!("Could not write {}", path.display()))?;
        }
        Ok(())
    }
}

impl CommandExecutor for DeviceExecutor {
    fn apply(&mut self, commands: &[String]) -> reconcile::Result<()> {
        log::info!("applying {} command(s) to {}", commands.len(), self.device);
        self.send(commands)
            .map_err(|e| reconcile::Error::Apply(format!("{e:#}")))
    }
}
