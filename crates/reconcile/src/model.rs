//! Spanning-tree configuration records
//!
//! A [`SpanningTree`] record is the unit of reconciliation. The same type
//! carries declared intent (`want`), observed facts (`have`) and the delta
//! between them: every attribute is optional and `None` means "not part of
//! this record".

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// VLAN range covered by the `default` record's per-VLAN attributes
pub const ALL_VLANS: &str = "1-3967";

/// Name of the record holding the global (device-wide) settings
pub const DEFAULT_NAME: &str = "default";

/// Factory bridge priority
pub const DEFAULT_PRIORITY: u32 = 32768;

/// Factory timers, in seconds (hops for `max-hops`)
pub const DEFAULT_HELLO_TIME: u8 = 2;
pub const DEFAULT_FORWARD_TIME: u8 = 15;
pub const DEFAULT_MAX_AGE: u8 = 20;
pub const DEFAULT_MAX_HOPS: u8 = 20;

/// One spanning-tree configuration unit, keyed by `name`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpanningTree {
    /// Record key: `default`, `vlan <range>` or `mst <instances>`
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<StpMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathcost_method: Option<PathcostMethod>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_assurance: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loopguard_default: Option<bool>,

    /// Port type defaults applied to all interfaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_type: Option<PortTypeDefaults>,

    /// Bridge priority, a multiple of 4096
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hello_time: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_time: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u8>,

    /// MST region and region-wide timers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mst: Option<MstConfig>,
}

/// Spanning-tree protocol mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StpMode {
    #[serde(rename = "rapid-pvst")]
    RapidPvst,
    #[serde(rename = "mst")]
    Mst,
}

impl StpMode {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::RapidPvst => "rapid-pvst",
            Self::Mst => "mst",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "rapid-pvst" => Some(Self::RapidPvst),
            "mst" => Some(Self::Mst),
            _ => None,
        }
    }
}

/// Path cost calculation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathcostMethod {
    Short,
    Long,
}

impl PathcostMethod {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Long => "long",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "short" => Some(Self::Short),
            "long" => Some(Self::Long),
            _ => None,
        }
    }
}

/// Default port type for interfaces without an explicit setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    Edge,
    Network,
    Normal,
}

/// Global port type defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortTypeDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<PortType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_bpduguard: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_bpdufilter: Option<bool>,
}

impl PortTypeDefaults {
    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.edge_bpduguard.is_none() && self.edge_bpdufilter.is_none()
    }
}

/// MST region configuration and region-wide timers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MstConfig {
    /// Region name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Region revision number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u16>,

    /// Instance to VLAN mappings, keyed by instance id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<Vec<MstInstance>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hello_time: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_time: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hops: Option<u8>,
}

impl MstConfig {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.revision.is_none()
            && self.instances.as_ref().is_none_or(Vec::is_empty)
            && self.hello_time.is_none()
            && self.forward_time.is_none()
            && self.max_age.is_none()
            && self.max_hops.is_none()
    }

    /// Whether any attribute lives inside `spanning-tree mst configuration`
    pub fn has_region(&self) -> bool {
        self.name.is_some()
            || self.revision.is_some()
            || self.instances.as_ref().is_some_and(|i| !i.is_empty())
    }

    pub fn instance(&self, id: u16) -> Option<&MstInstance> {
        self.instances.as_ref()?.iter().find(|i| i.id == id)
    }
}

/// One MST instance and the VLANs mapped to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MstInstance {
    pub id: u16,
    pub vlans: String,
}

/// What a record applies to, derived from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Device-wide settings; per-VLAN values cover [`ALL_VLANS`]
    Global,
    /// Per-VLAN settings for a VLAN range
    Vlan(String),
    /// Per-instance settings for an MST instance range
    Mst(String),
}

impl Scope {
    /// Parse a record name into a scope.
    pub fn parse(name: &str) -> Result<Self> {
        let mut words = name.split_whitespace();
        let scope = match (words.next(), words.next(), words.next()) {
            (Some(DEFAULT_NAME), None, None) => Scope::Global,
            (Some("vlan"), Some(range), None) => {
                validate_range(range, 1, 4094).map_err(|m| Error::invalid(name, m))?;
                Scope::Vlan(range.to_string())
            }
            (Some("mst"), Some(range), None) => {
                validate_range(range, 0, 4094).map_err(|m| Error::invalid(name, m))?;
                Scope::Mst(range.to_string())
            }
            _ => {
                return Err(Error::invalid(
                    name,
                    "name must be 'default', 'vlan <range>' or 'mst <instances>'",
                ));
            }
        };
        Ok(scope)
    }

    /// VLAN range targeted by per-VLAN commands, if this scope has one
    pub fn vlans(&self) -> Option<&str> {
        match self {
            Scope::Global => Some(ALL_VLANS),
            Scope::Vlan(range) => Some(range),
            Scope::Mst(_) => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "{DEFAULT_NAME}"),
            Scope::Vlan(range) => write!(f, "vlan {range}"),
            Scope::Mst(range) => write!(f, "mst {range}"),
        }
    }
}

impl SpanningTree {
    /// Create an empty record with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn scope(&self) -> Result<Scope> {
        Scope::parse(&self.name)
    }

    /// Fill every absent attribute with the device's factory default.
    ///
    /// Running-config omits settings left at their default, so an observed
    /// record compares equal to intent that states those defaults.
    /// MST region names and instances have no default and stay as they are.
    pub fn with_defaults(&self) -> Self {
        let port_type = self.port_type.clone().unwrap_or_default();
        let mst = self.mst.clone().unwrap_or_default();
        Self {
            name: self.name.clone(),
            mode: self.mode.or(Some(StpMode::RapidPvst)),
            pathcost_method: self.pathcost_method.or(Some(PathcostMethod::Short)),
            bridge_assurance: self.bridge_assurance.or(Some(true)),
            loopguard_default: self.loopguard_default.or(Some(false)),
            port_type: Some(PortTypeDefaults {
                default: port_type.default.or(Some(PortType::Normal)),
                edge_bpduguard: port_type.edge_bpduguard.or(Some(false)),
                edge_bpdufilter: port_type.edge_bpdufilter.or(Some(false)),
            }),
            priority: self.priority.or(Some(DEFAULT_PRIORITY)),
            hello_time: self.hello_time.or(Some(DEFAULT_HELLO_TIME)),
            forward_time: self.forward_time.or(Some(DEFAULT_FORWARD_TIME)),
            max_age: self.max_age.or(Some(DEFAULT_MAX_AGE)),
            mst: Some(MstConfig {
                name: mst.name,
                revision: mst.revision.or(Some(0)),
                instances: mst.instances,
                hello_time: mst.hello_time.or(Some(DEFAULT_HELLO_TIME)),
                forward_time: mst.forward_time.or(Some(DEFAULT_FORWARD_TIME)),
                max_age: mst.max_age.or(Some(DEFAULT_MAX_AGE)),
                max_hops: mst.max_hops.or(Some(DEFAULT_MAX_HOPS)),
            }),
        }
    }

    /// Whether the record carries no attributes besides its name
    pub fn is_empty(&self) -> bool {
        self.attribute_names().is_empty()
    }

    /// Names of the top-level attributes this record carries
    pub fn attribute_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut push = |present: bool, name: &'static str| {
            if present {
                names.push(name);
            }
        };
        push(self.mode.is_some(), "mode");
        push(self.pathcost_method.is_some(), "pathcost_method");
        push(self.bridge_assurance.is_some(), "bridge_assurance");
        push(self.loopguard_default.is_some(), "loopguard_default");
        push(
            self.port_type.as_ref().is_some_and(|p| !p.is_empty()),
            "port_type",
        );
        push(self.priority.is_some(), "priority");
        push(self.hello_time.is_some(), "hello_time");
        push(self.forward_time.is_some(), "forward_time");
        push(self.max_age.is_some(), "max_age");
        push(self.mst.as_ref().is_some_and(|m| !m.is_empty()), "mst");
        names
    }

    /// Validate the record against its scope and value ranges.
    pub fn validate(&self) -> Result<()> {
        let scope = self.scope()?;
        let fail = |message: String| Err(Error::invalid(&self.name, message));

        if scope != Scope::Global {
            let global_only = [
                ("mode", self.mode.is_some()),
                ("pathcost_method", self.pathcost_method.is_some()),
                ("bridge_assurance", self.bridge_assurance.is_some()),
                ("loopguard_default", self.loopguard_default.is_some()),
                ("port_type", self.port_type.is_some()),
                ("mst", self.mst.is_some()),
            ];
            if let Some((attr, _)) = global_only.iter().find(|(_, present)| *present) {
                return fail(format!("'{attr}' is only valid on the '{DEFAULT_NAME}' record"));
            }
        }

        if matches!(scope, Scope::Mst(_)) {
            let timers = [
                ("hello_time", self.hello_time.is_some()),
                ("forward_time", self.forward_time.is_some()),
                ("max_age", self.max_age.is_some()),
            ];
            if let Some((attr, _)) = timers.iter().find(|(_, present)| *present) {
                return fail(format!(
                    "'{attr}' is region-wide for MST; set mst.{attr} on the '{DEFAULT_NAME}' record"
                ));
            }
        }

        if let Some(priority) = self.priority
            && (priority > 61440 || priority % 4096 != 0)
        {
            return fail(format!(
                "priority {priority} must be a multiple of 4096 between 0 and 61440"
            ));
        }

        check_u8("hello_time", self.hello_time, 1, 10).or_else(fail)?;
        check_u8("forward_time", self.forward_time, 4, 30).or_else(fail)?;
        check_u8("max_age", self.max_age, 6, 40).or_else(fail)?;

        if let Some(mst) = &self.mst {
            check_u8("mst.hello_time", mst.hello_time, 1, 10).or_else(fail)?;
            check_u8("mst.forward_time", mst.forward_time, 4, 30).or_else(fail)?;
            check_u8("mst.max_age", mst.max_age, 6, 40).or_else(fail)?;
            check_u8("mst.max_hops", mst.max_hops, 1, 255).or_else(fail)?;

            if let Some(region) = &mst.name
                && (region.is_empty() || region.len() > 32 || region.contains(char::is_whitespace))
            {
                return fail(format!(
                    "mst.name '{region}' must be 1-32 characters without whitespace"
                ));
            }

            if let Some(instances) = &mst.instances {
                let mut seen = Vec::new();
                for instance in instances {
                    if instance.id == 0 || instance.id > 4094 {
                        return fail(format!(
                            "mst instance id {} must be between 1 and 4094",
                            instance.id
                        ));
                    }
                    if seen.contains(&instance.id) {
                        return fail(format!("mst instance {} declared twice", instance.id));
                    }
                    seen.push(instance.id);
                    validate_range(&instance.vlans, 1, 4094).or_else(fail)?;
                }
            }
        }

        Ok(())
    }
}

fn check_u8(attr: &str, value: Option<u8>, min: u8, max: u8) -> std::result::Result<(), String> {
    match value {
        Some(v) if v < min || v > max => Err(format!("{attr} {v} must be between {min} and {max}")),
        _ => Ok(()),
    }
}

/// Validate a range list such as `1-10,20,30-40`.
pub fn validate_range(range: &str, min: u16, max: u16) -> std::result::Result<(), String> {
    if range.is_empty() {
        return Err("empty range".to_string());
    }
    for part in range.split(',') {
        let (lo, hi) = match part.split_once('-') {
            Some((lo, hi)) => (lo, hi),
            None => (part, part),
        };
        let lo: u16 = lo
            .parse()
            .map_err(|_| format!("invalid range element '{part}'"))?;
        let hi: u16 = hi
            .parse()
            .map_err(|_| format!("invalid range element '{part}'"))?;
        if lo > hi || lo < min || hi > max {
            return Err(format!("range element '{part}' must lie within {min}-{max}"));
        }
    }
    Ok(())
}

/// Device family, which decides command syntax and supported features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformFamily {
    Nexus9000,
    Nexus7000,
    Nexus5000,
    Nexus3000,
    Generic,
}

/// Platform descriptor as reported by the device (e.g. `N9K-C93180YC-EX`)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Platform(String);

impl Platform {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn family(&self) -> PlatformFamily {
        let model = self.0.trim().to_uppercase();
        if model.starts_with("N9K") {
            PlatformFamily::Nexus9000
        } else if model.starts_with("N7K") || model.starts_with("N77") {
            PlatformFamily::Nexus7000
        } else if model.starts_with("N5K") || model.starts_with("N6K") {
            PlatformFamily::Nexus5000
        } else if model.starts_with("N3K") {
            PlatformFamily::Nexus3000
        } else {
            PlatformFamily::Generic
        }
    }

    pub fn supports_bridge_assurance(&self) -> bool {
        self.family() != PlatformFamily::Nexus3000
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
