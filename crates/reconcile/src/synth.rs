//! Command synthesis - turns records and deltas into device commands
//!
//! Commands are grouped in blocks. A block is either a single statement or
//! a context block (enter, body, exit) whose lines only make sense together.
//! Later stages may drop whole blocks but never reorder or split them.

use crate::diff::{self, Delta};
use crate::error::Result;
use crate::model::{Platform, PortType, Scope, SpanningTree};
use serde::Serialize;
use std::collections::HashSet;

const MST_CONFIGURATION: &str = "spanning-tree mst configuration";
const EXIT: &str = "exit";

/// An indivisible group of command lines
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommandBlock(Vec<String>);

impl CommandBlock {
    /// A block holding one statement
    pub fn line(command: impl Into<String>) -> Self {
        Self(vec![command.into()])
    }

    /// A block that enters a configuration context, runs `body` and exits
    pub fn context(enter: &str, body: Vec<String>, exit: &str) -> Self {
        let mut lines = Vec::with_capacity(body.len() + 2);
        lines.push(enter.to_string());
        lines.extend(body);
        lines.push(exit.to_string());
        Self(lines)
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }
}

/// An ordered list of command blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Commands(Vec<CommandBlock>);

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: CommandBlock) {
        self.0.push(block);
    }

    pub fn extend(&mut self, other: Commands) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn blocks(&self) -> &[CommandBlock] {
        &self.0
    }

    /// Flatten to the ordered statements sent to the device
    pub fn lines(&self) -> Vec<String> {
        self.0.iter().flat_map(|b| b.0.iter().cloned()).collect()
    }

    /// Drop blocks whose exact text also appears in `other`.
    ///
    /// Each shared block is removed once, at its first occurrence.
    pub fn without_shared(mut self, other: &Commands) -> Self {
        let theirs: HashSet<&CommandBlock> = other.0.iter().collect();
        let shared: Vec<CommandBlock> = self
            .0
            .iter()
            .filter(|b| theirs.contains(b))
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        for block in shared {
            if let Some(pos) = self.0.iter().position(|b| *b == block) {
                self.0.remove(pos);
            }
        }
        self
    }
}

impl From<Vec<CommandBlock>> for Commands {
    fn from(blocks: Vec<CommandBlock>) -> Self {
        Self(blocks)
    }
}

/// Commands converging the matching `have` record to `want`.
///
/// A `want` without a match in `have` is synthesized against a device left
/// at factory defaults.
pub fn synthesize(want: &SpanningTree, have: &[SpanningTree], platform: &Platform) -> Result<Commands> {
    let placeholder = SpanningTree::named(want.name.clone());
    let current = diff::find(&want.name, have).unwrap_or(&placeholder);
    let delta = diff::diff(want, current);
    log::debug!(
        "{}: setting {:?}",
        want.name,
        delta.attribute_names()
    );
    set_commands(&delta, platform)
}

/// Commands that set every attribute carried by `delta`.
pub fn set_commands(delta: &Delta, platform: &Platform) -> Result<Commands> {
    let scope = delta.scope()?;
    let mut cmds = Commands::new();
    let mut line = |s: String| cmds.push(CommandBlock::line(s));

    if let Some(mode) = delta.mode {
        line(format!("spanning-tree mode {}", mode.keyword()));
    }
    if let Some(method) = delta.pathcost_method {
        line(format!("spanning-tree pathcost method {}", method.keyword()));
    }
    if let Some(enabled) = delta.bridge_assurance
        && platform.supports_bridge_assurance()
    {
        line(toggle(enabled, "spanning-tree bridge assurance"));
    }
    if let Some(enabled) = delta.loopguard_default {
        line(toggle(enabled, "spanning-tree loopguard default"));
    }
    if let Some(port_type) = &delta.port_type {
        match port_type.default {
            Some(PortType::Edge) => line("spanning-tree port type edge default".to_string()),
            Some(PortType::Network) => line("spanning-tree port type network default".to_string()),
            Some(PortType::Normal) => {
                line("no spanning-tree port type edge default".to_string());
                line("no spanning-tree port type network default".to_string());
            }
            None => {}
        }
        if let Some(enabled) = port_type.edge_bpduguard {
            line(toggle(enabled, "spanning-tree port type edge bpduguard default"));
        }
        if let Some(enabled) = port_type.edge_bpdufilter {
            line(toggle(enabled, "spanning-tree port type edge bpdufilter default"));
        }
    }
    if let Some(priority) = delta.priority {
        line(format!("{} priority {priority}", target(&scope)));
    }
    if let Some(vlans) = scope.vlans() {
        for (attr, value) in timers(delta) {
            line(format!("spanning-tree vlan {vlans} {attr} {value}"));
        }
    }

    if let Some(mst) = &delta.mst {
        for (attr, value) in [
            ("hello-time", mst.hello_time),
            ("forward-time", mst.forward_time),
            ("max-age", mst.max_age),
            ("max-hops", mst.max_hops),
        ] {
            if let Some(value) = value {
                line(format!("spanning-tree mst {attr} {value}"));
            }
        }

        if mst.has_region() {
            let mut body = Vec::new();
            if let Some(name) = &mst.name {
                body.push(format!("name {name}"));
            }
            if let Some(revision) = mst.revision {
                body.push(format!("revision {revision}"));
            }
            for instance in mst.instances.iter().flatten() {
                body.push(format!("instance {} vlan {}", instance.id, instance.vlans));
            }
            cmds.push(CommandBlock::context(MST_CONFIGURATION, body, EXIT));
        }
    }

    Ok(cmds)
}

/// Commands that remove or reset every attribute named in `delta`.
///
/// Only attribute presence (and MST instance ids) is consulted, never the
/// values, so no `have` lookup is needed.
pub fn negate(delta: &Delta, platform: &Platform) -> Result<Commands> {
    let scope = delta.scope()?;
    let mut cmds = Commands::new();
    let mut line = |s: String| cmds.push(CommandBlock::line(s));

    if delta.mode.is_some() {
        line("no spanning-tree mode".to_string());
    }
    if delta.pathcost_method.is_some() {
        line("no spanning-tree pathcost method".to_string());
    }
    if delta.bridge_assurance.is_some() && platform.supports_bridge_assurance() {
        // Bridge assurance is enabled by default
        line("spanning-tree bridge assurance".to_string());
    }
    if delta.loopguard_default.is_some() {
        line("no spanning-tree loopguard default".to_string());
    }
    if let Some(port_type) = &delta.port_type {
        if port_type.default.is_some() {
            line("no spanning-tree port type edge default".to_string());
            line("no spanning-tree port type network default".to_string());
        }
        if port_type.edge_bpduguard.is_some() {
            line("no spanning-tree port type edge bpduguard default".to_string());
        }
        if port_type.edge_bpdufilter.is_some() {
            line("no spanning-tree port type edge bpdufilter default".to_string());
        }
    }
    if delta.priority.is_some() {
        line(format!("no {} priority", target(&scope)));
    }
    if let Some(vlans) = scope.vlans() {
        for (attr, _) in timers(delta) {
            line(format!("no spanning-tree vlan {vlans} {attr}"));
        }
    }

    if let Some(mst) = &delta.mst {
        for (attr, present) in [
            ("hello-time", mst.hello_time.is_some()),
            ("forward-time", mst.forward_time.is_some()),
            ("max-age", mst.max_age.is_some()),
            ("max-hops", mst.max_hops.is_some()),
        ] {
            if present {
                line(format!("no spanning-tree mst {attr}"));
            }
        }

        if mst.has_region() {
            let mut body = Vec::new();
            if mst.name.is_some() {
                body.push("no name".to_string());
            }
            if mst.revision.is_some() {
                body.push("no revision".to_string());
            }
            for instance in mst.instances.iter().flatten() {
                body.push(format!("no instance {}", instance.id));
            }
            cmds.push(CommandBlock::context(MST_CONFIGURATION, body, EXIT));
        }
    }

    Ok(cmds)
}

/// Advisory messages for attributes the platform cannot apply.
pub fn platform_warnings(record: &SpanningTree, platform: &Platform) -> Vec<String> {
    let mut warnings = Vec::new();
    if record.bridge_assurance.is_some() && !platform.supports_bridge_assurance() {
        warnings.push(format!(
            "{}: bridge_assurance is not supported on platform '{}' and was skipped",
            record.name, platform
        ));
    }
    warnings
}

fn toggle(enabled: bool, command: &str) -> String {
    if enabled {
        command.to_string()
    } else {
        format!("no {command}")
    }
}

fn target(scope: &Scope) -> String {
    match scope {
        Scope::Mst(instances) => format!("spanning-tree mst {instances}"),
        _ => format!(
            "spanning-tree vlan {}",
            scope.vlans().unwrap_or(crate::model::ALL_VLANS)
        ),
    }
}

fn timers(record: &SpanningTree) -> Vec<(&'static str, u8)> {
    [
        ("hello-time", record.hello_time),
        ("forward-time", record.forward_time),
        ("max-age", record.max_age),
    ]
    .into_iter()
    .filter_map(|(attr, value)| value.map(|v| (attr, v)))
    .collect()
}
