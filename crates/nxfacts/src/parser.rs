//! Parser for NX-OS spanning-tree running-config.
//!
//! Handles the output of `show running-config spanning-tree`:
//! ```text
//! spanning-tree mode mst
//! spanning-tree pathcost method long
//! no spanning-tree bridge assurance
//! spanning-tree port type edge bpduguard default
//! spanning-tree vlan 1-3967 priority 4096
//! spanning-tree vlan 10-20 hello-time 4
//! spanning-tree mst 0-1 priority 8192
//! spanning-tree mst max-hops 30
//! spanning-tree mst configuration
//!   name DC1
//!   revision 2
//!   instance 1 vlan 10-20
//! interface Ethernet1/1
//!   spanning-tree port type edge
//! ```
//!
//! Interface sections and unknown statements are skipped.

use crate::error::{Error, Result};
use regex::Regex;
use reconcile::{
    ALL_VLANS, DEFAULT_NAME, MstConfig, MstInstance, PathcostMethod, PortType, PortTypeDefaults,
    SpanningTree, StpMode,
};
use std::str::FromStr;
use std::sync::LazyLock;

struct Patterns {
    mode: Regex,
    pathcost: Regex,
    bridge_assurance: Regex,
    loopguard: Regex,
    port_type_default: Regex,
    edge_guard: Regex,
    vlan_attr: Regex,
    mst_priority: Regex,
    mst_timer: Regex,
    region_name: Regex,
    region_revision: Regex,
    region_instance: Regex,
}

impl Patterns {
    fn compile() -> Self {
        Self {
            mode: pattern(r"^spanning-tree mode (\S+)$"),
            pathcost: pattern(r"^spanning-tree pathcost method (\S+)$"),
            bridge_assurance: pattern(r"^(no )?spanning-tree bridge assurance$"),
            loopguard: pattern(r"^(no )?spanning-tree loopguard default$"),
            port_type_default: pattern(r"^spanning-tree port type (edge|network) default$"),
            edge_guard: pattern(r"^(no )?spanning-tree port type edge (bpduguard|bpdufilter) default$"),
            vlan_attr: pattern(
                r"^spanning-tree vlan (\S+) (priority|hello-time|forward-time|max-age) (\d+)$",
            ),
            mst_priority: pattern(r"^spanning-tree mst (\S+) priority (\d+)$"),
            mst_timer: pattern(r"^spanning-tree mst (hello-time|forward-time|max-age|max-hops) (\d+)$"),
            region_name: pattern(r"^name (\S+)$"),
            region_revision: pattern(r"^revision (\d+)$"),
            region_instance: pattern(r"^instance (\d+) vlan (\S+)$"),
        }
    }
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(Patterns::compile);

// Statement patterns are literals exercised by every parse.
fn pattern(source: &str) -> Regex {
    Regex::new(source).unwrap_or_else(|e| panic!("invalid statement pattern {source}: {e}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Top,
    Region,
    Other,
}

/// Parse running-config text into records.
///
/// The `default` record comes first, followed by `vlan` and `mst` records
/// in order of first appearance. Records without attributes are omitted.
pub fn parse_string(content: &str) -> Result<Vec<SpanningTree>> {
    let patterns = &*PATTERNS;
    let mut records = vec![SpanningTree::named(DEFAULT_NAME)];
    let mut section = Section::Top;

    for (index, raw) in content.lines().enumerate() {
        let line_num = index + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('!') || line.starts_with('#') {
            continue;
        }

        let indented = raw.starts_with(char::is_whitespace);
        if indented {
            match section {
                Section::Region => parse_region_line(patterns, line, line_num, &mut records[0])?,
                Section::Other | Section::Top => {
                    log::trace!("line {line_num}: skipping '{line}'");
                }
            }
            continue;
        }

        if line == "exit" {
            section = Section::Top;
            continue;
        }

        section = if line == "spanning-tree mst configuration" {
            mst(&mut records[0]);
            Section::Region
        } else if parse_top_line(patterns, line, line_num, &mut records)? {
            Section::Top
        } else {
            log::trace!("line {line_num}: skipping '{line}'");
            Section::Other
        };
    }

    records.retain(|r| !r.is_empty());
    for record in &records {
        record.validate()?;
    }
    log::debug!("parsed {} spanning-tree record(s)", records.len());
    Ok(records)
}

/// Parse one top-level statement. Returns false for unknown statements.
fn parse_top_line(
    patterns: &Patterns,
    line: &str,
    line_num: usize,
    records: &mut Vec<SpanningTree>,
) -> Result<bool> {
    let global = 0;

    if let Some(caps) = patterns.mode.captures(line) {
        records[global].mode = Some(
            StpMode::from_keyword(&caps[1])
                .ok_or_else(|| parse_error(line_num, format!("unknown mode '{}'", &caps[1])))?,
        );
    } else if let Some(caps) = patterns.pathcost.captures(line) {
        records[global].pathcost_method = Some(
            PathcostMethod::from_keyword(&caps[1]).ok_or_else(|| {
                parse_error(line_num, format!("unknown pathcost method '{}'", &caps[1]))
            })?,
        );
    } else if let Some(caps) = patterns.bridge_assurance.captures(line) {
        records[global].bridge_assurance = Some(caps.get(1).is_none());
    } else if let Some(caps) = patterns.loopguard.captures(line) {
        records[global].loopguard_default = Some(caps.get(1).is_none());
    } else if let Some(caps) = patterns.port_type_default.captures(line) {
        port_type(&mut records[global]).default = Some(match &caps[1] {
            "edge" => PortType::Edge,
            _ => PortType::Network,
        });
    } else if let Some(caps) = patterns.edge_guard.captures(line) {
        let enabled = Some(caps.get(1).is_none());
        let defaults = port_type(&mut records[global]);
        match &caps[2] {
            "bpduguard" => defaults.edge_bpduguard = enabled,
            _ => defaults.edge_bpdufilter = enabled,
        }
    } else if let Some(caps) = patterns.vlan_attr.captures(line) {
        let name = if &caps[1] == ALL_VLANS {
            DEFAULT_NAME.to_string()
        } else {
            format!("vlan {}", &caps[1])
        };
        let record = record_mut(records, &name);
        match &caps[2] {
            "priority" => record.priority = Some(number(&caps[3], line_num)?),
            "hello-time" => record.hello_time = Some(number(&caps[3], line_num)?),
            "forward-time" => record.forward_time = Some(number(&caps[3], line_num)?),
            _ => record.max_age = Some(number(&caps[3], line_num)?),
        }
    } else if let Some(caps) = patterns.mst_priority.captures(line) {
        let record = record_mut(records, &format!("mst {}", &caps[1]));
        record.priority = Some(number(&caps[2], line_num)?);
    } else if let Some(caps) = patterns.mst_timer.captures(line) {
        let value = Some(number(&caps[2], line_num)?);
        let region = mst(&mut records[global]);
        match &caps[1] {
            "hello-time" => region.hello_time = value,
            "forward-time" => region.forward_time = value,
            "max-age" => region.max_age = value,
            _ => region.max_hops = value,
        }
    } else {
        return Ok(false);
    }
    Ok(true)
}

fn parse_region_line(
    patterns: &Patterns,
    line: &str,
    line_num: usize,
    global: &mut SpanningTree,
) -> Result<()> {
    let region = mst(global);
    if let Some(caps) = patterns.region_name.captures(line) {
        region.name = Some(caps[1].to_string());
    } else if let Some(caps) = patterns.region_revision.captures(line) {
        region.revision = Some(number(&caps[1], line_num)?);
    } else if let Some(caps) = patterns.region_instance.captures(line) {
        let id: u16 = number(&caps[1], line_num)?;
        let instances = region.instances.get_or_insert_with(Vec::new);
        match instances.iter_mut().find(|i| i.id == id) {
            Some(existing) => {
                existing.vlans = format!("{},{}", existing.vlans, &caps[2]);
            }
            None => instances.push(MstInstance {
                id,
                vlans: caps[2].to_string(),
            }),
        }
    } else {
        log::trace!("line {line_num}: skipping region statement '{line}'");
    }
    Ok(())
}

fn record_mut<'a>(records: &'a mut Vec<SpanningTree>, name: &str) -> &'a mut SpanningTree {
    match records.iter().position(|r| r.name == name) {
        Some(pos) => &mut records[pos],
        None => {
            records.push(SpanningTree::named(name));
            let last = records.len() - 1;
            &mut records[last]
        }
    }
}

fn port_type(record: &mut SpanningTree) -> &mut PortTypeDefaults {
    record.port_type.get_or_insert_with(PortTypeDefaults::default)
}

fn mst(record: &mut SpanningTree) -> &mut MstConfig {
    record.mst.get_or_insert_with(MstConfig::default)
}

fn number<T: FromStr>(value: &str, line_num: usize) -> Result<T> {
    value
        .parse()
        .map_err(|_| parse_error(line_num, format!("value '{value}' out of range")))
}

fn parse_error(line: usize, message: String) -> Error {
    Error::Parse { line, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNNING_CONFIG: &str = "\
!Command: show running-config spanning-tree
!Running configuration last done at: Mon Oct 12 09:14:02 2026

version 10.3(4a) Bios:version 05.47
spanning-tree mode mst
spanning-tree pathcost method long
no spanning-tree bridge assurance
spanning-tree port type edge bpduguard default
spanning-tree vlan 1-3967 priority 4096
spanning-tree vlan 10-20 hello-time 4
spanning-tree mst 0-1 priority 8192
spanning-tree mst max-hops 30
spanning-tree mst configuration
  name DC1
  revision 2
  instance 1 vlan 10-20
  instance 2 vlan 30
interface Ethernet1/1
  spanning-tree port type edge
";

    #[test]
    fn test_parse_full_config() {
        let records = parse_string(RUNNING_CONFIG).unwrap();
        assert_eq!(records.len(), 3);

        let global = &records[0];
        assert_eq!(global.name, "default");
        assert_eq!(global.mode, Some(StpMode::Mst));
        assert_eq!(global.pathcost_method, Some(PathcostMethod::Long));
        assert_eq!(global.bridge_assurance, Some(false));
        assert_eq!(global.priority, Some(4096));
        assert_eq!(
            global.port_type.as_ref().and_then(|p| p.edge_bpduguard),
            Some(true)
        );

        let region = global.mst.as_ref().unwrap();
        assert_eq!(region.name.as_deref(), Some("DC1"));
        assert_eq!(region.revision, Some(2));
        assert_eq!(region.max_hops, Some(30));
        assert_eq!(region.instances.as_ref().map(Vec::len), Some(2));

        assert_eq!(records[1].name, "vlan 10-20");
        assert_eq!(records[1].hello_time, Some(4));
        assert_eq!(records[2].name, "mst 0-1");
        assert_eq!(records[2].priority, Some(8192));
    }

    #[test]
    fn test_interface_lines_are_not_global() {
        let records = parse_string("interface Ethernet1/1\n  spanning-tree port type edge default\n").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_empty_config() {
        assert!(parse_string("").unwrap().is_empty());
        assert!(parse_string("!Command: show running-config spanning-tree\n").unwrap().is_empty());
    }

    #[test]
    fn test_repeated_instance_lines_merge() {
        let records = parse_string(
            "spanning-tree mst configuration\n  instance 1 vlan 10\n  instance 1 vlan 20-30\nexit\n",
        )
        .unwrap();
        let instances = records[0].mst.as_ref().unwrap().instances.clone().unwrap();
        assert_eq!(
            instances,
            vec![MstInstance {
                id: 1,
                vlans: "10,20-30".into()
            }]
        );
    }

    #[test]
    fn test_unknown_mode_is_error() {
        let err = parse_string("spanning-tree mode pvst\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn test_out_of_range_value_is_error() {
        let err = parse_string("spanning-tree vlan 10 hello-time 900\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        let err = parse_string("spanning-tree vlan 10 hello-time 90\n").unwrap_err();
        assert!(matches!(err, Error::Record(_)));
    }

    #[test]
    fn test_loopguard_and_port_type() {
        let records = parse_string(
            "spanning-tree loopguard default\nspanning-tree port type network default\n",
        )
        .unwrap();
        assert_eq!(records[0].loopguard_default, Some(true));
        assert_eq!(
            records[0].port_type.as_ref().and_then(|p| p.default),
            Some(PortType::Network)
        );
    }

    #[test]
    fn test_merged_converges_after_reparse() {
        use reconcile::{Platform, State, set_state};

        let platform = Platform::new("N9K-C93180YC-EX");
        let want = vec![SpanningTree {
            bridge_assurance: Some(true),
            loopguard_default: Some(false),
            priority: Some(4096),
            port_type: Some(PortTypeDefaults {
                default: Some(PortType::Normal),
                edge_bpduguard: Some(false),
                edge_bpdufilter: Some(false),
            }),
            ..SpanningTree::named(DEFAULT_NAME)
        }];

        let first = set_state(State::Merged, &want, &parse_string("").unwrap(), &platform).unwrap();
        assert_eq!(first.lines(), vec!["spanning-tree vlan 1-3967 priority 4096"]);

        // The applied commands are what the device shows afterwards
        let device = parse_string(&first.lines().join("\n")).unwrap();
        let second = set_state(State::Merged, &want, &device, &platform).unwrap();
        assert!(second.is_empty(), "{:?}", second.lines());
    }

    #[test]
    fn test_replaced_round_trip_is_idempotent() {
        use reconcile::{Platform, State, set_state};

        let platform = Platform::new("N9K-C93180YC-EX");
        let device = parse_string(RUNNING_CONFIG).unwrap();
        let cmds = set_state(State::Replaced, &device, &device, &platform).unwrap();
        assert!(cmds.is_empty(), "{:?}", cmds.lines());
    }
}
