//! Diff computation between declared and observed records
//!
//! [`diff`] is one-sided: only attributes present in `want` are compared,
//! so an attribute the caller did not mention is never set. [`stale`] is
//! the reverse view used when a record is replaced.

use crate::model::{MstConfig, MstInstance, PortTypeDefaults, SpanningTree};

/// Attribute-level difference between two records.
///
/// Shares the record type; it always carries the target `name`.
pub type Delta = SpanningTree;

/// Find a record by exact name.
pub fn find<'a>(name: &str, collection: &'a [SpanningTree]) -> Option<&'a SpanningTree> {
    collection.iter().find(|r| r.name == name)
}

/// Attributes of `want` that differ from `have`.
///
/// An attribute `have` does not show is compared at its factory default.
pub fn diff(want: &SpanningTree, have: &SpanningTree) -> Delta {
    compare(want, &have.with_defaults())
}

/// Attributes `have` carries that `want` omits or sets differently.
///
/// Values are those of `have`; MST instances are matched per id, so
/// instances missing from `want` are included.
pub fn stale(want: &SpanningTree, have: &SpanningTree) -> Delta {
    Delta {
        name: want.name.clone(),
        ..compare(have, want)
    }
}

// Attributes of `left` missing from or different in `right`.
fn compare(left: &SpanningTree, right: &SpanningTree) -> Delta {
    SpanningTree {
        name: left.name.clone(),
        mode: changed(&left.mode, &right.mode),
        pathcost_method: changed(&left.pathcost_method, &right.pathcost_method),
        bridge_assurance: changed(&left.bridge_assurance, &right.bridge_assurance),
        loopguard_default: changed(&left.loopguard_default, &right.loopguard_default),
        port_type: left
            .port_type
            .as_ref()
            .map(|l| diff_port_type(l, right.port_type.as_ref()))
            .filter(|p| !p.is_empty()),
        priority: changed(&left.priority, &right.priority),
        hello_time: changed(&left.hello_time, &right.hello_time),
        forward_time: changed(&left.forward_time, &right.forward_time),
        max_age: changed(&left.max_age, &right.max_age),
        mst: left
            .mst
            .as_ref()
            .map(|l| diff_mst(l, right.mst.as_ref()))
            .filter(|m| !m.is_empty()),
    }
}

/// Restrict a delta to the attributes `have` actually carries.
///
/// Values stay those of the delta; only presence is taken from `have`.
pub fn present_in(delta: &Delta, have: &SpanningTree) -> Delta {
    SpanningTree {
        name: delta.name.clone(),
        mode: carried(&delta.mode, &have.mode),
        pathcost_method: carried(&delta.pathcost_method, &have.pathcost_method),
        bridge_assurance: carried(&delta.bridge_assurance, &have.bridge_assurance),
        loopguard_default: carried(&delta.loopguard_default, &have.loopguard_default),
        port_type: match (&delta.port_type, &have.port_type) {
            (Some(d), Some(h)) => Some(PortTypeDefaults {
                default: carried(&d.default, &h.default),
                edge_bpduguard: carried(&d.edge_bpduguard, &h.edge_bpduguard),
                edge_bpdufilter: carried(&d.edge_bpdufilter, &h.edge_bpdufilter),
            })
            .filter(|p| !p.is_empty()),
            _ => None,
        },
        priority: carried(&delta.priority, &have.priority),
        hello_time: carried(&delta.hello_time, &have.hello_time),
        forward_time: carried(&delta.forward_time, &have.forward_time),
        max_age: carried(&delta.max_age, &have.max_age),
        mst: match (&delta.mst, &have.mst) {
            (Some(d), Some(h)) => Some(MstConfig {
                name: carried(&d.name, &h.name),
                revision: carried(&d.revision, &h.revision),
                instances: d.instances.as_ref().and_then(|instances| {
                    let kept: Vec<MstInstance> = instances
                        .iter()
                        .filter(|i| h.instance(i.id).is_some())
                        .cloned()
                        .collect();
                    (!kept.is_empty()).then_some(kept)
                }),
                hello_time: carried(&d.hello_time, &h.hello_time),
                forward_time: carried(&d.forward_time, &h.forward_time),
                max_age: carried(&d.max_age, &h.max_age),
                max_hops: carried(&d.max_hops, &h.max_hops),
            })
            .filter(|m| !m.is_empty()),
            _ => None,
        },
    }
}

fn changed<T: PartialEq + Clone>(left: &Option<T>, right: &Option<T>) -> Option<T> {
    match left {
        Some(l) if right.as_ref() != Some(l) => Some(l.clone()),
        _ => None,
    }
}

fn carried<T: Clone>(delta: &Option<T>, have: &Option<T>) -> Option<T> {
    have.as_ref().and(delta.clone())
}

fn diff_port_type(left: &PortTypeDefaults, right: Option<&PortTypeDefaults>) -> PortTypeDefaults {
    let empty = PortTypeDefaults::default();
    let right = right.unwrap_or(&empty);
    PortTypeDefaults {
        default: changed(&left.default, &right.default),
        edge_bpduguard: changed(&left.edge_bpduguard, &right.edge_bpduguard),
        edge_bpdufilter: changed(&left.edge_bpdufilter, &right.edge_bpdufilter),
    }
}

fn diff_mst(left: &MstConfig, right: Option<&MstConfig>) -> MstConfig {
    let empty = MstConfig::default();
    let right = right.unwrap_or(&empty);

    // Instances compare per id, not as a whole list
    let instances = left.instances.as_ref().and_then(|instances| {
        let differing: Vec<MstInstance> = instances
            .iter()
            .filter(|l| right.instance(l.id) != Some(*l))
            .cloned()
            .collect();
        (!differing.is_empty()).then_some(differing)
    });

    MstConfig {
        name: changed(&left.name, &right.name),
        revision: changed(&left.revision, &right.revision),
        instances,
        hello_time: changed(&left.hello_time, &right.hello_time),
        forward_time: changed(&left.forward_time, &right.forward_time),
        max_age: changed(&left.max_age, &right.max_age),
        max_hops: changed(&left.max_hops, &right.max_hops),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StpMode;

    fn record(name: &str) -> SpanningTree {
        SpanningTree::named(name)
    }

    #[test]
    fn test_find() {
        let have = vec![record("default"), record("vlan 10")];
        assert_eq!(find("vlan 10", &have).map(|r| r.name.as_str()), Some("vlan 10"));
        assert!(find("vlan 20", &have).is_none());
        assert!(find("vlan 10", &[]).is_none());
    }

    #[test]
    fn test_diff_ignores_attributes_absent_from_want() {
        let mut want = record("default");
        want.priority = Some(4096);
        let mut have = record("default");
        have.priority = Some(32768);
        have.mode = Some(StpMode::RapidPvst);

        let delta = diff(&want, &have);
        assert_eq!(delta.name, "default");
        assert_eq!(delta.priority, Some(4096));
        assert_eq!(delta.mode, None);
        assert_eq!(delta.attribute_names(), vec!["priority"]);
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let mut want = record("default");
        want.mode = Some(StpMode::Mst);
        want.loopguard_default = Some(true);
        let delta = diff(&want, &want.clone());
        assert!(delta.is_empty());
        assert_eq!(delta.name, "default");
    }

    #[test]
    fn test_diff_against_empty_have_is_want() {
        let mut want = record("vlan 10");
        want.priority = Some(8192);
        want.hello_time = Some(4);
        assert_eq!(diff(&want, &record("vlan 10")), want);
    }

    #[test]
    fn test_diff_nested_groups() {
        let mut want = record("default");
        want.port_type = Some(PortTypeDefaults {
            edge_bpduguard: Some(true),
            edge_bpdufilter: Some(true),
            ..Default::default()
        });
        let mut have = record("default");
        have.port_type = Some(PortTypeDefaults {
            edge_bpduguard: Some(true),
            default: Some(crate::model::PortType::Edge),
            ..Default::default()
        });

        let delta = diff(&want, &have);
        let port_type = delta.port_type.unwrap();
        assert_eq!(port_type.edge_bpduguard, None);
        assert_eq!(port_type.edge_bpdufilter, Some(true));
        assert_eq!(port_type.default, None);
    }

    #[test]
    fn test_diff_mst_instances_per_id() {
        let instance = |id, vlans: &str| MstInstance {
            id,
            vlans: vlans.to_string(),
        };
        let mut want = record("default");
        want.mst = Some(MstConfig {
            instances: Some(vec![instance(1, "10-20"), instance(2, "30")]),
            ..Default::default()
        });
        let mut have = record("default");
        have.mst = Some(MstConfig {
            name: Some("REGION".into()),
            instances: Some(vec![instance(1, "10-20"), instance(2, "30-40")]),
            ..Default::default()
        });

        let delta = diff(&want, &have);
        let mst = delta.mst.unwrap();
        assert_eq!(mst.instances, Some(vec![instance(2, "30")]));
        assert_eq!(mst.name, None);
    }

    #[test]
    fn test_present_in_drops_attributes_have_lacks() {
        let mut delta = record("default");
        delta.priority = Some(4096);
        delta.hello_time = Some(3);
        let mut have = record("default");
        have.priority = Some(32768);

        let restricted = present_in(&delta, &have);
        assert_eq!(restricted.priority, Some(4096));
        assert_eq!(restricted.hello_time, None);
    }

    #[test]
    fn test_diff_treats_unshown_as_default() {
        let mut want = record("default");
        want.bridge_assurance = Some(true);
        want.loopguard_default = Some(false);
        want.mode = Some(StpMode::RapidPvst);
        want.port_type = Some(PortTypeDefaults {
            default: Some(crate::model::PortType::Normal),
            edge_bpduguard: Some(false),
            edge_bpdufilter: Some(false),
        });
        want.priority = Some(32768);

        assert!(diff(&want, &record("default")).is_empty());
    }

    #[test]
    fn test_stale_includes_attributes_want_omits() {
        let mut want = record("default");
        want.priority = Some(4096);
        let mut have = record("default");
        have.priority = Some(4096);
        have.mode = Some(StpMode::Mst);

        let stale = stale(&want, &have);
        assert_eq!(stale.name, "default");
        assert_eq!(stale.attribute_names(), vec!["mode"]);
        assert_eq!(stale.mode, Some(StpMode::Mst));
    }

    #[test]
    fn test_stale_takes_values_from_have() {
        let mut want = record("vlan 10");
        want.priority = Some(4096);
        let mut have = record("vlan 10");
        have.priority = Some(8192);
        have.hello_time = Some(4);

        let stale = stale(&want, &have);
        assert_eq!(stale.priority, Some(8192));
        assert_eq!(stale.hello_time, Some(4));
    }

    #[test]
    fn test_stale_mst_instances_missing_from_want() {
        let instance = |id, vlans: &str| MstInstance {
            id,
            vlans: vlans.to_string(),
        };
        let mut want = record("default");
        want.mst = Some(MstConfig {
            instances: Some(vec![instance(1, "10-20")]),
            ..Default::default()
        });
        let mut have = record("default");
        have.mst = Some(MstConfig {
            name: Some("REGION".into()),
            instances: Some(vec![instance(1, "10-20"), instance(2, "30")]),
            ..Default::default()
        });

        let mst = stale(&want, &have).mst.unwrap();
        assert_eq!(mst.instances, Some(vec![instance(2, "30")]));
        assert_eq!(mst.name.as_deref(), Some("REGION"));
    }
}
