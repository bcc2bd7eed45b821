//! Module runner - one reconciliation run from facts to report

use crate::context::{GatherSubset, ModuleContext, RESOURCES};
use crate::error::{Error, Result};
use crate::model::{Platform, SpanningTree};
use crate::state::{State, set_state};
use crate::synth::platform_warnings;
use serde::{Deserialize, Serialize};

/// Parameters of one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Invocation {
    #[serde(default)]
    pub state: State,

    /// Declared records
    #[serde(default)]
    pub config: Vec<SpanningTree>,

    /// Raw running-config, required for `parsed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_config: Option<String>,

    /// Compute and report, but do not apply
    #[serde(default)]
    pub check_mode: bool,

    /// Platform assumed when no facts are gathered (rendered)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

/// Report of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleResult {
    pub changed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Vec<SpanningTree>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Vec<SpanningTree>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gathered: Option<Vec<SpanningTree>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Vec<SpanningTree>>,

    pub warnings: Vec<String>,
}

/// Run one invocation against the given collaborators.
pub fn execute(invocation: &Invocation, ctx: &mut ModuleContext<'_>) -> Result<ModuleResult> {
    let state = invocation.state;
    let mut result = ModuleResult::default();
    let mut warnings = Vec::new();
    let mut commands = Vec::new();

    let running_config = invocation
        .running_config
        .as_deref()
        .filter(|raw| !raw.trim().is_empty());
    if state == State::Parsed && running_config.is_none() {
        return Err(Error::MissingRunningConfig);
    }

    let (existing, platform) = if state.is_action() {
        let facts = ctx.facts.get_facts(GatherSubset::Min, RESOURCES, None)?;
        (facts.records, facts.platform)
    } else {
        (Vec::new(), invocation.platform.clone().unwrap_or_default())
    };
    log::info!(
        "state {state}: {} declared, {} observed, platform '{platform}'",
        invocation.config.len(),
        existing.len()
    );

    if state.is_action() || state == State::Rendered {
        commands = set_state(state, &invocation.config, &existing, &platform)?.lines();
        for record in &invocation.config {
            warnings.extend(platform_warnings(record, &platform));
        }
    }

    if !commands.is_empty() && state.is_action() {
        if invocation.check_mode {
            log::info!("check mode: {} command(s) not applied", commands.len());
        } else {
            ctx.executor.apply(&commands)?;
        }
        result.changed = true;
    }

    match state {
        _ if state.is_action() => {
            result.before = Some(existing);
            if result.changed {
                let facts = ctx.facts.get_facts(GatherSubset::Min, RESOURCES, None)?;
                result.after = Some(facts.records);
            }
            result.commands = Some(commands);
        }
        State::Gathered => {
            let facts = ctx.facts.get_facts(GatherSubset::None, RESOURCES, None)?;
            result.gathered = Some(facts.records);
        }
        State::Rendered => result.rendered = Some(commands),
        State::Parsed => {
            let facts = ctx
                .facts
                .get_facts(GatherSubset::None, RESOURCES, running_config)?;
            result.parsed = Some(facts.records);
        }
        _ => {}
    }

    result.warnings = warnings;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CommandExecutor, FactSource, Facts, NoExecutor};
    use crate::model::StpMode;

    /// Fact source backed by a list of snapshots, one per call
    struct Snapshots {
        snapshots: Vec<Vec<SpanningTree>>,
        calls: Vec<(GatherSubset, Option<String>)>,
    }

    impl Snapshots {
        fn new(snapshots: Vec<Vec<SpanningTree>>) -> Self {
            Self {
                snapshots,
                calls: Vec::new(),
            }
        }
    }

    impl FactSource for Snapshots {
        fn get_facts(
            &mut self,
            subset: GatherSubset,
            _resources: &[&str],
            data: Option<&str>,
        ) -> Result<Facts> {
            self.calls.push((subset, data.map(str::to_string)));
            let records = if self.snapshots.len() > 1 {
                self.snapshots.remove(0)
            } else {
                self.snapshots.first().cloned().unwrap_or_default()
            };
            Ok(Facts {
                records,
                platform: Platform::new("N9K-C9336C-FX2"),
            })
        }
    }

    #[derive(Default)]
    struct Recorder {
        applied: Vec<Vec<String>>,
    }

    impl CommandExecutor for Recorder {
        fn apply(&mut self, commands: &[String]) -> Result<()> {
            self.applied.push(commands.to_vec());
            Ok(())
        }
    }

    fn priority(value: u32) -> SpanningTree {
        SpanningTree {
            priority: Some(value),
            ..SpanningTree::named("default")
        }
    }

    fn invocation(state: State, config: Vec<SpanningTree>) -> Invocation {
        Invocation {
            state,
            config,
            ..Default::default()
        }
    }

    #[test]
    fn test_merged_applies_and_reports() {
        let mut facts = Snapshots::new(vec![vec![priority(32768)], vec![priority(4096)]]);
        let mut executor = Recorder::default();
        let mut ctx = ModuleContext::new(&mut facts, &mut executor);

        let result = execute(&invocation(State::Merged, vec![priority(4096)]), &mut ctx).unwrap();

        assert!(result.changed);
        assert_eq!(
            result.commands,
            Some(vec!["spanning-tree vlan 1-3967 priority 4096".to_string()])
        );
        assert_eq!(result.before, Some(vec![priority(32768)]));
        assert_eq!(result.after, Some(vec![priority(4096)]));
        assert!(result.gathered.is_none());
        assert_eq!(executor.applied.len(), 1);
    }

    #[test]
    fn test_no_change_skips_apply_and_after() {
        let mut facts = Snapshots::new(vec![vec![priority(4096)]]);
        let mut executor = Recorder::default();
        let mut ctx = ModuleContext::new(&mut facts, &mut executor);

        let result = execute(&invocation(State::Merged, vec![priority(4096)]), &mut ctx).unwrap();

        assert!(!result.changed);
        assert_eq!(result.commands, Some(vec![]));
        assert!(result.after.is_none());
        assert!(executor.applied.is_empty());
        assert_eq!(facts.calls.len(), 1);
    }

    #[test]
    fn test_check_mode_does_not_apply() {
        let mut facts = Snapshots::new(vec![vec![]]);
        let mut executor = Recorder::default();
        let mut ctx = ModuleContext::new(&mut facts, &mut executor);

        let mut inv = invocation(State::Replaced, vec![priority(4096)]);
        inv.check_mode = true;
        let result = execute(&inv, &mut ctx).unwrap();

        assert!(result.changed);
        assert!(executor.applied.is_empty());
    }

    #[test]
    fn test_rendered_never_touches_device() {
        let mut facts = Snapshots::new(vec![vec![priority(4096)]]);
        let mut executor = NoExecutor;
        let mut ctx = ModuleContext::new(&mut facts, &mut executor);

        let result = execute(&invocation(State::Rendered, vec![priority(4096)]), &mut ctx).unwrap();

        assert!(!result.changed);
        assert_eq!(
            result.rendered,
            Some(vec!["spanning-tree vlan 1-3967 priority 4096".to_string()])
        );
        assert!(result.commands.is_none());
        assert!(result.before.is_none());
        assert!(facts.calls.is_empty());
    }

    #[test]
    fn test_rendered_requires_config() {
        let mut facts = Snapshots::new(vec![]);
        let mut executor = NoExecutor;
        let mut ctx = ModuleContext::new(&mut facts, &mut executor);

        let err = execute(&invocation(State::Rendered, vec![]), &mut ctx).unwrap_err();
        assert!(matches!(err, Error::EmptyConfig { .. }));
    }

    #[test]
    fn test_rendered_platform_warning() {
        let mut facts = Snapshots::new(vec![]);
        let mut executor = NoExecutor;
        let mut ctx = ModuleContext::new(&mut facts, &mut executor);

        let mut inv = invocation(
            State::Rendered,
            vec![SpanningTree {
                bridge_assurance: Some(false),
                mode: Some(StpMode::Mst),
                ..SpanningTree::named("default")
            }],
        );
        inv.platform = Some(Platform::new("N3K-C3172PQ-10GE"));
        let result = execute(&inv, &mut ctx).unwrap();

        assert_eq!(result.rendered, Some(vec!["spanning-tree mode mst".to_string()]));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_gathered_reports_facts_only() {
        let mut facts = Snapshots::new(vec![vec![priority(8192)]]);
        let mut executor = NoExecutor;
        let mut ctx = ModuleContext::new(&mut facts, &mut executor);

        let result = execute(&invocation(State::Gathered, vec![]), &mut ctx).unwrap();

        assert_eq!(result.gathered, Some(vec![priority(8192)]));
        assert!(!result.changed);
        assert!(result.commands.is_none());
        assert_eq!(facts.calls, vec![(GatherSubset::None, None)]);
    }

    #[test]
    fn test_parsed_uses_running_config() {
        let mut facts = Snapshots::new(vec![vec![priority(8192)]]);
        let mut executor = NoExecutor;
        let mut ctx = ModuleContext::new(&mut facts, &mut executor);

        let mut inv = invocation(State::Parsed, vec![]);
        inv.running_config = Some("spanning-tree vlan 1-3967 priority 8192".into());
        let result = execute(&inv, &mut ctx).unwrap();

        assert_eq!(result.parsed, Some(vec![priority(8192)]));
        assert_eq!(
            facts.calls,
            vec![(
                GatherSubset::None,
                Some("spanning-tree vlan 1-3967 priority 8192".to_string())
            )]
        );
    }

    #[test]
    fn test_parsed_requires_running_config() {
        let mut facts = Snapshots::new(vec![]);
        let mut executor = NoExecutor;
        let mut ctx = ModuleContext::new(&mut facts, &mut executor);

        let mut inv = invocation(State::Parsed, vec![]);
        inv.running_config = Some("   ".into());
        let err = execute(&inv, &mut ctx).unwrap_err();
        assert!(matches!(err, Error::MissingRunningConfig));
        assert!(facts.calls.is_empty());
    }

    #[test]
    fn test_apply_failure_propagates() {
        let mut facts = Snapshots::new(vec![vec![]]);
        let mut executor = NoExecutor;
        let mut ctx = ModuleContext::new(&mut facts, &mut executor);

        let err = execute(&invocation(State::Merged, vec![priority(4096)]), &mut ctx).unwrap_err();
        assert!(matches!(err, Error::Apply(_)));
    }

    #[test]
    fn test_invocation_from_json() {
        let inv: Invocation = serde_json::from_str(
            r#"{"state":"overridden","config":[{"name":"vlan 10","priority":4096}]}"#,
        )
        .unwrap();
        assert_eq!(inv.state, State::Overridden);
        assert_eq!(inv.config[0].priority, Some(4096));
        assert!(!inv.check_mode);
    }
}
