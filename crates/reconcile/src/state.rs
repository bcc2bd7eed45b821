//! State dispatch - the requested state decides how `want` meets `have`

use crate::diff;
use crate::error::{Error, Result};
use crate::model::{Platform, SpanningTree};
use crate::synth::{self, Commands};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested state verb, selected once per invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// Add or update declared attributes, leave everything else alone
    #[default]
    Merged,
    /// Per declared record: unset differing attributes, then set them
    Replaced,
    /// Like replaced, and remove records that are not declared
    Overridden,
    /// Remove declared records or attributes
    Deleted,
    /// Compute merged commands offline for display
    Rendered,
    /// Report the observed facts
    Gathered,
    /// Parse a supplied running-config into facts
    Parsed,
}

impl State {
    pub const ALL: [State; 7] = [
        State::Merged,
        State::Replaced,
        State::Overridden,
        State::Deleted,
        State::Rendered,
        State::Gathered,
        State::Parsed,
    ];

    /// States that may apply commands to the device
    pub fn is_action(&self) -> bool {
        matches!(
            self,
            Self::Merged | Self::Replaced | Self::Overridden | Self::Deleted
        )
    }

    /// States that fail when `want` is empty
    pub fn requires_config(&self) -> bool {
        matches!(
            self,
            Self::Merged | Self::Replaced | Self::Overridden | Self::Rendered
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merged => "merged",
            Self::Replaced => "replaced",
            Self::Overridden => "overridden",
            Self::Deleted => "deleted",
            Self::Rendered => "rendered",
            Self::Gathered => "gathered",
            Self::Parsed => "parsed",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        State::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| Error::UnknownState(s.to_string()))
    }
}

/// Check the declared records before any commands are computed.
pub fn validate_want(state: State, want: &[SpanningTree]) -> Result<()> {
    if state.requires_config() && want.is_empty() {
        return Err(Error::EmptyConfig {
            state: state.to_string(),
        });
    }

    let mut seen: Vec<&str> = Vec::with_capacity(want.len());
    for record in want {
        if seen.contains(&record.name.as_str()) {
            return Err(Error::DuplicateName {
                name: record.name.clone(),
            });
        }
        seen.push(&record.name);
        record.validate()?;
    }
    Ok(())
}

/// Compute the commands converging `have` to `want` under `state`.
///
/// Gathered and parsed compute nothing and return an empty list.
pub fn set_state(
    state: State,
    want: &[SpanningTree],
    have: &[SpanningTree],
    platform: &Platform,
) -> Result<Commands> {
    validate_want(state, want)?;

    let mut cmds = Commands::new();
    match state {
        State::Overridden => cmds.extend(state_overridden(want, have, platform)?),
        State::Deleted => cmds.extend(state_deleted(want, have, platform)?),
        State::Merged | State::Rendered => {
            for w in want {
                cmds.extend(state_merged(w, have, platform)?);
            }
        }
        State::Replaced => {
            for w in want {
                cmds.extend(state_replaced(w, have, platform)?);
            }
        }
        State::Gathered | State::Parsed => {}
    }
    Ok(cmds)
}

fn state_merged(want: &SpanningTree, have: &[SpanningTree], platform: &Platform) -> Result<Commands> {
    synth::synthesize(want, have, platform)
}

fn state_replaced(
    want: &SpanningTree,
    have: &[SpanningTree],
    platform: &Platform,
) -> Result<Commands> {
    let obj_in_have = diff::find(&want.name, have);
    let merged_cmds = synth::synthesize(want, have, platform)?;

    // Unset what the device carries beyond, or differently from, the record
    let replaced_cmds = match obj_in_have {
        Some(current) => synth::negate(&diff::stale(want, current), platform)?,
        None => Commands::new(),
    };

    let mut cmds = Commands::new();
    if !replaced_cmds.is_empty() || !merged_cmds.is_empty() {
        let merged_cmds = merged_cmds.without_shared(&replaced_cmds);
        log::debug!(
            "{}: {} unset block(s), {} set block(s)",
            want.name,
            replaced_cmds.blocks().len(),
            merged_cmds.blocks().len()
        );
        cmds.extend(replaced_cmds);
        cmds.extend(merged_cmds);
    }
    Ok(cmds)
}

fn state_overridden(
    want: &[SpanningTree],
    have: &[SpanningTree],
    platform: &Platform,
) -> Result<Commands> {
    let mut cmds = Commands::new();

    for h in have {
        if diff::find(&h.name, want).is_none() {
            log::debug!("{}: not declared, removing", h.name);
            cmds.extend(synth::negate(h, platform)?);
        }
    }

    for w in want {
        cmds.extend(state_replaced(w, have, platform)?);
    }
    Ok(cmds)
}

fn state_deleted(
    want: &[SpanningTree],
    have: &[SpanningTree],
    platform: &Platform,
) -> Result<Commands> {
    let mut cmds = Commands::new();

    if want.is_empty() {
        for h in have {
            cmds.extend(synth::negate(h, platform)?);
        }
        return Ok(cmds);
    }

    for w in want {
        let Some(current) = diff::find(&w.name, have) else {
            log::debug!("{}: nothing configured, skipping", w.name);
            continue;
        };
        if w.is_empty() {
            cmds.extend(synth::negate(current, platform)?);
        } else {
            cmds.extend(synth::negate(&diff::present_in(w, current), platform)?);
        }
    }
    Ok(cmds)
}
