//! Collaborator traits
//!
//! The core never talks to a device. Facts come in through a
//! [`FactSource`] and commands go out through a [`CommandExecutor`], both
//! handed over explicitly in a [`ModuleContext`].

use crate::error::{Error, Result};
use crate::model::{Platform, SpanningTree};

/// Network resources this module asks the fact source for
pub const RESOURCES: &[&str] = &["spanning_tree"];

/// How much of the device state the fact source should collect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatherSubset {
    /// Minimal device facts plus the requested resources
    Min,
    /// Only the requested resources
    None,
}

/// Facts gathered for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facts {
    /// Observed spanning-tree records
    pub records: Vec<SpanningTree>,
    /// Device platform, empty when unknown
    pub platform: Platform,
}

/// Source of observed configuration
///
/// When `data` is supplied the facts must be derived from it instead of
/// querying a device.
pub trait FactSource {
    fn get_facts(
        &mut self,
        subset: GatherSubset,
        resources: &[&str],
        data: Option<&str>,
    ) -> Result<Facts>;
}

/// Sink for computed commands
pub trait CommandExecutor {
    /// Apply commands in order
    fn apply(&mut self, commands: &[String]) -> Result<()>;
}

/// Executor for runs that must never touch a device
pub struct NoExecutor;

impl CommandExecutor for NoExecutor {
    fn apply(&mut self, _commands: &[String]) -> Result<()> {
        Err(Error::Apply("no command executor configured".to_string()))
    }
}

/// Collaborators for a single reconciliation run
pub struct ModuleContext<'a> {
    pub facts: &'a mut dyn FactSource,
    pub executor: &'a mut dyn CommandExecutor,
}

impl<'a> ModuleContext<'a> {
    pub fn new(facts: &'a mut dyn FactSource, executor: &'a mut dyn CommandExecutor) -> Self {
        Self { facts, executor }
    }
}
