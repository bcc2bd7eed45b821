//! # Reconcile
//!
//! Declarative spanning-tree configuration for NX-OS style devices.
//!
//! Given the records a caller declares (`want`), the records observed on
//! the device (`have`) and a requested [`State`], this crate computes the
//! ordered commands that converge the device.
//!
//! ## Core Concepts
//!
//! - **SpanningTree**: a named record (`default`, `vlan <range>`, `mst <instances>`)
//! - **Delta**: the declared attributes that differ from the device
//! - **Commands**: ordered command blocks; context blocks are never split
//! - **State**: merged, replaced, overridden, deleted, rendered, gathered, parsed
//!
//! ## Example
//!
//! ```
//! use reconcile::{Platform, SpanningTree, State, set_state};
//!
//! let want = vec![SpanningTree {
//!     priority: Some(4096),
//!     ..SpanningTree::named("default")
//! }];
//! let have = vec![SpanningTree {
//!     priority: Some(32768),
//!     ..SpanningTree::named("default")
//! }];
//!
//! let cmds = set_state(State::Merged, &want, &have, &Platform::new("N9K-C93180YC-EX"))?;
//! assert_eq!(cmds.lines(), vec!["spanning-tree vlan 1-3967 priority 4096"]);
//! # Ok::<(), reconcile::Error>(())
//! ```
//!
//! ## Collaborators
//!
//! [`execute`] runs a full invocation. Device access goes through the
//! [`FactSource`] and [`CommandExecutor`] traits passed in a
//! [`ModuleContext`], so the core itself has no I/O.

pub mod context;
pub mod diff;
pub mod error;
pub mod model;
pub mod module;
pub mod state;
pub mod synth;

// Re-export main types at crate root
pub use context::{
    CommandExecutor, FactSource, Facts, GatherSubset, ModuleContext, NoExecutor, RESOURCES,
};
pub use diff::{Delta, diff, find, stale};
pub use error::{Error, ErrorCategory, Result};
pub use model::{
    ALL_VLANS, DEFAULT_NAME, DEFAULT_PRIORITY, MstConfig, MstInstance, PathcostMethod, Platform, PlatformFamily,
    PortType, PortTypeDefaults, Scope, SpanningTree, StpMode,
};
pub use module::{Invocation, ModuleResult, execute};
pub use state::{State, set_state, validate_want};
pub use synth::{CommandBlock, Commands, negate, synthesize};
