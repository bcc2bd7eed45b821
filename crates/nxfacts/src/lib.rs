//! # nxfacts
//!
//! Structured spanning-tree facts from NX-OS device output.
//!
//! This crate provides functionality for:
//! - Parsing `show running-config spanning-tree` into [`reconcile::SpanningTree`] records
//! - Detecting the device platform from `show version`
//!
//! ## Example
//!
//! ```
//! let records = nxfacts::parse_string("spanning-tree mode mst\nspanning-tree vlan 10 priority 4096\n")?;
//! assert_eq!(records[0].name, "default");
//! assert_eq!(records[1].name, "vlan 10");
//! # Ok::<(), nxfacts::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod parser;
pub mod platform;

pub use error::{Error, Result};
pub use parser::parse_string;
pub use platform::detect as detect_platform;
