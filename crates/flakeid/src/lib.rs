//! Coordination-free, time-ordered 64-bit identifiers.
//!
//! Each [`Generator`] is bound to a `(datacenter_id, machine_id)` pair and
//! packs a millisecond timestamp offset, both node fields, and a
//! per-millisecond sequence into a single [`SnowflakeId`]:
//!
//! ```text
//!  Bit Index:  63   63 62            22 21           17 16        12 11             0
//!              +------+----------------+---------------+------------+---------------+
//!  Field:      | sign | timestamp (41) | datacenter (5)| machine (5)| sequence (12) |
//!              +------+----------------+---------------+------------+---------------+
//! ```
//!
//! ```
//! use flakeid::Generator;
//!
//! let generator = Generator::new(2, 3).expect("identifiers are in range");
//! let id = generator.next_id().expect("clock did not move backward");
//!
//! assert_eq!(id.datacenter_id(), 2);
//! assert_eq!(id.machine_id(), 3);
//! assert!(id.to_i64() >= 0);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod error;
mod generator;
mod id;
mod time;

pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
