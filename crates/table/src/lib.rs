//! Live table: the contract the backup engine requires of the published key-value store.
//!
//! # Invariants
//! - Writes are typed. A put never changes the type already stored under a key.
//! - `get` distinguishes "no value for this key" (`Ok(None)`) from "table unreachable" (`Err`).
//! - Connection establishment happens before any engine call, through a bounded poll loop.

pub mod connect;
pub mod json;
pub mod memory;
pub mod table;

pub use connect::{robot_address, wait_for_connection};
pub use json::JsonTable;
pub use memory::MemoryTable;
pub use table::{Table, TableError};
