//! Shared types for the tunables backup engine.
//!
//! # Invariants
//! - A `Value` is always one of boolean, number or string. There is no null.
//! - Key classification is a pure function of the key name and the suffix set.

pub mod classify;
pub mod types;

pub use classify::{Classifier, DEFAULT_TELEMETRY_SUFFIXES};
pub use types::{Key, Value, ValueKind};
