//! Shared data model for mission AI records.

pub mod defs;

pub use defs::*;
