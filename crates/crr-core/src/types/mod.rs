//! Type definitions shared across crates

pub mod config_types;

pub use config_types::{CodeLocation, CrrConfigFile, LookupSettings, StackSettings};
