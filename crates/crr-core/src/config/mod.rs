//! Configuration loading and management

mod hierarchical_loader;
mod loader;

pub use hierarchical_loader::{merge_yaml, HierarchicalConfigLoader, LoadedConfig, CONFIG_FILE_NAMES};
pub use loader::{ConfigOverrides, CrrConfig};
