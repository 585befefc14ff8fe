//! CLI command implementations

pub mod config;
pub mod list;
pub mod synth;
pub mod validate;
pub mod version;

use anyhow::{Context, Result};
use camino::Utf8Path;
use crr_core::{ConfigOverrides, CrrConfig};

/// Load, merge and validate configuration for a command
pub(crate) fn load_config(path: Option<&Utf8Path>, overrides: ConfigOverrides) -> Result<CrrConfig> {
    CrrConfig::load_with(path, overrides).context("Failed to load configuration")
}
