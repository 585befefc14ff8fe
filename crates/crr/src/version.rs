//! Version information for the crr CLI

use std::fmt;

use serde::Serialize;

/// Versions of the binary and of the formats it writes
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: String,

    /// Git commit SHA (short)
    pub commit: Option<String>,

    /// Version recorded in `manifest.json`
    pub assembly_version: String,

    /// `AWSTemplateFormatVersion` of every template
    pub template_format_version: String,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("GIT_SHA").map(String::from),
            assembly_version: crr_core::assembly::ASSEMBLY_VERSION.to_string(),
            template_format_version: crr_core::template::TEMPLATE_FORMAT_VERSION.to_string(),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crr {}", self.version)?;
        if let Some(commit) = &self.commit {
            write!(f, " ({})", commit)?;
        }
        writeln!(f)?;
        writeln!(f, "Assembly:   {}", self.assembly_version)?;
        write!(f, "Templates:  {}", self.template_format_version)
    }
}
