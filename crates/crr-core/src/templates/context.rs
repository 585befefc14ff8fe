//! Template context for config generation

use serde::{Deserialize, Serialize};
use tera::Context;

use crate::error::{Error, Result};
use crate::types::{CrrConfigFile, LookupSettings};

/// Context for rendering crr.yaml templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigInitContext {
    pub account: String,
    pub target_stack_name: String,
    pub target_region: String,
    pub source_stack_name: String,
    pub source_region: String,
    pub lookup_runtime: String,
    pub lookup_handler: String,
    pub lookup_timeout_secs: u32,
    pub output_dir: String,
}

impl ConfigInitContext {
    /// Seed the context from an existing configuration (usually the defaults)
    pub fn from_config(config: &CrrConfigFile) -> Self {
        Self {
            account: config.account.clone(),
            target_stack_name: config.target.stack_name.clone(),
            target_region: config.target.region.clone(),
            source_stack_name: config.source.stack_name.clone(),
            source_region: config.source.region.clone(),
            lookup_runtime: config.lookup.runtime.clone(),
            lookup_handler: config.lookup.handler.clone(),
            lookup_timeout_secs: config.lookup.timeout_secs,
            output_dir: config.output_dir.to_string(),
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn with_regions(mut self, target: impl Into<String>, source: impl Into<String>) -> Self {
        self.target_region = target.into();
        self.source_region = source.into();
        self
    }

    /// Whether the lookup settings differ from the built-in ones
    pub fn has_custom_lookup(&self) -> bool {
        let defaults = LookupSettings::default();
        self.lookup_runtime != defaults.runtime
            || self.lookup_handler != defaults.handler
            || self.lookup_timeout_secs != defaults.timeout_secs
    }

    /// Convert to Tera context for template rendering
    pub fn to_tera_context(&self) -> Result<Context> {
        let mut context =
            Context::from_serialize(self).map_err(|e| Error::Template(e.to_string()))?;
        context.insert("custom_lookup", &self.has_custom_lookup());
        Ok(context)
    }
}
