//! Configuration loading and validation

use crate::config::hierarchical_loader::HierarchicalConfigLoader;
use crate::error::{Error, Result};
use crate::stack::Environment;
use crate::types::{CodeLocation, CrrConfigFile, LookupSettings, StackSettings};
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::fs;
use std::sync::LazyLock;
use tracing::debug;

static ACCOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{12}$").expect("account regex is valid"));

static REGION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").expect("region regex is valid"));

static STACK_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9-]{0,127}$").expect("stack name regex is valid")
});

/// Values supplied on the command line; highest precedence
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub account: Option<String>,
    pub target_region: Option<String>,
    pub source_region: Option<String>,
    pub output_dir: Option<Utf8PathBuf>,
}

/// Loaded and validated configuration
#[derive(Debug, Clone)]
pub struct CrrConfig {
    /// The merged configuration
    pub config: CrrConfigFile,

    /// Project file that contributed, if any
    pub config_path: Option<Utf8PathBuf>,
}

impl CrrConfig {
    /// Load configuration from the specified path or search for it
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        Self::load_with(path, ConfigOverrides::default())
    }

    /// Load configuration and apply CLI overrides, then validate
    pub fn load_with(path: Option<&Utf8Path>, overrides: ConfigOverrides) -> Result<Self> {
        let loaded = HierarchicalConfigLoader::new()?.load(path)?;
        let config = Self::from_file(loaded.config, loaded.config_path).with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Wrap an already-merged configuration
    pub fn from_file(config: CrrConfigFile, config_path: Option<Utf8PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Built-in defaults only
    pub fn defaults() -> Result<Self> {
        Ok(Self::from_file(
            HierarchicalConfigLoader::embedded_defaults()?,
            None,
        ))
    }

    /// Apply CLI overrides
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(account) = overrides.account {
            self.config.account = account;
        }
        if let Some(region) = overrides.target_region {
            self.config.target.region = region;
        }
        if let Some(region) = overrides.source_region {
            self.config.source.region = region;
        }
        if let Some(dir) = overrides.output_dir {
            self.config.output_dir = dir;
        }
        self
    }

    /// Check the rules the schema cannot express and re-check values that
    /// environment or CLI overrides may have changed after schema validation
    pub fn validate(&self) -> Result<()> {
        let c = &self.config;

        if !ACCOUNT_PATTERN.is_match(&c.account) {
            return Err(Error::invalid_config(format!(
                "account must be a 12-digit account id, got '{}'",
                c.account
            )));
        }

        for (role, stack) in [("target", &c.target), ("source", &c.source)] {
            if !STACK_NAME_PATTERN.is_match(&stack.stack_name) {
                return Err(Error::invalid_config(format!(
                    "{}.stack_name '{}' is not a valid stack name",
                    role, stack.stack_name
                )));
            }
            if !REGION_PATTERN.is_match(&stack.region) {
                return Err(Error::invalid_config(format!(
                    "{}.region '{}' is not a valid region",
                    role, stack.region
                )));
            }
        }

        if c.target.stack_name == c.source.stack_name {
            return Err(Error::invalid_config(format!(
                "target and source stacks must have different names, both are '{}'",
                c.target.stack_name
            )));
        }

        if c.target.region == c.source.region {
            return Err(Error::invalid_config(format!(
                "target and source must be in different regions, both are '{}'",
                c.target.region
            )));
        }

        if c.lookup.timeout_secs == 0 || c.lookup.timeout_secs > 900 {
            return Err(Error::invalid_config(
                "lookup.timeout_secs must be between 1 and 900",
            ));
        }

        debug!(
            "Configuration valid: {} -> {} in account {}",
            c.source.region, c.target.region, c.account
        );
        Ok(())
    }

    pub fn account(&self) -> &str {
        &self.config.account
    }

    pub fn target(&self) -> &StackSettings {
        &self.config.target
    }

    pub fn source(&self) -> &StackSettings {
        &self.config.source
    }

    pub fn lookup(&self) -> &LookupSettings {
        &self.config.lookup
    }

    pub fn output_dir(&self) -> &Utf8Path {
        &self.config.output_dir
    }

    /// Environment of the target stack
    pub fn target_env(&self) -> Environment {
        Environment::new(&self.config.account, &self.config.target.region)
    }

    /// Environment of the source stack
    pub fn source_env(&self) -> Environment {
        Environment::new(&self.config.account, &self.config.source.region)
    }

    /// Configured bundle of the lookup provider, if any
    pub fn lookup_code(&self) -> Option<&CodeLocation> {
        self.config.lookup.code.as_ref()
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(&self.config).map_err(Error::from)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Utf8Path) -> Result<()> {
        fs::write(path, self.to_yaml()?)?;
        Ok(())
    }
}
