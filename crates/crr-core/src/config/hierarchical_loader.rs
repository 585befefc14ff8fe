//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Project config (crr.yaml, explicit path or found by searching upward)
//! 3. Environment variables (CRR_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::schema::{SchemaValidator, CONFIG_SCHEMA};
use crate::types::CrrConfigFile;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::Value;
use std::env;
use std::fs;
use tracing::debug;

/// Configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &["crr.yaml", "crr.yml"];

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Result of a hierarchical load
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: CrrConfigFile,
    /// Project file that contributed, if any
    pub config_path: Option<Utf8PathBuf>,
}

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Directory the upward search for crr.yaml starts from
    search_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader that searches from the current directory
    pub fn new() -> Result<Self> {
        let cwd = env::current_dir()?;
        let search_dir = Utf8PathBuf::try_from(cwd)
            .map_err(|_| Error::invalid_config("Current directory path is not valid UTF-8"))?;
        Ok(Self { search_dir })
    }

    /// Create a loader with a custom search directory
    pub fn with_search_dir(search_dir: Utf8PathBuf) -> Self {
        Self { search_dir }
    }

    /// Load configuration with hierarchical precedence
    pub fn load(&self, explicit: Option<&Utf8Path>) -> Result<LoadedConfig> {
        let mut merged = Self::load_embedded_defaults()?;

        let project = match explicit {
            Some(path) => Some(Self::read_file(path)?),
            None => self.find_config()?,
        };

        let config_path = match project {
            Some((path, content)) => {
                debug!("Merging project config: {}", path);
                let overlay: Value = serde_yaml_ng::from_str(&content)?;
                merge_yaml(&mut merged, overlay);
                Some(path)
            }
            None => {
                debug!("No crr.yaml found, using embedded defaults");
                None
            }
        };

        let json = serde_json::to_value(&merged)?;
        SchemaValidator::global()?.validate(&json, CONFIG_SCHEMA)?;

        let config: CrrConfigFile = serde_yaml_ng::from_value(merged)?;
        let config = Self::apply_env_overrides(config);

        Ok(LoadedConfig {
            config,
            config_path,
        })
    }

    /// The embedded defaults as a parsed configuration
    pub fn embedded_defaults() -> Result<CrrConfigFile> {
        Ok(serde_yaml_ng::from_value(Self::load_embedded_defaults()?)?)
    }

    fn load_embedded_defaults() -> Result<Value> {
        let filename = "defaults.yaml";
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    fn read_file(path: &Utf8Path) -> Result<(Utf8PathBuf, String)> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;
        Ok((path.to_owned(), content))
    }

    /// Find crr.yaml in the search directory or its parents
    fn find_config(&self) -> Result<Option<(Utf8PathBuf, String)>> {
        let mut current = self.search_dir.as_path();

        loop {
            for name in CONFIG_FILE_NAMES {
                let path = current.join(name);
                if path.exists() {
                    let content = fs::read_to_string(&path)?;
                    return Ok(Some((path, content)));
                }
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: CrrConfigFile) -> CrrConfigFile {
        if let Ok(val) = env::var("CRR_ACCOUNT") {
            config.account = val;
        }
        if let Ok(val) = env::var("CRR_TARGET_STACK_NAME") {
            config.target.stack_name = val;
        }
        if let Ok(val) = env::var("CRR_TARGET_REGION") {
            config.target.region = val;
        }
        if let Ok(val) = env::var("CRR_SOURCE_STACK_NAME") {
            config.source.stack_name = val;
        }
        if let Ok(val) = env::var("CRR_SOURCE_REGION") {
            config.source.region = val;
        }
        if let Ok(val) = env::var("CRR_OUTPUT_DIR") {
            config.output_dir = Utf8PathBuf::from(val);
        }
        config
    }
}

/// Deep-merge `overlay` into `base`: mappings merge key by key, any other
/// value in the overlay replaces the base value.
pub fn merge_yaml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_yaml(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_VARS: &[&str] = &[
        "CRR_ACCOUNT",
        "CRR_TARGET_STACK_NAME",
        "CRR_TARGET_REGION",
        "CRR_SOURCE_STACK_NAME",
        "CRR_SOURCE_REGION",
        "CRR_OUTPUT_DIR",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    fn temp_search_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
            .expect("path should be valid UTF-8");
        (temp_dir, dir)
    }

    #[test]
    fn test_merge_yaml_nested() {
        let mut base: Value = serde_yaml_ng::from_str("a: 1\nb: { c: 2, d: 3 }").unwrap();
        let overlay: Value = serde_yaml_ng::from_str("b: { d: 4 }\ne: 5").unwrap();
        merge_yaml(&mut base, overlay);

        let expected: Value = serde_yaml_ng::from_str("a: 1\nb: { c: 2, d: 4 }\ne: 5").unwrap();
        assert_eq!(base, expected);
    }

    #[test]
    fn test_embedded_defaults() {
        let defaults = HierarchicalConfigLoader::embedded_defaults().unwrap();
        assert_eq!(defaults.account, "554416834557");
        assert_eq!(defaults.target.stack_name, "MultiRegionS3CrrKmsCmkTarget");
        assert_eq!(defaults.target.region, "ap-northeast-2");
        assert_eq!(defaults.source.stack_name, "MultiRegionS3CrrKmsCmkSource");
        assert_eq!(defaults.source.region, "eu-west-2");
    }

    #[test]
    #[serial]
    fn test_defaults_when_no_project_file() {
        clear_env();
        let (_guard, dir) = temp_search_dir();
        let loaded = HierarchicalConfigLoader::with_search_dir(dir).load(None).unwrap();
        assert!(loaded.config_path.is_none());
        assert_eq!(loaded.config, HierarchicalConfigLoader::embedded_defaults().unwrap());
    }

    #[test]
    #[serial]
    fn test_project_file_overrides_defaults() {
        clear_env();
        let (_guard, dir) = temp_search_dir();
        std::fs::write(
            dir.join("crr.yaml"),
            "source:\n  stack_name: MultiRegionS3CrrKmsCmkSource\n  region: us-east-1\n",
        )
        .unwrap();
        let nested = dir.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let loaded = HierarchicalConfigLoader::with_search_dir(nested)
            .load(None)
            .unwrap();
        assert_eq!(loaded.config_path, Some(dir.join("crr.yaml")));
        assert_eq!(loaded.config.source.region, "us-east-1");
        assert_eq!(loaded.config.target.region, "ap-northeast-2");
    }

    #[test]
    #[serial]
    fn test_env_overrides_project_file() {
        clear_env();
        let (_guard, dir) = temp_search_dir();
        std::fs::write(dir.join("crr.yaml"), "account: \"111111111111\"\n").unwrap();

        env::set_var("CRR_ACCOUNT", "222222222222");
        env::set_var("CRR_TARGET_REGION", "eu-central-1");
        let loaded = HierarchicalConfigLoader::with_search_dir(dir)
            .load(None)
            .unwrap();
        clear_env();

        assert_eq!(loaded.config.account, "222222222222");
        assert_eq!(loaded.config.target.region, "eu-central-1");
    }

    #[test]
    #[serial]
    fn test_explicit_missing_file() {
        clear_env();
        let (_guard, dir) = temp_search_dir();
        let missing = dir.join("nope.yaml");
        let err = HierarchicalConfigLoader::with_search_dir(dir)
            .load(Some(missing.as_path()))
            .unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    #[serial]
    fn test_schema_violation_in_project_file() {
        clear_env();
        let (_guard, dir) = temp_search_dir();
        std::fs::write(dir.join("crr.yaml"), "account: \"not-an-account\"\n").unwrap();
        let err = HierarchicalConfigLoader::with_search_dir(dir)
            .load(None)
            .unwrap_err();
        assert!(
            matches!(err, Error::SchemaValidation { .. }),
            "Expected SchemaValidation, got: {:?}",
            err
        );
    }

    #[test]
    #[serial]
    fn test_invalid_yaml_syntax() {
        clear_env();
        let (_guard, dir) = temp_search_dir();
        std::fs::write(dir.join("crr.yaml"), "account: \"1\"\n  bad_indent: [[[").unwrap();
        let err = HierarchicalConfigLoader::with_search_dir(dir)
            .load(None)
            .unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)), "got: {:?}", err);
    }
}
