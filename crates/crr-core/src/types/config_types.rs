//! Configuration types (crr.yaml)

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Root of crr.yaml after all layers are merged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrrConfigFile {
    /// Configuration format version
    pub version: String,

    /// Account both stacks deploy into
    pub account: String,

    /// Destination (replica) stack
    pub target: StackSettings,

    /// Origin stack that owns the replication rule
    pub source: StackSettings,

    /// Provider function settings for the cross-region parameter lookup
    #[serde(default)]
    pub lookup: LookupSettings,

    /// Directory the cloud assembly is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: Utf8PathBuf,
}

fn default_output_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("crr.out")
}

/// Name and region of one stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSettings {
    pub stack_name: String,
    pub region: String,
}

/// Settings for the function that performs SDK calls on behalf of the lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupSettings {
    #[serde(default = "default_runtime")]
    pub runtime: String,

    #[serde(default = "default_handler")]
    pub handler: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,

    /// Where the handler bundle is stored; when absent the built-in handler
    /// is inlined into the function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeLocation>,
}

fn default_runtime() -> String {
    "nodejs20.x".to_string()
}

fn default_handler() -> String {
    "index.handler".to_string()
}

fn default_timeout_secs() -> u32 {
    120
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            handler: default_handler(),
            timeout_secs: default_timeout_secs(),
            code: None,
        }
    }
}

/// S3 location of a function bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeLocation {
    pub s3_bucket: String,
    pub s3_key: String,
}
