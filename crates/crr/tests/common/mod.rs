//! Common test utilities for crr
//!
//! Fixtures for building the default app with a pinned nonce, plus helpers
//! for reading resources out of synthesized templates.

#![allow(dead_code)]

use camino::Utf8PathBuf;
use crr::build_app;
use crr_core::{CloudAssembly, CrrConfig, DeploymentNonce, Resource, StackArtifact};

pub const ACCOUNT: &str = "554416834557";
pub const TARGET_STACK: &str = "MultiRegionS3CrrKmsCmkTarget";
pub const SOURCE_STACK: &str = "MultiRegionS3CrrKmsCmkSource";
pub const TARGET_REGION: &str = "ap-northeast-2";
pub const SOURCE_REGION: &str = "eu-west-2";
pub const FIXED_NONCE: &str = "1700000000000";

pub fn default_config() -> CrrConfig {
    CrrConfig::defaults().expect("embedded defaults should load")
}

pub fn synth_with(config: &CrrConfig, nonce: &str) -> CloudAssembly {
    build_app(config, DeploymentNonce::fixed(nonce))
        .expect("app should build")
        .synth()
        .expect("app should synthesize")
}

pub fn synth_default() -> CloudAssembly {
    synth_with(&default_config(), FIXED_NONCE)
}

pub fn artifact<'a>(assembly: &'a CloudAssembly, stack: &str) -> &'a StackArtifact {
    assembly
        .stack(stack)
        .unwrap_or_else(|| panic!("stack {} should be in the assembly", stack))
}

/// The single resource of `resource_type` in a stack, with its logical id
pub fn single<'a>(artifact: &'a StackArtifact, resource_type: &'a str) -> (&'a str, &'a Resource) {
    let matches: Vec<_> = artifact.template.resources_of_type(resource_type).collect();
    assert_eq!(
        matches.len(),
        1,
        "expected one {} in {}",
        resource_type,
        artifact.stack_name
    );
    (matches[0].0.as_str(), matches[0].1)
}

pub fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
        .expect("path should be valid UTF-8");
    (temp_dir, dir)
}
