//! # crr-core
//!
//! Core library for the crr CLI providing:
//! - Configuration loading (crr.yaml) with JSON Schema validation
//! - The CloudFormation template model and deployment-time tokens
//! - Stacks, logical ids and generated physical names
//! - Dependency graphs and cloud assembly synthesis

pub mod arn;
pub mod assembly;
pub mod config;
pub mod error;
pub mod graph;
pub mod naming;
pub mod nonce;
pub mod schema;
pub mod stack;
pub mod template;
pub mod templates;
pub mod token;
pub mod types;

pub use arn::ArnComponents;
pub use assembly::{App, CloudAssembly, Manifest, StackArtifact};
pub use config::{ConfigOverrides, CrrConfig};
pub use error::{Error, Result};
pub use nonce::DeploymentNonce;
pub use schema::SchemaValidator;
pub use stack::{ConstructPath, Environment, Stack};
pub use template::{RemovalPolicy, Resource, Template};
pub use token::{PseudoParameter, Token};
