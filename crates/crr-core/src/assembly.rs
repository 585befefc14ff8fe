//! App and cloud assembly synthesis
//!
//! An [`App`] collects stacks; [`App::synth`] checks every template's
//! resource graph and the stack graph, then produces a [`CloudAssembly`]: the
//! templates in deployment order plus a manifest recording each stack's
//! environment and stack-level dependencies.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{resource_graph, DependencyGraph};
use crate::stack::{Environment, Stack};
use crate::template::Template;

/// Version written into `manifest.json`
pub const ASSEMBLY_VERSION: &str = "1.0.0";

/// Manifest file name inside the assembly directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Artifact type for CloudFormation stacks
pub const STACK_ARTIFACT_TYPE: &str = "aws:cloudformation:stack";

/// A collection of stacks synthesized together
#[derive(Debug, Default, Clone)]
pub struct App {
    stacks: Vec<Stack>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stack; stack names must be unique within the app
    pub fn add_stack(&mut self, stack: Stack) -> Result<()> {
        if self.stack(stack.stack_name()).is_some() {
            return Err(Error::invalid_config(format!(
                "Duplicate stack name: {}",
                stack.stack_name()
            )));
        }
        self.stacks.push(stack);
        Ok(())
    }

    /// Stacks in declaration order
    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn stack(&self, name: &str) -> Option<&Stack> {
        self.stacks.iter().find(|s| s.stack_name() == name)
    }

    /// Validate all graphs and produce the cloud assembly
    pub fn synth(&self) -> Result<CloudAssembly> {
        let mut stack_graph = DependencyGraph::new();
        let mut resource_orders: BTreeMap<&str, Vec<String>> = BTreeMap::new();

        for stack in &self.stacks {
            let graph = resource_graph(stack.stack_name(), stack.template())?;
            let order = graph.order()?;
            debug!(
                "{}: resource order {}",
                stack.stack_name(),
                order.join(", ")
            );
            resource_orders.insert(stack.stack_name(), order);

            stack_graph.add_node(stack.stack_name());
            for dependency in stack.dependencies() {
                if self.stack(dependency).is_none() {
                    return Err(Error::UnknownStack {
                        stack: stack.stack_name().to_string(),
                        dependency: dependency.clone(),
                    });
                }
                stack_graph.add_dependency(stack.stack_name(), dependency);
            }
        }

        let order = stack_graph.order()?;
        info!("Synthesized {} stacks: {}", order.len(), order.join(" -> "));

        let mut artifacts = Vec::with_capacity(order.len());
        for name in order {
            let stack = self
                .stack(&name)
                .ok_or_else(|| Error::invalid_config(format!("Unknown stack: {}", name)))?;
            artifacts.push(StackArtifact {
                stack_name: name.clone(),
                environment: stack.environment().clone(),
                template: stack.template().clone(),
                dependencies: stack.dependencies().iter().cloned().collect(),
                resource_order: resource_orders.remove(name.as_str()).unwrap_or_default(),
            });
        }

        Ok(CloudAssembly {
            version: ASSEMBLY_VERSION.to_string(),
            artifacts,
        })
    }
}

/// A synthesized stack
#[derive(Debug, Clone, PartialEq)]
pub struct StackArtifact {
    pub stack_name: String,
    pub environment: Environment,
    pub template: Template,
    /// Stacks that must be deployed first
    pub dependencies: Vec<String>,
    /// Logical ids in an order the provisioning engine can create them
    pub resource_order: Vec<String>,
}

impl StackArtifact {
    /// File name of the template inside the assembly directory
    pub fn template_file(&self) -> String {
        format!("{}.template.json", self.stack_name)
    }
}

/// The synthesized deployment plan
#[derive(Debug, Clone, PartialEq)]
pub struct CloudAssembly {
    pub version: String,
    /// Stacks in deployment order
    pub artifacts: Vec<StackArtifact>,
}

/// Serialized form of `manifest.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub artifacts: BTreeMap<String, ArtifactManifest>,
}

/// One artifact entry in `manifest.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub environment: String,
    pub properties: ArtifactProperties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactProperties {
    pub template_file: String,
}

impl CloudAssembly {
    /// Look up a stack artifact by name
    pub fn stack(&self, name: &str) -> Option<&StackArtifact> {
        self.artifacts.iter().find(|a| a.stack_name == name)
    }

    /// Stack names in deployment order
    pub fn deployment_order(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.stack_name.as_str()).collect()
    }

    /// Build the manifest
    pub fn manifest(&self) -> Manifest {
        let artifacts = self
            .artifacts
            .iter()
            .map(|a| {
                (
                    a.stack_name.clone(),
                    ArtifactManifest {
                        artifact_type: STACK_ARTIFACT_TYPE.to_string(),
                        environment: a.environment.to_string(),
                        properties: ArtifactProperties {
                            template_file: a.template_file(),
                        },
                        dependencies: a.dependencies.clone(),
                    },
                )
            })
            .collect();

        Manifest {
            version: self.version.clone(),
            artifacts,
        }
    }

    /// Whole plan as one JSON document (manifest plus templates)
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut templates = serde_json::Map::new();
        for artifact in &self.artifacts {
            templates.insert(
                artifact.stack_name.clone(),
                serde_json::to_value(&artifact.template)?,
            );
        }
        Ok(serde_json::json!({
            "manifest": serde_json::to_value(self.manifest())?,
            "templates": templates,
        }))
    }

    /// Write the manifest and one template per stack into `dir`
    pub fn write_to(&self, dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.artifacts.len() + 1);

        for artifact in &self.artifacts {
            let path = dir.join(artifact.template_file());
            let content = artifact.template.to_json_pretty()?;
            fs::write(&path, content)?;
            debug!("Wrote {}", path);
            written.push(path);
        }

        let manifest_path = dir.join(MANIFEST_FILE);
        fs::write(
            &manifest_path,
            serde_json::to_string_pretty(&self.manifest())?,
        )?;
        debug!("Wrote {}", manifest_path);
        written.push(manifest_path);

        Ok(written)
    }
}
