//! Stacks: a named template bound to one account and region

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

use crate::arn::ArnComponents;
use crate::error::{Error, Result};
use crate::naming;
use crate::template::{Resource, Template};
use crate::token::Token;

/// The account and region a stack deploys into
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    pub account: String,
    pub region: String,
}

impl Environment {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
        }
    }

    /// Whether both account and region are known at synthesis time
    pub fn is_concrete(&self) -> bool {
        !self.account.is_empty() && !self.region.is_empty()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "aws://{}/{}", self.account, self.region)
    }
}

/// Path of a construct below its stack, e.g. `MySource/MyCrrRole`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ConstructPath(Vec<String>);

impl ConstructPath {
    /// The stack-level scope (empty path)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A child scope
    pub fn child(&self, id: &str) -> Self {
        let mut components = self.0.clone();
        components.push(id.to_string());
        Self(components)
    }

    /// Path components
    pub fn components(&self) -> Vec<&str> {
        self.0.iter().map(String::as_str).collect()
    }

    /// Last component (the construct id)
    pub fn id(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    /// Logical id of the resource at this path
    pub fn logical_id(&self) -> String {
        naming::logical_id(&self.components())
    }
}

impl fmt::Display for ConstructPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// A deployable unit: one template in one environment
#[derive(Debug, Clone)]
pub struct Stack {
    stack_name: String,
    env: Environment,
    template: Template,
    dependencies: BTreeSet<String>,
    construct_paths: BTreeSet<String>,
}

impl Stack {
    /// Create an empty stack
    pub fn new(stack_name: impl Into<String>, env: Environment) -> Self {
        Self {
            stack_name: stack_name.into(),
            env,
            template: Template::new(),
            dependencies: BTreeSet::new(),
            construct_paths: BTreeSet::new(),
        }
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn account(&self) -> &str {
        &self.env.account
    }

    pub fn region(&self) -> &str {
        &self.env.region
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Set the template description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.template.description = Some(description.into());
    }

    /// Names of the stacks this stack must be deployed after
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Declare that this stack must be deployed after `other`
    pub fn add_dependency(&mut self, other: &Stack) {
        debug!(
            "Stack {} depends on stack {}",
            self.stack_name, other.stack_name
        );
        self.dependencies.insert(other.stack_name.clone());
    }

    /// Format an ARN as a deployment-time token
    pub fn format_arn(&self, components: &ArnComponents) -> Token {
        components.to_token()
    }

    /// Generate a physical name for the construct at `path`
    pub fn generate_physical_name(&self, path: &ConstructPath) -> Result<String> {
        naming::generate_physical_name(
            &self.stack_name,
            &path.logical_id(),
            &self.env.region,
            &self.env.account,
        )
    }

    /// Register a construct path, rejecting duplicates
    pub fn register_construct(&mut self, path: &ConstructPath) -> Result<()> {
        let key = path.to_string();
        if !self.construct_paths.insert(key.clone()) {
            return Err(Error::DuplicateConstruct {
                stack: self.stack_name.clone(),
                path: key,
            });
        }
        Ok(())
    }

    /// Add a resource at `path`, returning its logical id
    pub fn add_resource(&mut self, path: &ConstructPath, resource: Resource) -> Result<String> {
        self.register_construct(path)?;

        let logical_id = path.logical_id();
        if self.template.resources.contains_key(&logical_id) {
            return Err(Error::DuplicateLogicalId {
                stack: self.stack_name.clone(),
                logical_id,
            });
        }

        debug!(
            "{}: declared {} {} ({})",
            self.stack_name, resource.resource_type, logical_id, path
        );
        self.template.resources.insert(logical_id.clone(), resource);
        Ok(logical_id)
    }

    /// Whether a resource with this logical id exists
    pub fn has_resource(&self, logical_id: &str) -> bool {
        self.template.resources.contains_key(logical_id)
    }

    /// Look up a resource by logical id
    pub fn resource(&self, logical_id: &str) -> Result<&Resource> {
        self.template
            .resources
            .get(logical_id)
            .ok_or_else(|| Error::ResourceNotFound {
                stack: self.stack_name.clone(),
                logical_id: logical_id.to_string(),
            })
    }

    /// Mutable access to a declared resource (the low-level escape hatch)
    pub fn resource_mut(&mut self, logical_id: &str) -> Result<&mut Resource> {
        let stack = self.stack_name.clone();
        self.template
            .resources
            .get_mut(logical_id)
            .ok_or_else(|| Error::ResourceNotFound {
                stack,
                logical_id: logical_id.to_string(),
            })
    }
}
