//! CloudFormation template model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::token::collect_references;

/// Template format version emitted in every template
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// What happens to a resource's physical counterpart when it is removed or replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalPolicy {
    Retain,
}

/// A single resource declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    /// CloudFormation resource type, e.g. `AWS::S3::Bucket`
    #[serde(rename = "Type")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,

    /// Explicit ordering edges in addition to those implied by tokens
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<RemovalPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<RemovalPolicy>,
}

impl Resource {
    /// Create a resource of the given type with no properties
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties: Map::new(),
            depends_on: BTreeSet::new(),
            update_replace_policy: None,
            deletion_policy: None,
        }
    }

    /// Set a property (builder style)
    pub fn with_property(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Set or replace a property
    ///
    /// Typed property structs are serialized by the caller, so a
    /// serialization failure surfaces there as an error.
    pub fn set_property(&mut self, name: &str, value: impl Into<Value>) {
        self.properties.insert(name.to_string(), value.into());
    }

    /// Get a property value
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Retain the physical resource on both delete and replacement
    pub fn retain(mut self) -> Self {
        self.update_replace_policy = Some(RemovalPolicy::Retain);
        self.deletion_policy = Some(RemovalPolicy::Retain);
        self
    }

    /// Every logical id this resource must be deployed after
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut deps = collect_references(&Value::Object(self.properties.clone()));
        deps.extend(self.depends_on.iter().cloned());
        deps
    }
}

/// A CloudFormation template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(
        rename = "Description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,

    #[serde(rename = "Resources", default)]
    pub resources: BTreeMap<String, Resource>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: None,
            resources: BTreeMap::new(),
        }
    }
}

impl Template {
    /// Create an empty template
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources of a given CloudFormation type, keyed by logical id
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
    }

    /// Number of resources of a given type
    pub fn count_of_type(&self, resource_type: &str) -> usize {
        self.resources_of_type(resource_type).count()
    }

    /// Render as pretty-printed JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;
    use serde_json::json;

    #[test]
    fn test_resource_serialization_shape() {
        let mut resource = Resource::new("AWS::S3::Bucket")
            .with_property("BucketName", "my-bucket")
            .retain();
        resource.depends_on.insert("Other".to_string());

        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(
            value,
            json!({
                "Type": "AWS::S3::Bucket",
                "Properties": { "BucketName": "my-bucket" },
                "DependsOn": ["Other"],
                "UpdateReplacePolicy": "Retain",
                "DeletionPolicy": "Retain"
            })
        );
    }

    #[test]
    fn test_template_serialization_omits_empty_sections() {
        let template = Template::new();
        let value = serde_json::to_value(&template).unwrap();
        assert_eq!(
            value,
            json!({ "AWSTemplateFormatVersion": "2010-09-09", "Resources": {} })
        );
    }

    #[test]
    fn test_dependencies_union_tokens_and_depends_on() {
        let mut resource = Resource::new("AWS::IAM::Policy")
            .with_property("Roles", vec![Token::reference("Role1")])
            .with_property("Resource", Token::get_att("Lookup1", "Parameter.Value"));
        resource.depends_on.insert("Explicit1".to_string());

        let deps: Vec<_> = resource.dependencies().into_iter().collect();
        assert_eq!(deps, vec!["Explicit1", "Lookup1", "Role1"]);
    }

    #[test]
    fn test_typed_properties_convert_without_loss() {
        let resource = Resource::new("AWS::Lambda::Function")
            .with_property("Role", Token::get_att("Role1", "Arn"))
            .with_property("Timeout", 120u32)
            .with_property("Roles", vec![Token::reference("Role1"), Token::literal("other")]);

        assert_eq!(
            resource.property("Role"),
            Some(&json!({ "Fn::GetAtt": ["Role1", "Arn"] }))
        );
        assert_eq!(resource.property("Timeout"), Some(&json!(120)));
        assert_eq!(
            resource.property("Roles"),
            Some(&json!([{ "Ref": "Role1" }, "other"]))
        );
        assert!(resource.properties.values().all(|v| !v.is_null()));
    }

    #[test]
    fn test_count_of_type() {
        let mut template = Template::new();
        template
            .resources
            .insert("A".to_string(), Resource::new("AWS::KMS::Key"));
        template
            .resources
            .insert("B".to_string(), Resource::new("AWS::S3::Bucket"));
        assert_eq!(template.count_of_type("AWS::KMS::Key"), 1);
        assert_eq!(template.count_of_type("AWS::SSM::Parameter"), 0);
    }
}
