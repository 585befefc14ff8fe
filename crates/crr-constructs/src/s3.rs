//! S3 buckets and replication configuration

use serde::Serialize;
use tracing::debug;

use crr_core::arn::ArnComponents;
use crr_core::{ConstructPath, Environment, Error, Resource, Result, Stack, Token};

use crate::kms::Key;

/// How a bucket gets its physical name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BucketName {
    /// Left to the provisioning engine; unknown until deployment
    #[default]
    Auto,
    /// Deterministic name computed at synthesis time
    GenerateIfNeeded,
    Explicit(String),
}

#[derive(Debug, Clone)]
pub struct BucketProps<'a> {
    pub bucket_name: BucketName,
    /// The key objects are encrypted with (`aws:kms`)
    pub encryption_key: &'a Key,
    pub versioned: bool,
}

/// An `AWS::S3::Bucket`, retained on delete and replacement
#[derive(Debug, Clone)]
pub struct Bucket {
    logical_id: String,
    bucket_name: Option<String>,
    env: Environment,
}

impl Bucket {
    pub fn new(stack: &mut Stack, scope: &ConstructPath, id: &str, props: BucketProps<'_>) -> Result<Self> {
        let path = scope.child(id);
        let bucket_name = match props.bucket_name {
            BucketName::Auto => None,
            BucketName::GenerateIfNeeded => Some(stack.generate_physical_name(&path)?),
            BucketName::Explicit(name) => Some(name),
        };

        let encryption = serde_json::to_value(BucketEncryption::kms(props.encryption_key.key_arn()))?;
        let mut resource = Resource::new("AWS::S3::Bucket")
            .with_property("BucketEncryption", encryption)
            .retain();
        if let Some(name) = &bucket_name {
            resource.set_property("BucketName", name.as_str());
        }
        if props.versioned {
            resource.set_property(
                "VersioningConfiguration",
                serde_json::json!({ "Status": "Enabled" }),
            );
        }

        let logical_id = stack.add_resource(&path.child("Resource"), resource)?;
        Ok(Self {
            logical_id,
            bucket_name,
            env: stack.environment().clone(),
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// The physical name, if it is known at synthesis time
    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }

    /// `Fn::GetAtt [bucket, Arn]`
    pub fn bucket_arn(&self) -> Token {
        Token::get_att(&self.logical_id, "Arn")
    }

    /// ARN matching objects under `pattern`, e.g. `*`
    pub fn arn_for_objects(&self, pattern: &str) -> Token {
        Token::concat(vec![self.bucket_arn(), Token::literal(format!("/{}", pattern))])
    }

    /// A reference usable from a stack in another environment
    ///
    /// Such stacks cannot read this bucket's attributes, so the reference
    /// is built from the synthesis-time physical name.
    pub fn cross_environment_ref(&self) -> Result<BucketRef> {
        let name = self
            .bucket_name
            .clone()
            .ok_or_else(|| Error::CrossEnvironmentReference {
                resource: self.logical_id.clone(),
            })?;
        Ok(BucketRef {
            bucket_name: name,
            env: self.env.clone(),
        })
    }

    /// Write the replication configuration into the bucket resource
    pub fn set_replication_configuration(
        &self,
        stack: &mut Stack,
        configuration: &ReplicationConfiguration,
    ) -> Result<()> {
        debug!(
            "{}: {} replication rule(s)",
            self.logical_id,
            configuration.rules.len()
        );
        let value = serde_json::to_value(configuration)?;
        stack
            .resource_mut(&self.logical_id)?
            .set_property("ReplicationConfiguration", value);
        Ok(())
    }
}

/// A bucket owned by another stack, addressed by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketRef {
    pub bucket_name: String,
    pub env: Environment,
}

impl BucketRef {
    pub fn bucket_arn(&self) -> Token {
        ArnComponents::s3_bucket(&self.bucket_name).to_token()
    }

    pub fn arn_for_objects(&self, pattern: &str) -> Token {
        Token::concat(vec![self.bucket_arn(), Token::literal(format!("/{}", pattern))])
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct BucketEncryption {
    server_side_encryption_configuration: Vec<EncryptionRule>,
}

impl BucketEncryption {
    fn kms(key_arn: Token) -> Self {
        Self {
            server_side_encryption_configuration: vec![EncryptionRule {
                server_side_encryption_by_default: EncryptionByDefault {
                    kms_master_key_id: key_arn,
                    sse_algorithm: "aws:kms",
                },
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EncryptionRule {
    server_side_encryption_by_default: EncryptionByDefault,
}

#[derive(Debug, Clone, Serialize)]
struct EncryptionByDefault {
    #[serde(rename = "KMSMasterKeyID")]
    kms_master_key_id: Token,
    #[serde(rename = "SSEAlgorithm")]
    sse_algorithm: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Enabled,
}

/// The `ReplicationConfiguration` property of a bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicationConfiguration {
    pub role: Token,
    pub rules: Vec<ReplicationRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicationRule {
    pub destination: ReplicationDestination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_selection_criteria: Option<SourceSelectionCriteria>,
    pub status: Status,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplicationDestination {
    pub bucket: Token,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_configuration: Option<EncryptionConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncryptionConfiguration {
    #[serde(rename = "ReplicaKmsKeyID")]
    pub replica_kms_key_id: Token,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceSelectionCriteria {
    pub sse_kms_encrypted_objects: SseKmsEncryptedObjects,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SseKmsEncryptedObjects {
    pub status: Status,
}

impl ReplicationRule {
    /// Replicate only SSE-KMS encrypted objects, re-encrypting replicas with
    /// `replica_key`
    pub fn kms_encrypted_only(destination_bucket: Token, replica_key: Token) -> Self {
        Self {
            destination: ReplicationDestination {
                bucket: destination_bucket,
                encryption_configuration: Some(EncryptionConfiguration {
                    replica_kms_key_id: replica_key,
                }),
            },
            source_selection_criteria: Some(SourceSelectionCriteria {
                sse_kms_encrypted_objects: SseKmsEncryptedObjects {
                    status: Status::Enabled,
                },
            }),
            status: Status::Enabled,
        }
    }
}
