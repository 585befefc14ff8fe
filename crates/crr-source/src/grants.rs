//! The permissions S3 replication needs, grouped by capability

use std::fmt;

use crr_constructs::{Bucket, BucketRef, Key, PolicyStatement};
use crr_core::Token;

/// What a grant enables the replication role to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantCapability {
    /// Read the source bucket's replication configuration and list it
    ReadReplicationConfiguration,
    /// Read object versions and their metadata in the source bucket
    ReadSourceVersions,
    /// Replicate objects, deletes and tags into the target bucket
    WriteDestinationObjects,
    /// Decrypt with the source key, encrypt with the target key
    KeyUsage,
}

impl fmt::Display for GrantCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GrantCapability::ReadReplicationConfiguration => "read-replication-configuration",
            GrantCapability::ReadSourceVersions => "read-source-versions",
            GrantCapability::WriteDestinationObjects => "write-destination-objects",
            GrantCapability::KeyUsage => "key-usage",
        };
        write!(f, "{}", name)
    }
}

/// One scoped permission of the replication role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationGrant {
    pub capability: GrantCapability,
    pub statements: Vec<PolicyStatement>,
}

impl ReplicationGrant {
    /// Every resource the grant's statements apply to
    pub fn resources(&self) -> Vec<&Token> {
        self.statements.iter().flat_map(|s| s.resources.iter()).collect()
    }

    /// Every action the grant's statements allow
    pub fn actions(&self) -> Vec<&str> {
        self.statements
            .iter()
            .flat_map(|s| s.actions.iter().map(String::as_str))
            .collect()
    }
}

/// The four grants, in the order they are attached
pub(crate) fn replication_grants(
    source_key: &Key,
    source_bucket: &Bucket,
    target_bucket: &BucketRef,
    target_key_arn: &Token,
) -> Vec<ReplicationGrant> {
    vec![
        ReplicationGrant {
            capability: GrantCapability::ReadReplicationConfiguration,
            statements: vec![PolicyStatement::allow()
                .with_actions(["s3:GetReplicationConfiguration", "s3:ListBucket"])
                .with_resource(source_bucket.bucket_arn())],
        },
        ReplicationGrant {
            capability: GrantCapability::ReadSourceVersions,
            statements: vec![PolicyStatement::allow()
                .with_actions([
                    "s3:GetObjectVersion",
                    "s3:GetObjectVersionAcl",
                    "s3:GetObjectVersionForReplication",
                    "s3:GetObjectLegalHold",
                    "s3:GetObjectVersionTagging",
                    "s3:GetObjectRetention",
                ])
                .with_resource(source_bucket.arn_for_objects("*"))],
        },
        ReplicationGrant {
            capability: GrantCapability::WriteDestinationObjects,
            statements: vec![PolicyStatement::allow()
                .with_actions([
                    "s3:ReplicateObject",
                    "s3:ReplicateDelete",
                    "s3:ReplicateTags",
                    "s3:GetObjectVersionTagging",
                ])
                .with_resource(target_bucket.arn_for_objects("*"))],
        },
        ReplicationGrant {
            capability: GrantCapability::KeyUsage,
            statements: vec![
                PolicyStatement::allow()
                    .with_actions(["kms:Decrypt"])
                    .with_resource(source_key.key_arn()),
                PolicyStatement::allow()
                    .with_actions(["kms:Encrypt"])
                    .with_resource(target_key_arn.clone()),
            ],
        },
    ]
}
