//! # crr-source
//!
//! The origin side of the replication topology. Declares a KMS key and a
//! versioned bucket, reads the target key ARN from the target region's
//! parameter store at deployment time, and grants a replication role exactly
//! what S3 needs to copy encrypted objects to the target bucket.
//!
//! The encrypt permission and the replication rule both read the lookup's
//! response field, so the provisioning engine cannot materialize either
//! before the lookup has resolved.

mod grants;

pub use grants::{GrantCapability, ReplicationGrant};

use tracing::{debug, info};

use crr_constructs::{
    Bucket, BucketName, BucketProps, BucketRef, Key, ParameterLookup, ParameterLookupProps,
    Principal, ReplicationConfiguration, ReplicationRule, Role, RoleProps,
};
use crr_core::arn::ArnComponents;
use crr_core::types::{CodeLocation, LookupSettings};
use crr_core::{ConstructPath, DeploymentNonce, Error, Result, Stack, Token};

pub const KEY_ID: &str = "MySourceKey";
pub const BUCKET_ID: &str = "MySourceBucket";
pub const LOOKUP_ID: &str = "TargetKeyLookup";
pub const ROLE_ID: &str = "MyCrrRole";

/// Response field of `SSM.getParameter` holding the parameter value
pub const PARAMETER_VALUE_FIELD: &str = "Parameter.Value";

const REPLICATION_PRINCIPAL: &str = "s3.amazonaws.com";
const ROLE_PATH: &str = "/service-role/";

/// Inputs handed over from the target unit
#[derive(Debug, Clone)]
pub struct SourceUnitProps {
    pub target_bucket: BucketRef,
    pub target_key_id_parameter_name: String,
    pub target_region: String,
    pub lookup: LookupSettings,
    /// Provider bundle; `None` inlines the built-in handler
    pub code: Option<CodeLocation>,
    /// Makes the key lookup run again on every deployment
    pub nonce: DeploymentNonce,
}

/// Resources declared by the source unit
#[derive(Debug, Clone)]
pub struct SourceUnit {
    key: Key,
    bucket: Bucket,
    lookup: ParameterLookup,
    role: Role,
    grants: Vec<ReplicationGrant>,
    parameter_arn: ArnComponents,
    replication: ReplicationConfiguration,
}

impl SourceUnit {
    pub fn new(stack: &mut Stack, scope: &ConstructPath, props: SourceUnitProps) -> Result<Self> {
        if props.target_region.is_empty() {
            return Err(Error::invalid_config("target region must not be empty"));
        }
        if props.target_key_id_parameter_name.is_empty() {
            return Err(Error::invalid_config(
                "target key id parameter name must not be empty",
            ));
        }

        let key = Key::new(stack, scope, KEY_ID)?;
        let bucket = Bucket::new(
            stack,
            scope,
            BUCKET_ID,
            BucketProps {
                bucket_name: BucketName::GenerateIfNeeded,
                encryption_key: &key,
                versioned: true,
            },
        )?;

        let parameter_arn = ArnComponents::ssm_parameter(
            &props.target_region,
            stack.account(),
            &props.target_key_id_parameter_name,
        );
        let lookup = ParameterLookup::new(
            stack,
            scope,
            LOOKUP_ID,
            ParameterLookupProps {
                parameter_name: props.target_key_id_parameter_name.clone(),
                region: props.target_region.clone(),
                parameter_arn: parameter_arn.clone(),
                nonce: props.nonce.clone(),
                provider: props.lookup.clone(),
                code: props.code.clone(),
            },
        )?;
        let target_key_arn = lookup.response_field(PARAMETER_VALUE_FIELD);

        let mut role = Role::new(
            stack,
            scope,
            ROLE_ID,
            RoleProps::assumed_by(Principal::service(REPLICATION_PRINCIPAL)).with_path(ROLE_PATH),
        )?;
        let grants = grants::replication_grants(&key, &bucket, &props.target_bucket, &target_key_arn);
        for grant in &grants {
            debug!("{}: granting {}", role.logical_id(), grant.capability);
            for statement in &grant.statements {
                role.add_to_policy(stack, statement.clone())?;
            }
        }

        let replication = ReplicationConfiguration {
            role: role.role_arn(),
            rules: vec![ReplicationRule::kms_encrypted_only(
                props.target_bucket.bucket_arn(),
                target_key_arn,
            )],
        };
        bucket.set_replication_configuration(stack, &replication)?;

        info!(
            "{}: replicating to {} in {} ({} grants)",
            stack.stack_name(),
            props.target_bucket.bucket_name,
            props.target_region,
            grants.len()
        );

        Ok(Self {
            key,
            bucket,
            lookup,
            role,
            grants,
            parameter_arn,
            replication,
        })
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    pub fn lookup(&self) -> &ParameterLookup {
        &self.lookup
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Grants in the order they were attached to the role
    pub fn grants(&self) -> &[ReplicationGrant] {
        &self.grants
    }

    pub fn grant(&self, capability: GrantCapability) -> Option<&ReplicationGrant> {
        self.grants.iter().find(|g| g.capability == capability)
    }

    /// ARN components of the parameter the lookup may read
    pub fn parameter_arn(&self) -> &ArnComponents {
        &self.parameter_arn
    }

    pub fn replication_configuration(&self) -> &ReplicationConfiguration {
        &self.replication
    }

    /// The token every consumer of the target key ARN binds to
    pub fn target_key_arn(&self) -> Token {
        self.lookup.response_field(PARAMETER_VALUE_FIELD)
    }
}

#[cfg(test)]
mod tests;
