//! # crr-target
//!
//! The replica side of the replication topology: a KMS key, a versioned
//! bucket encrypted with it, and an SSM parameter that publishes the key ARN
//! so a stack in another region can discover it.

use tracing::info;

use crr_constructs::{
    Bucket, BucketName, BucketProps, BucketRef, Key, StringParameter, StringParameterProps,
};
use crr_core::{ConstructPath, Result, Stack};

/// Suffix appended to the stack name to form the parameter name
pub const PARAMETER_SUFFIX: &str = "MyTargetKeyId";

pub const KEY_ID: &str = "MyTargetKey";
pub const BUCKET_ID: &str = "MyTargetBucket";
pub const PARAMETER_ID: &str = "MyTargetKeyIdSSMParam";

const PARAMETER_DESCRIPTION: &str = "The KMS Key Id for the target stack";

/// Name of the parameter published by the target unit of `stack_name`
pub fn parameter_name_for(stack_name: &str) -> String {
    format!("{}.{}", stack_name, PARAMETER_SUFFIX)
}

/// Resources declared by the target unit
#[derive(Debug, Clone)]
pub struct TargetUnit {
    key: Key,
    bucket: Bucket,
    parameter: StringParameter,
    bucket_ref: BucketRef,
}

impl TargetUnit {
    /// Declare the target unit under `scope`
    ///
    /// Fails if the stack's environment cannot name the bucket or if any of
    /// the construct ids is already taken.
    pub fn new(stack: &mut Stack, scope: &ConstructPath) -> Result<Self> {
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
        let bucket_ref = bucket.cross_environment_ref()?;

        let parameter_name = parameter_name_for(stack.stack_name());
        let parameter = StringParameter::new(
            stack,
            scope,
            PARAMETER_ID,
            StringParameterProps {
                parameter_name,
                string_value: key.key_arn(),
                description: Some(PARAMETER_DESCRIPTION.to_string()),
            },
        )?;

        info!(
            "{}: target bucket {} publishes key via {}",
            stack.stack_name(),
            bucket_ref.bucket_name,
            parameter.parameter_name()
        );

        Ok(Self {
            key,
            bucket,
            parameter,
            bucket_ref,
        })
    }

    /// The replica bucket, addressable from other environments
    pub fn target_bucket(&self) -> &BucketRef {
        &self.bucket_ref
    }

    pub fn target_key_id_parameter_name(&self) -> &str {
        self.parameter.parameter_name()
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    pub fn parameter(&self) -> &StringParameter {
        &self.parameter
    }
}
