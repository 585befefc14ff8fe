//! # crr-constructs
//!
//! Typed constructs that declare CloudFormation resources into a
//! [`crr_core::Stack`]. Each construct owns the logical ids it declares and
//! hands out [`crr_core::Token`]s for its attributes.

pub mod iam;
pub mod kms;
pub mod lookup;
pub mod s3;
pub mod ssm;

pub use iam::{Policy, PolicyDocument, PolicyStatement, Principal, Role, RoleProps};
pub use kms::Key;
pub use lookup::{LookupProvider, ParameterLookup, ParameterLookupProps, SdkCall};
pub use s3::{Bucket, BucketName, BucketProps, BucketRef, ReplicationConfiguration, ReplicationRule};
pub use ssm::{StringParameter, StringParameterProps};
