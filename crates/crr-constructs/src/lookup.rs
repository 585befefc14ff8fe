//! Deployment-time SSM parameter lookup
//!
//! A `Custom::AWS` resource whose provider function calls
//! `SSM.getParameter` in another region. The call runs on create and on every
//! update: its physical resource id is the deployment nonce, which changes
//! between synthesis runs, so the provisioning engine always sees a change.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crr_core::arn::ArnComponents;
use crr_core::types::{CodeLocation, LookupSettings};
use crr_core::{ConstructPath, DeploymentNonce, PseudoParameter, Resource, Result, Stack, Token};

use crate::iam::{Policy, PolicyStatement, Principal, Role, RoleProps};

/// Construct id of the per-stack provider function
pub const PROVIDER_ID: &str = "AWS679f53fac002430cb0da5b7982bd2287";

/// Resource type of the lookup custom resource
pub const CUSTOM_RESOURCE_TYPE: &str = "Custom::AWS";

const LAMBDA_BASIC_EXECUTION: &str = "service-role/AWSLambdaBasicExecutionRole";

/// Handler inlined into the provider function when no bundle location is configured
pub const INLINE_HANDLER: &str = include_str!("handlers/sdk_call.js");

/// `Code` property of the provider function
///
/// An explicit bundle location wins; otherwise the handler source is inlined
/// so the plan is deployable without any pre-staged asset.
pub fn function_code(code: Option<&CodeLocation>) -> serde_json::Value {
    match code {
        Some(code) => serde_json::json!({ "S3Bucket": code.s3_bucket, "S3Key": code.s3_key }),
        None => serde_json::json!({ "ZipFile": INLINE_HANDLER }),
    }
}

/// One SDK call performed by the provider function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkCall {
    pub service: String,
    pub action: String,
    pub parameters: BTreeMap<String, String>,
    pub region: String,
    pub physical_resource_id: PhysicalResourceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhysicalResourceId {
    pub id: String,
}

impl SdkCall {
    /// `SSM.getParameter` for one parameter name in `region`
    pub fn get_parameter(name: &str, region: &str, nonce: &DeploymentNonce) -> Self {
        Self {
            service: "SSM".to_string(),
            action: "getParameter".to_string(),
            parameters: BTreeMap::from([("Name".to_string(), name.to_string())]),
            region: region.to_string(),
            physical_resource_id: PhysicalResourceId {
                id: nonce.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParameterLookupProps {
    pub parameter_name: String,
    /// Region the parameter lives in
    pub region: String,
    /// The only resource the provider may read
    pub parameter_arn: ArnComponents,
    pub nonce: DeploymentNonce,
    pub provider: LookupSettings,
    /// Bundle of the provider function; `None` inlines the built-in handler
    pub code: Option<CodeLocation>,
}

/// The singleton function and role that serve every lookup in a stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupProvider {
    pub function_logical_id: String,
    pub role_logical_id: String,
}

impl LookupProvider {
    /// Declare the provider in `stack`, or return the existing one
    pub fn ensure(
        stack: &mut Stack,
        settings: &LookupSettings,
        code: Option<&CodeLocation>,
    ) -> Result<Self> {
        let scope = ConstructPath::root().child(PROVIDER_ID);
        let function_logical_id = scope.child("Resource").logical_id();
        let role_logical_id = scope.child("ServiceRole").child("Resource").logical_id();
        if stack.has_resource(&function_logical_id) {
            return Ok(Self {
                function_logical_id,
                role_logical_id,
            });
        }

        let managed_policy = Token::concat(vec![
            Token::literal("arn:"),
            Token::Pseudo(PseudoParameter::Partition),
            Token::literal(format!(":iam::aws:policy/{}", LAMBDA_BASIC_EXECUTION)),
        ]);
        let role = Role::new(
            stack,
            &scope,
            "ServiceRole",
            RoleProps::assumed_by(Principal::service("lambda.amazonaws.com"))
                .with_managed_policy(managed_policy),
        )?;

        let mut function = Resource::new("AWS::Lambda::Function")
            .with_property("Code", function_code(code))
            .with_property("Handler", settings.handler.as_str())
            .with_property("Role", role.role_arn())
            .with_property("Runtime", settings.runtime.as_str())
            .with_property("Timeout", settings.timeout_secs);
        function.depends_on.insert(role.logical_id().to_string());
        stack.add_resource(&scope.child("Resource"), function)?;

        debug!("{}: declared lookup provider {}", stack.stack_name(), function_logical_id);
        Ok(Self {
            function_logical_id,
            role_logical_id,
        })
    }

    /// `Fn::GetAtt [function, Arn]`
    pub fn service_token(&self) -> Token {
        Token::get_att(&self.function_logical_id, "Arn")
    }
}

/// A cross-region read of one SSM parameter
#[derive(Debug, Clone)]
pub struct ParameterLookup {
    logical_id: String,
    policy_logical_id: String,
    provider: LookupProvider,
    call: SdkCall,
}

impl ParameterLookup {
    pub fn new(
        stack: &mut Stack,
        scope: &ConstructPath,
        id: &str,
        props: ParameterLookupProps,
    ) -> Result<Self> {
        let provider = LookupProvider::ensure(stack, &props.provider, props.code.as_ref())?;
        let path = scope.child(id);

        let parameter_arn = stack.format_arn(&props.parameter_arn);
        let policy = Policy::new(
            stack,
            &path,
            "CustomResourcePolicy",
            vec![Token::reference(&provider.role_logical_id)],
            vec![PolicyStatement::allow()
                .with_actions(["ssm:GetParameter"])
                .with_resource(parameter_arn)],
        )?;

        let call = SdkCall::get_parameter(&props.parameter_name, &props.region, &props.nonce);
        let encoded = serde_json::to_string(&call)?;

        let mut resource = Resource::new(CUSTOM_RESOURCE_TYPE)
            .with_property("ServiceToken", provider.service_token())
            .with_property("Create", encoded.as_str())
            .with_property("Update", encoded.as_str())
            .with_property("InstallLatestAwsSdk", true);
        resource.depends_on.insert(policy.logical_id().to_string());

        let logical_id = stack.add_resource(&path.child("Resource").child("Default"), resource)?;
        debug!(
            "{}: lookup {} reads {} in {}",
            stack.stack_name(),
            logical_id,
            props.parameter_name,
            props.region
        );

        Ok(Self {
            logical_id,
            policy_logical_id: policy.logical_id().to_string(),
            provider,
            call,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// The `AWS::IAM::Policy` that scopes what the provider may read
    pub fn policy_logical_id(&self) -> &str {
        &self.policy_logical_id
    }

    /// The shared function that serves this lookup
    pub fn provider(&self) -> &LookupProvider {
        &self.provider
    }

    pub fn call(&self) -> &SdkCall {
        &self.call
    }

    /// A field of the SDK response, e.g. `Parameter.Value`
    pub fn response_field(&self, path: &str) -> Token {
        Token::get_att(&self.logical_id, path)
    }
}
