//! SSM Parameter Store entries

use crr_core::arn::ArnComponents;
use crr_core::{ConstructPath, Resource, Result, Stack, Token};

#[derive(Debug, Clone)]
pub struct StringParameterProps {
    pub parameter_name: String,
    pub string_value: Token,
    pub description: Option<String>,
}

/// An `AWS::SSM::Parameter` of type `String` with an explicit name
#[derive(Debug, Clone)]
pub struct StringParameter {
    logical_id: String,
    parameter_name: String,
}

impl StringParameter {
    pub fn new(
        stack: &mut Stack,
        scope: &ConstructPath,
        id: &str,
        props: StringParameterProps,
    ) -> Result<Self> {
        let mut resource = Resource::new("AWS::SSM::Parameter")
            .with_property("Type", "String")
            .with_property("Value", props.string_value.clone())
            .with_property("Name", props.parameter_name.as_str());
        if let Some(description) = &props.description {
            resource.set_property("Description", description.as_str());
        }

        let logical_id = stack.add_resource(&scope.child(id).child("Resource"), resource)?;
        Ok(Self {
            logical_id,
            parameter_name: props.parameter_name,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// The name, known at synthesis time
    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    /// ARN of the parameter in the owning stack's environment
    pub fn parameter_arn(&self, stack: &Stack) -> Token {
        stack.format_arn(&ArnComponents::ssm_parameter(
            stack.region(),
            stack.account(),
            &self.parameter_name,
        ))
    }
}
