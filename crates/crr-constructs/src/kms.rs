//! Customer-managed KMS keys

use crr_core::{ConstructPath, Resource, Result, Stack, Token};

use crate::iam::{PolicyDocument, PolicyStatement, Principal};

/// An `AWS::KMS::Key`, retained on delete and replacement
///
/// The key policy grants `kms:*` to the account root, which delegates usage
/// to IAM: a role's own policy is enough to use the key.
#[derive(Debug, Clone)]
pub struct Key {
    logical_id: String,
}

impl Key {
    pub fn new(stack: &mut Stack, scope: &ConstructPath, id: &str) -> Result<Self> {
        let policy = PolicyDocument::new(vec![PolicyStatement::allow()
            .with_actions(["kms:*"])
            .with_principal(Principal::account_root(stack.account()))
            .with_resource("*")]);

        let resource = Resource::new("AWS::KMS::Key")
            .with_property("KeyPolicy", policy.to_json())
            .retain();

        let logical_id = stack.add_resource(&scope.child(id).child("Resource"), resource)?;
        Ok(Self { logical_id })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    /// `Fn::GetAtt [key, Arn]`
    pub fn key_arn(&self) -> Token {
        Token::get_att(&self.logical_id, "Arn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crr_core::{Environment, RemovalPolicy};
    use serde_json::json;

    fn stack() -> Stack {
        Stack::new("Test", Environment::new("123456789012", "eu-west-2"))
    }

    #[test]
    fn test_key_delegates_usage_to_iam() {
        let mut stack = stack();
        let key = Key::new(&mut stack, &ConstructPath::root().child("S"), "MyKey").unwrap();

        let resource = stack.resource(key.logical_id()).unwrap();
        let statement = &resource.property("KeyPolicy").unwrap()["Statement"][0];
        assert_eq!(statement["Action"], json!("kms:*"));
        assert_eq!(statement["Resource"], json!("*"));
        assert_eq!(
            statement["Principal"]["AWS"]["Fn::Join"][1][2],
            json!(":iam::123456789012:root")
        );
        assert_eq!(resource.deletion_policy, Some(RemovalPolicy::Retain));
        assert_eq!(resource.update_replace_policy, Some(RemovalPolicy::Retain));
    }

    #[test]
    fn test_key_arn_token() {
        let mut stack = stack();
        let key = Key::new(&mut stack, &ConstructPath::root().child("S"), "MyKey").unwrap();
        assert_eq!(key.key_arn(), Token::get_att(key.logical_id(), "Arn"));
        assert!(key.logical_id().starts_with("SMyKey"));
    }

    #[test]
    fn test_duplicate_key_id_rejected() {
        let mut stack = stack();
        let scope = ConstructPath::root().child("S");
        Key::new(&mut stack, &scope, "MyKey").unwrap();
        assert!(Key::new(&mut stack, &scope, "MyKey").is_err());
    }
}
