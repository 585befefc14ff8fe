//! Replication grant tests

use crr_core::Token;
use serde_json::json;

use super::build;
use crate::GrantCapability;

#[test]
fn test_exactly_four_grants_in_order() {
    let (_, unit) = build();
    let capabilities: Vec<GrantCapability> = unit.grants().iter().map(|g| g.capability).collect();
    assert_eq!(
        capabilities,
        vec![
            GrantCapability::ReadReplicationConfiguration,
            GrantCapability::ReadSourceVersions,
            GrantCapability::WriteDestinationObjects,
            GrantCapability::KeyUsage,
        ]
    );
}

#[test]
fn test_grants_are_scoped() {
    let (_, unit) = build();

    let config = unit.grant(GrantCapability::ReadReplicationConfiguration).unwrap();
    assert_eq!(config.resources(), vec![&unit.bucket().bucket_arn()]);

    let versions = unit.grant(GrantCapability::ReadSourceVersions).unwrap();
    assert_eq!(versions.resources(), vec![&unit.bucket().arn_for_objects("*")]);
    assert!(versions.actions().contains(&"s3:GetObjectVersionForReplication"));

    let write = unit.grant(GrantCapability::WriteDestinationObjects).unwrap();
    assert_eq!(
        write.actions(),
        vec![
            "s3:ReplicateObject",
            "s3:ReplicateDelete",
            "s3:ReplicateTags",
            "s3:GetObjectVersionTagging"
        ]
    );
    assert_eq!(write.resources()[0].to_string(), format!(
        "arn:${{Token[AWS::Partition]}}:s3:::{}/*",
        super::props().target_bucket.bucket_name
    ));
}

#[test]
fn test_encrypt_resource_is_the_lookup_field() {
    let (_, unit) = build();
    let key_usage = unit.grant(GrantCapability::KeyUsage).unwrap();
    assert_eq!(key_usage.statements.len(), 2);

    let decrypt = &key_usage.statements[0];
    assert_eq!(decrypt.actions, vec!["kms:Decrypt"]);
    assert_eq!(decrypt.resources, vec![unit.key().key_arn()]);

    let encrypt = &key_usage.statements[1];
    assert_eq!(encrypt.actions, vec!["kms:Encrypt"]);
    assert_eq!(encrypt.resources, vec![unit.target_key_arn()]);
    assert!(!encrypt.resources[0].is_literal());
    assert_eq!(
        encrypt.resources[0],
        Token::get_att(unit.lookup().logical_id(), "Parameter.Value")
    );
}

#[test]
fn test_role_policy_renders_five_statements() {
    let (stack, unit) = build();
    let policy = unit.role().default_policy().unwrap();
    let resource = stack.resource(policy.logical_id()).unwrap();
    let statements = resource.property("PolicyDocument").unwrap()["Statement"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(statements.len(), 5);
    assert_eq!(statements[4]["Action"], json!("kms:Encrypt"));
    assert_eq!(statements[4]["Resource"], unit.target_key_arn().to_json());
}

#[test]
fn test_capability_display() {
    assert_eq!(GrantCapability::KeyUsage.to_string(), "key-usage");
    assert_eq!(
        GrantCapability::WriteDestinationObjects.to_string(),
        "write-destination-objects"
    );
}
