//! Logical id and physical name generation
//!
//! Both are pure functions of their inputs so that synthesizing the same app
//! twice produces byte-identical templates.

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Maximum length of a CloudFormation logical id
const MAX_LOGICAL_ID_LEN: usize = 255;

/// Length of the path hash appended to logical ids
const PATH_HASH_LEN: usize = 8;

/// Path components that do not contribute to the human-readable part
const HIDDEN_COMPONENTS: &[&str] = &["Resource", "Default"];

/// Characters of the stack name kept at the front of generated names
const STACK_PART_LEN: usize = 25;

/// Characters of the construct id kept in generated names
const ID_PART_LEN: usize = 24;

/// Length of the environment hash at the end of generated names
const NAME_HASH_LEN: usize = 12;

fn remove_non_alphanumeric(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

fn path_hash(components: &[&str]) -> String {
    let digest = Sha256::digest(components.join("/").as_bytes());
    hex::encode_upper(digest)[..PATH_HASH_LEN].to_string()
}

/// Compute a logical id from a construct path
///
/// A single-component path is used verbatim (after stripping characters that
/// are not allowed in logical ids). Deeper paths join their visible components
/// and append a hash of the full path so that distinct paths never collide.
pub fn logical_id(components: &[&str]) -> String {
    if components.len() == 1 {
        return remove_non_alphanumeric(components[0]);
    }

    let mut visible: Vec<&str> = Vec::with_capacity(components.len());
    for component in components {
        if HIDDEN_COMPONENTS.contains(component) {
            continue;
        }
        if visible.last() == Some(component) {
            continue;
        }
        visible.push(component);
    }

    let human: String = visible.iter().map(|c| remove_non_alphanumeric(c)).collect();
    let max_human = MAX_LOGICAL_ID_LEN - PATH_HASH_LEN;
    let human = if human.len() > max_human {
        human[human.len() - max_human..].to_string()
    } else {
        human
    };

    format!("{}{}", human, path_hash(components))
}

/// Generate a deterministic physical name for a resource
///
/// The name is derived from the owning stack, the resource's unique id and
/// its environment, so it is known at synthesis time and can be consumed by
/// stacks in other regions without a deployment-time lookup.
pub fn generate_physical_name(
    stack_name: &str,
    unique_id: &str,
    region: &str,
    account: &str,
) -> Result<String> {
    if region.is_empty() {
        return Err(Error::unresolved_environment(stack_name, unique_id, "region"));
    }
    if account.is_empty() {
        return Err(Error::unresolved_environment(stack_name, unique_id, "account"));
    }

    let stack_bare = remove_non_alphanumeric(stack_name);
    let id_bare = remove_non_alphanumeric(unique_id);

    let stack_part: String = stack_bare.chars().take(STACK_PART_LEN).collect();
    let id_part: String = if id_bare.len() > ID_PART_LEN {
        id_bare[id_bare.len() - ID_PART_LEN..].to_string()
    } else {
        id_bare.clone()
    };

    let mut hasher = Sha256::new();
    hasher.update(stack_bare.as_bytes());
    hasher.update(id_bare.as_bytes());
    hasher.update(region.as_bytes());
    hasher.update(account.as_bytes());
    let hash = hex::encode(hasher.finalize());

    Ok(format!("{}{}{}", stack_part, id_part, &hash[..NAME_HASH_LEN]).to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_single_component_is_verbatim() {
        assert_eq!(logical_id(&["MyCrrRole"]), "MyCrrRole");
        assert_eq!(logical_id(&["My-Crr.Role"]), "MyCrrRole");
    }

    #[test_case(&["MySource", "MySourceKey", "Resource"], "MySourceMySourceKey" ; "resource component hidden")]
    #[test_case(&["MySource", "MyCrrRole", "DefaultPolicy", "Resource"], "MySourceMyCrrRoleDefaultPolicy" ; "nested policy")]
    #[test_case(&["A", "A", "B"], "AB" ; "consecutive duplicates collapsed")]
    fn test_logical_id_human_part(path: &[&str], human: &str) {
        let id = logical_id(path);
        assert!(id.starts_with(human), "{} should start with {}", id, human);
        assert_eq!(id.len(), human.len() + PATH_HASH_LEN);
    }

    #[test]
    fn test_logical_id_distinguishes_hidden_components() {
        let a = logical_id(&["Scope", "Key", "Resource"]);
        let b = logical_id(&["Scope", "Key"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_physical_name_is_deterministic() {
        let a = generate_physical_name(
            "MultiRegionS3CrrKmsCmkTarget",
            "MyTargetMyTargetBucket1A2B3C4D",
            "ap-northeast-2",
            "554416834557",
        )
        .unwrap();
        let b = generate_physical_name(
            "MultiRegionS3CrrKmsCmkTarget",
            "MyTargetMyTargetBucket1A2B3C4D",
            "ap-northeast-2",
            "554416834557",
        )
        .unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("multiregions3crrkmscmktar"));
    }

    #[test]
    fn test_physical_name_depends_on_region() {
        let a = generate_physical_name("Stack", "Bucket", "eu-west-2", "554416834557").unwrap();
        let b = generate_physical_name("Stack", "Bucket", "ap-northeast-2", "554416834557").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_physical_name_requires_environment() {
        let err = generate_physical_name("Stack", "Bucket", "", "554416834557").unwrap_err();
        assert!(matches!(err, Error::UnresolvedEnvironment { ref field, .. } if field == "region"));

        let err = generate_physical_name("Stack", "Bucket", "eu-west-2", "").unwrap_err();
        assert!(matches!(err, Error::UnresolvedEnvironment { ref field, .. } if field == "account"));
    }

    proptest! {
        #[test]
        fn prop_physical_name_fits_bucket_rules(
            stack in "[A-Za-z][A-Za-z0-9-]{0,80}",
            id in "[A-Za-z][A-Za-z0-9]{0,80}",
        ) {
            let name = generate_physical_name(&stack, &id, "eu-west-2", "123456789012").unwrap();
            prop_assert!(name.len() <= 63);
            prop_assert!(name.len() >= NAME_HASH_LEN);
            prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }

        #[test]
        fn prop_logical_id_is_alphanumeric(parts in proptest::collection::vec("[A-Za-z0-9./-]{1,20}", 1..5)) {
            let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
            let id = logical_id(&refs);
            prop_assert!(id.len() <= MAX_LOGICAL_ID_LEN);
            prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
