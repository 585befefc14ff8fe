mod grants_tests;

use crr_constructs::BucketRef;
use crr_core::types::LookupSettings;
use crr_core::{ConstructPath, DeploymentNonce, Environment, Stack};

use crate::{SourceUnit, SourceUnitProps};

pub(crate) const ACCOUNT: &str = "554416834557";
pub(crate) const TARGET_REGION: &str = "ap-northeast-2";
pub(crate) const PARAMETER_NAME: &str = "MultiRegionS3CrrKmsCmkTarget.MyTargetKeyId";

pub(crate) fn props() -> SourceUnitProps {
    SourceUnitProps {
        target_bucket: BucketRef {
            bucket_name: "multiregions3crrkmscmktarmytargetbucket0123456789ab".to_string(),
            env: Environment::new(ACCOUNT, TARGET_REGION),
        },
        target_key_id_parameter_name: PARAMETER_NAME.to_string(),
        target_region: TARGET_REGION.to_string(),
        lookup: LookupSettings::default(),
        code: None,
        nonce: DeploymentNonce::fixed("1700000000000"),
    }
}

pub(crate) fn source_stack() -> Stack {
    Stack::new(
        "MultiRegionS3CrrKmsCmkSource",
        Environment::new(ACCOUNT, "eu-west-2"),
    )
}

pub(crate) fn build() -> (Stack, SourceUnit) {
    let mut stack = source_stack();
    let unit = SourceUnit::new(&mut stack, &ConstructPath::root().child("MySource"), props()).unwrap();
    (stack, unit)
}
