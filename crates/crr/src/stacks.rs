//! Target and source stacks and the app that orders them

use tracing::info;

use crr_core::{App, ConstructPath, CrrConfig, DeploymentNonce, Environment, Result, Stack};
use crr_source::{SourceUnit, SourceUnitProps};
use crr_target::TargetUnit;

/// Construct id of the target unit inside its stack
pub const TARGET_CONSTRUCT_ID: &str = "MyTarget";

/// Construct id of the source unit inside its stack
pub const SOURCE_CONSTRUCT_ID: &str = "MySource";

const TARGET_DESCRIPTION: &str = "Replica bucket and key for cross-region replication";
const SOURCE_DESCRIPTION: &str = "Source bucket, key and replication rule for cross-region replication";

/// Stack holding the target unit
#[derive(Debug, Clone)]
pub struct TargetStack {
    stack: Stack,
    unit: TargetUnit,
}

impl TargetStack {
    pub fn new(stack_name: &str, env: Environment) -> Result<Self> {
        let mut stack = Stack::new(stack_name, env);
        stack.set_description(TARGET_DESCRIPTION);
        let unit = TargetUnit::new(&mut stack, &ConstructPath::root().child(TARGET_CONSTRUCT_ID))?;
        Ok(Self { stack, unit })
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn unit(&self) -> &TargetUnit {
        &self.unit
    }

    pub fn region(&self) -> &str {
        self.stack.region()
    }

    pub fn into_stack(self) -> Stack {
        self.stack
    }
}

/// Stack holding the source unit
#[derive(Debug, Clone)]
pub struct SourceStack {
    stack: Stack,
    unit: SourceUnit,
}

impl SourceStack {
    pub fn new(stack_name: &str, env: Environment, props: SourceUnitProps) -> Result<Self> {
        let mut stack = Stack::new(stack_name, env);
        stack.set_description(SOURCE_DESCRIPTION);
        let unit = SourceUnit::new(&mut stack, &ConstructPath::root().child(SOURCE_CONSTRUCT_ID), props)?;
        Ok(Self { stack, unit })
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn unit(&self) -> &SourceUnit {
        &self.unit
    }

    /// Deploy this stack only after `target`
    pub fn add_dependency(&mut self, target: &TargetStack) {
        self.stack.add_dependency(target.stack());
    }

    pub fn into_stack(self) -> Stack {
        self.stack
    }
}

/// Build the two-stack app described by `config`
///
/// Both stacks share the configured account; the source stack reads the
/// target's outputs and is deployed after it.
pub fn build_app(config: &CrrConfig, nonce: DeploymentNonce) -> Result<App> {
    config.validate()?;

    let target = TargetStack::new(&config.target().stack_name, config.target_env())?;

    let props = SourceUnitProps {
        target_bucket: target.unit().target_bucket().clone(),
        target_key_id_parameter_name: target.unit().target_key_id_parameter_name().to_string(),
        target_region: target.region().to_string(),
        lookup: config.lookup().clone(),
        code: config.lookup_code().cloned(),
        nonce,
    };
    let mut source = SourceStack::new(&config.source().stack_name, config.source_env(), props)?;
    source.add_dependency(&target);

    info!(
        "Built app: {} ({}) -> {} ({})",
        source.stack().stack_name(),
        source.stack().region(),
        target.stack().stack_name(),
        target.region()
    );

    let mut app = App::new();
    app.add_stack(target.into_stack())?;
    app.add_stack(source.into_stack())?;
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crr_core::Error;

    fn config() -> CrrConfig {
        CrrConfig::defaults().unwrap()
    }

    #[test]
    fn test_target_stack_uses_target_construct_id() {
        let target = TargetStack::new(
            "MultiRegionS3CrrKmsCmkTarget",
            Environment::new("554416834557", "ap-northeast-2"),
        )
        .unwrap();
        assert!(target
            .stack()
            .template()
            .resources
            .keys()
            .all(|id| id.starts_with(TARGET_CONSTRUCT_ID)));
    }

    #[test]
    fn test_build_app_declares_both_stacks() {
        let app = build_app(&config(), DeploymentNonce::fixed("1")).unwrap();
        let names: Vec<&str> = app.stacks().iter().map(|s| s.stack_name()).collect();
        assert_eq!(
            names,
            vec!["MultiRegionS3CrrKmsCmkTarget", "MultiRegionS3CrrKmsCmkSource"]
        );

        let source = app.stack("MultiRegionS3CrrKmsCmkSource").unwrap();
        assert!(source.dependencies().contains("MultiRegionS3CrrKmsCmkTarget"));
        assert_eq!(source.region(), "eu-west-2");
        assert_eq!(
            source.account(),
            app.stack("MultiRegionS3CrrKmsCmkTarget").unwrap().account()
        );
    }

    #[test]
    fn test_build_app_rejects_same_region() {
        let mut config = config();
        config.config.source.region = config.config.target.region.clone();
        assert!(matches!(
            build_app(&config, DeploymentNonce::fixed("1")).unwrap_err(),
            Error::InvalidConfig { .. }
        ));
    }
}
