//! Validate command

use anyhow::{Context, Result};
use camino::Utf8Path;
use crr::build_app;
use crr_core::DeploymentNonce;

use crate::cli::ValidateArgs;
use crate::output;

pub fn run(args: ValidateArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = super::load_config(config_path, args.overrides.into_overrides(None))?;
    let assembly = build_app(&config, DeploymentNonce::from_clock())
        .and_then(|app| app.synth())
        .context("Plan is invalid")?;

    output::success("Plan is valid");
    for artifact in &assembly.artifacts {
        output::stack_summary(artifact);
    }
    output::deployment_order(&assembly.deployment_order());

    Ok(())
}
