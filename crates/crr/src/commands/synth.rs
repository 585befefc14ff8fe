//! Synth command

use anyhow::{Context, Result};
use camino::Utf8Path;
use crr::build_app;
use crr_core::DeploymentNonce;
use tracing::debug;

use crate::cli::SynthArgs;
use crate::output;

pub fn run(args: SynthArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = super::load_config(config_path, args.overrides.into_overrides(args.output))?;

    let nonce = match args.nonce {
        Some(value) => DeploymentNonce::fixed(value),
        None => DeploymentNonce::from_clock(),
    };
    debug!("Deployment nonce: {}", nonce);

    let assembly = build_app(&config, nonce)
        .and_then(|app| app.synth())
        .context("Failed to synthesize")?;

    if args.stdout {
        println!("{}", serde_json::to_string_pretty(&assembly.to_json()?)?);
        return Ok(());
    }

    let dir = config.output_dir();
    let written = assembly
        .write_to(dir)
        .with_context(|| format!("Failed to write cloud assembly to {}", dir))?;

    output::success(&format!("Synthesized {} stacks to {}", assembly.artifacts.len(), dir));
    for path in &written {
        output::kv("wrote", path.as_str());
    }
    output::deployment_order(&assembly.deployment_order());

    Ok(())
}
