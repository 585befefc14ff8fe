//! Config command

use anyhow::{anyhow, Context, Result};
use camino::Utf8Path;
use crr_core::config::HierarchicalConfigLoader;
use crr_core::templates::{generate_config, ConfigInitContext};
use crr_core::CrrConfig;

use crate::cli::{ConfigCommands, ConfigInitArgs, ConfigShowArgs, ConfigValidateArgs};
use crate::output;

pub fn run(cmd: ConfigCommands, config_path: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Init(args) => init(args),
        ConfigCommands::Validate(args) => validate(args, config_path),
        ConfigCommands::Show(args) => show(args, config_path),
    }
}

fn init(args: ConfigInitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(anyhow!(
            "File {} already exists. Use --force to overwrite.",
            args.output
        ));
    }

    let defaults = HierarchicalConfigLoader::embedded_defaults()?;
    let mut context = ConfigInitContext::from_config(&defaults);
    let overrides = args.overrides;
    if let Some(account) = overrides.account {
        context = context.with_account(account);
    }
    let target_region = overrides
        .target_region
        .unwrap_or_else(|| context.target_region.clone());
    let source_region = overrides
        .source_region
        .unwrap_or_else(|| context.source_region.clone());
    context = context.with_regions(target_region, source_region);

    let content = generate_config(&context).context("Failed to generate config")?;

    // Reject values the loader would refuse later
    let generated: crr_core::types::CrrConfigFile = serde_yaml_ng::from_str(&content)?;
    CrrConfig::from_file(generated, None).validate()?;

    std::fs::write(&args.output, content)
        .with_context(|| format!("Failed to write {}", args.output))?;

    output::success(&format!("Created {}", args.output));
    output::kv("Account", &context.account);
    output::kv(
        "Replication",
        &format!("{} -> {}", context.source_region, context.target_region),
    );

    Ok(())
}

fn validate(args: ConfigValidateArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let path = args.file.as_deref().or(config_path);
    let config = CrrConfig::load(path)?;

    match &config.config_path {
        Some(path) => output::success(&format!("Configuration is valid: {}", path)),
        None => output::success("Configuration is valid (built-in defaults)"),
    }
    output::replication_pair(&config);

    Ok(())
}

fn show(args: ConfigShowArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = CrrConfig::load(config_path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config.config)?);
    } else {
        println!("{}", config.to_yaml()?);
    }

    Ok(())
}
