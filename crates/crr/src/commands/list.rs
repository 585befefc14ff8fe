//! List command

use anyhow::{Context, Result};
use camino::Utf8Path;
use crr::build_app;
use crr_core::{CloudAssembly, DeploymentNonce};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::cli::ListArgs;

#[derive(Debug, Tabled, Serialize, PartialEq)]
struct StackRow {
    #[tabled(rename = "#")]
    order: usize,
    stack: String,
    environment: String,
    #[tabled(rename = "depends on")]
    depends_on: String,
    resources: usize,
}

fn rows(assembly: &CloudAssembly) -> Vec<StackRow> {
    assembly
        .artifacts
        .iter()
        .enumerate()
        .map(|(i, artifact)| StackRow {
            order: i + 1,
            stack: artifact.stack_name.clone(),
            environment: artifact.environment.to_string(),
            depends_on: if artifact.dependencies.is_empty() {
                "-".to_string()
            } else {
                artifact.dependencies.join(", ")
            },
            resources: artifact.template.resources.len(),
        })
        .collect()
}

pub fn run(args: ListArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = super::load_config(config_path, args.overrides.into_overrides(None))?;
    let assembly = build_app(&config, DeploymentNonce::from_clock())
        .and_then(|app| app.synth())
        .context("Failed to synthesize")?;

    let rows = rows(&assembly);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        println!("{}", table);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crr_core::CrrConfig;

    #[test]
    fn test_rows_follow_deployment_order() {
        let config = CrrConfig::defaults().unwrap();
        let assembly = build_app(&config, DeploymentNonce::fixed("1"))
            .unwrap()
            .synth()
            .unwrap();

        let rows = rows(&assembly);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stack, "MultiRegionS3CrrKmsCmkTarget");
        assert_eq!(rows[0].depends_on, "-");
        assert_eq!(rows[0].resources, 3);
        assert_eq!(rows[1].stack, "MultiRegionS3CrrKmsCmkSource");
        assert_eq!(rows[1].depends_on, "MultiRegionS3CrrKmsCmkTarget");
        assert_eq!(rows[1].environment, "aws://554416834557/eu-west-2");
    }
}
