//! Terminal rendering of plans and configuration

use console::style;
use crr_core::{CrrConfig, StackArtifact};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// A synthesized stack: name and environment, then its ordering facts
pub fn stack_summary(artifact: &StackArtifact) {
    println!(
        "\n{} {}",
        style(&artifact.stack_name).bold().underlined(),
        style(&artifact.environment).dim()
    );
    kv("Resources", &artifact.template.resources.len().to_string());
    if !artifact.dependencies.is_empty() {
        kv("Depends on", &artifact.dependencies.join(", "));
    }
    kv("Resource order", &artifact.resource_order.join(" -> "));
}

/// The order stacks must be deployed in
pub fn deployment_order(stacks: &[&str]) {
    println!(
        "{} Deploy in order: {}",
        style("→").cyan().bold(),
        stacks.join(" -> ")
    );
}

/// Account and both ends of the replication
pub fn replication_pair(config: &CrrConfig) {
    kv("Account", config.account());
    kv(
        "Source",
        &format!("{} ({})", config.source().stack_name, config.source().region),
    );
    kv(
        "Target",
        &format!("{} ({})", config.target().stack_name, config.target().region),
    );
}
