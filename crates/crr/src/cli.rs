//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use crr_core::ConfigOverrides;

/// crr - cross-region, KMS-encrypted S3 replication plans
#[derive(Parser, Debug)]
#[command(name = "crr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to crr.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Synthesize the cloud assembly
    Synth(SynthArgs),

    /// List stacks in deployment order
    List(ListArgs),

    /// Synthesize in memory and check the plan
    Validate(ValidateArgs),
}

/// Values that override crr.yaml and CRR_* environment variables
#[derive(Args, Debug, Default, Clone)]
pub struct OverrideArgs {
    /// Account both stacks deploy into
    #[arg(long)]
    pub account: Option<String>,

    /// Region of the target (replica) stack
    #[arg(long)]
    pub target_region: Option<String>,

    /// Region of the source stack
    #[arg(long)]
    pub source_region: Option<String>,
}

impl OverrideArgs {
    pub fn into_overrides(self, output_dir: Option<Utf8PathBuf>) -> ConfigOverrides {
        ConfigOverrides {
            account: self.account,
            target_region: self.target_region,
            source_region: self.source_region,
            output_dir,
        }
    }
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Config commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new crr.yaml
    Init(ConfigInitArgs),

    /// Validate the configuration
    Validate(ConfigValidateArgs),

    /// Show resolved configuration
    Show(ConfigShowArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "crr.yaml")]
    pub output: Utf8PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Args, Debug)]
pub struct ConfigValidateArgs {
    /// Path to config file (default: find crr.yaml)
    #[arg(short, long)]
    pub file: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Synth command
#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Output directory (default: output_dir from crr.yaml)
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    /// Fixed deployment nonce for a reproducible plan (default: current time)
    #[arg(long)]
    pub nonce: Option<String>,

    /// Print the assembly as JSON instead of writing files
    #[arg(long)]
    pub stdout: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

// List command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

// Validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,
}
