//! Clap derive structures for the `fleetsync` CLI.
//!
//! Defines the command tree, global flags, and shared types. Kept free of
//! crate-internal imports so `build.rs` can include it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fleetsync -- keep Zabbix hosts in step with EC2 instances
#[derive(Debug, Parser)]
#[command(
    name = "fleetsync",
    version,
    about = "Reconcile Zabbix hosts with EC2 instance snapshots",
    long_about = "Creates, updates, enables, disables, archives and deletes Zabbix hosts\n\
        so they mirror EC2 instances. Instances are read as the JSON objects\n\
        returned by DescribeInstances or carried in EC2 state-change events.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the configuration file
    #[arg(long, env = "FLEETSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Zabbix frontend or API URL (overrides config)
    #[arg(long, short = 'u', global = true)]
    pub url: Option<String>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the host for an instance, or update it if it drifted
    #[command(alias = "sync")]
    Upsert(HostArgs),

    /// Create the host for an instance without looking it up first
    Create(HostArgs),

    /// Enable monitoring of an instance's host
    Enable(ToggleArgs),

    /// Disable monitoring of an instance's host
    Disable(ToggleArgs),

    /// Disable a host, move it to the archive group and stamp it
    Archive(ArchiveArgs),

    /// Delete an instance's host
    #[command(alias = "rm")]
    Delete(ToggleArgs),

    /// Reconcile every record of a stream batch
    Ingest(IngestArgs),

    /// Inspect the effective configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Host Commands ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InstanceInput {
    /// Instance JSON file, or `-` for stdin
    #[arg(default_value = "-")]
    pub instance: PathBuf,
}

#[derive(Debug, Args)]
pub struct HostArgs {
    #[command(flatten)]
    pub input: InstanceInput,

    /// Host group name (repeatable; defaults to sync.groups)
    #[arg(long = "group", short = 'g')]
    pub groups: Vec<String>,

    /// Template name (repeatable; defaults to sync.templates)
    #[arg(long = "template", short = 't')]
    pub templates: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ToggleArgs {
    #[command(flatten)]
    pub input: InstanceInput,

    /// Succeed without changes when the host does not exist
    #[arg(long)]
    pub ignore_missing: bool,
}

#[derive(Debug, Args)]
pub struct ArchiveArgs {
    #[command(flatten)]
    pub input: InstanceInput,

    /// Reason recorded on the archived host
    #[arg(long, short = 'r')]
    pub reason: Option<String>,

    /// Succeed without changes when the host does not exist
    #[arg(long)]
    pub ignore_missing: bool,
}

// ── Ingest ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Batch JSON file (`{"Records": [...]}`), or `-` for stdin
    #[arg(default_value = "-")]
    pub batch: PathBuf,

    /// Keep going after a failed record and report failures at the end
    #[arg(long)]
    pub continue_on_error: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration with secrets masked
    Show,

    /// Print the configuration file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
