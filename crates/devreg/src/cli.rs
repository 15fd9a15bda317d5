//! Clap derive structures for the `devreg` CLI.
//!
//! Global flags apply to every subcommand. Registry-bound commands resolve
//! their connection from the active profile, with flags taking priority.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// ── Top-level CLI ────────────────────────────────────────────────────

/// devreg: manage device credentials in a device registry
#[derive(Debug, Parser)]
#[command(
    name = "devreg",
    version,
    about = "Manage device registry credentials from the command line",
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Registry profile to use
    #[arg(long, short = 'p', env = "DEVREG_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Registry base URL (overrides profile)
    #[arg(long, env = "DEVREG_REGISTRY", global = true)]
    pub registry: Option<String>,

    /// Output format (defaults to the configured `[defaults] output`)
    #[arg(long, short = 'o', env = "DEVREG_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "DEVREG_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "DEVREG_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    JsonCompact,
    Yaml,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read, replace and validate device credentials
    #[command(alias = "creds")]
    Credentials(CredentialsArgs),

    /// Offline checks for device documents
    Device(DeviceArgs),

    /// Inspect the CLI configuration
    Config(ConfigArgs),
}

// ── Credentials ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub command: CredentialsCommand,
}

#[derive(Debug, Subcommand)]
pub enum CredentialsCommand {
    /// Fetch all credentials of a device
    Get {
        /// Device identifier
        device_id: String,

        #[command(flatten)]
        tenant: TenantArg,
    },

    /// Replace all credentials of a device with the contents of a JSON file
    Set {
        /// Device identifier
        device_id: String,

        /// JSON file holding an array of credentials
        #[arg(long, short = 'f')]
        file: PathBuf,

        /// Only replace when the registry's resource version matches
        #[arg(long)]
        if_match: Option<String>,

        #[command(flatten)]
        tenant: TenantArg,
    },

    /// Check a credentials JSON file without contacting a registry
    Validate {
        /// JSON file holding an array of credentials
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct TenantArg {
    /// Tenant identifier (defaults to the profile's tenant)
    #[arg(long, short = 't', env = "DEVREG_TENANT")]
    pub tenant: Option<String>,
}

// ── Device ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Check a device JSON document without contacting a registry
    Validate {
        /// JSON file holding a device object
        file: PathBuf,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the effective configuration (passwords are never shown)
    Show,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
