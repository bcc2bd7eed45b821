use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use reconcile::State;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stpconf")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative spanning-tree configuration for NX-OS devices", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Settings file (default: ~/.config/stpconf/config.toml)
    #[arg(long, global = true, env = "STPCONF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Device profile from the settings file
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile a device with an invocation file
    Run(RunArgs),

    /// Print the commands for the declared records without a device
    Render(RenderArgs),

    /// Print the spanning-tree records found on the device
    Gather(OutputArgs),

    /// Turn a saved running-config into records
    Parse(ParseArgs),

    /// Check an invocation file without running it
    Validate {
        /// Invocation file (TOML or JSON)
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Invocation file (TOML or JSON)
    pub file: PathBuf,

    /// Override the state from the file
    #[arg(short, long)]
    pub state: Option<State>,

    /// Compute and report without applying
    #[arg(long)]
    pub check: bool,

    /// Apply without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct RenderArgs {
    /// Invocation file (TOML or JSON)
    pub file: PathBuf,

    /// Platform to render for (defaults to the file or device profile)
    #[arg(long)]
    pub platform: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct ParseArgs {
    /// Saved `show running-config spanning-tree` output
    pub file: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Clone, Copy, Default)]
pub struct OutputArgs {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}
