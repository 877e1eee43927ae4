//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! - `--help` / `-h`: Show help
//! - `--version` / `-V`: Show the versions of the installed developer tools
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// adt - Ansible developer tools
#[derive(Parser, Debug)]
#[command(name = "adt")]
#[command(author, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Print the versions of the installed developer tools and exit
    #[arg(short = 'V', long)]
    pub version: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the scaffolding HTTP server
    #[command(long_about = "Run the scaffolding HTTP server.\n\n\
        Settings are read from the config file ($ADT_CONFIG, \
        $XDG_CONFIG_HOME/adt/config.toml or ~/.adt/config.toml) and may be \
        overridden by the flags below. --debug enables per-request access logs.")]
    Server(ServerArgs),

    /// Run the scaffolding backend locally
    Creator(CreatorArgs),

    /// Generate shell completion scripts
    #[command(after_help = "Examples:\n  \
        adt completion bash > ~/.local/share/bash-completion/completions/adt\n  \
        adt completion zsh > ~/.zfunc/_adt")]
    Completion(CompletionArgs),
}

impl Command {
    /// Registry name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Server(_) => "server",
            Command::Creator(_) => "creator",
            Command::Completion(_) => "completion",
        }
    }
}

/// Arguments for `adt server`.
#[derive(Args, Debug, Clone, Default)]
pub struct ServerArgs {
    /// Port to listen on [default: 8000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long)]
    pub bind: Option<String>,

    /// Seconds a single scaffold call may run [default: 300]
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Arguments for `adt creator`.
#[derive(Args, Debug)]
pub struct CreatorArgs {
    #[command(subcommand)]
    pub action: CreatorCommand,
}

/// Local scaffolding actions.
#[derive(Subcommand, Debug)]
pub enum CreatorCommand {
    /// Print the capability tree as JSON
    Capabilities,

    /// Print the parameter schema of one command
    Schema {
        /// Command path, e.g. `init collection`
        #[arg(required = true)]
        path: Vec<String>,
    },

    /// Scaffold a project and write it as a tar archive
    #[command(after_help = "Examples:\n  \
        adt creator scaffold init collection -p collection=acme.web\n  \
        adt creator scaffold add resource devfile -o devfile.tar.gz")]
    Scaffold {
        /// Command path, e.g. `init collection`
        #[arg(required = true)]
        path: Vec<String>,

        /// Command parameter, repeatable
        #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Archive to write [default: <command_path>.tar]
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Arguments for `adt completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}
