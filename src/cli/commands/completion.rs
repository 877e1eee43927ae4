//! completion command - Generate shell completion scripts

use crate::cli::args::{Cli, Command, CompletionArgs, Shell};
use crate::cli::Context;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, shells};

/// Generate shell completion scripts.
pub fn completion(command: Command, _ctx: &Context) -> Result<()> {
    let Command::Completion(CompletionArgs { shell }) = command else {
        return Err(super::mismatch("completion", &command));
    };

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let mut out = std::io::stdout();

    match shell {
        Shell::Bash => generate(shells::Bash, &mut cmd, &name, &mut out),
        Shell::Zsh => generate(shells::Zsh, &mut cmd, &name, &mut out),
        Shell::Fish => generate(shells::Fish, &mut cmd, &name, &mut out),
        Shell::PowerShell => generate(shells::PowerShell, &mut cmd, &name, &mut out),
    }

    Ok(())
}
