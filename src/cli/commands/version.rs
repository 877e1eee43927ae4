//! version command - Print the installed developer tool versions

use crate::cli::Context;
use crate::core::versions::{self, CommandProbe};
use crate::ui::output;
use anyhow::Result;

/// Print one line per tool, `not installed` for tools that cannot be run.
///
/// The table is printed even in quiet mode; it is the command's only output.
pub fn version(ctx: &Context) -> Result<()> {
    output::debug("probing tool versions", ctx.verbosity());
    let table = versions::render_table(&versions::collect(&CommandProbe));
    println!("{}", table);
    Ok(())
}
