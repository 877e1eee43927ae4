//! creator command - Run the scaffold backend locally
//!
//! The same backend the server uses, without HTTP in between: capability
//! and schema lookups print JSON, and `scaffold` writes the generated project
//! as a tar archive next to the caller.

use std::path::{Path, PathBuf};

use crate::archive::{self, Compression};
use crate::cli::args::{Command, CreatorArgs, CreatorCommand};
use crate::cli::Context;
use crate::scaffold::{ScaffoldBackend, ScaffoldStatus, TemplateBackend};
use crate::ui::output::{self, Verbosity};
use anyhow::{bail, Context as _, Result};
use serde_json::{Map, Value};

/// Run one `adt creator` action.
pub fn creator(command: Command, ctx: &Context) -> Result<()> {
    let Command::Creator(CreatorArgs { action }) = command else {
        return Err(super::mismatch("creator", &command));
    };
    let backend = TemplateBackend::new();
    let verbosity = ctx.verbosity();

    match action {
        CreatorCommand::Capabilities => {
            println!("{}", capabilities_json(&backend)?);
        }
        CreatorCommand::Schema { path } => {
            println!("{}", schema_json(&backend, &path)?);
        }
        CreatorCommand::Scaffold {
            path,
            params,
            output: dest,
        } => {
            let dest = dest.unwrap_or_else(|| default_output(&path));
            let entries = scaffold_to(&backend, &path, params, &dest, verbosity)?;
            output::print(output::format_entries(&entries), verbosity);
            output::success(format!("Wrote {}", dest.display()), verbosity);
        }
    }
    Ok(())
}

fn capabilities_json(backend: &dyn ScaffoldBackend) -> Result<String> {
    Ok(serde_json::to_string_pretty(backend.capabilities())?)
}

fn schema_json(backend: &dyn ScaffoldBackend, path: &[String]) -> Result<String> {
    let node = backend.schema_for(path)?;
    Ok(serde_json::to_string_pretty(node)?)
}

/// `init collection` → `init_collection.tar`
fn default_output(path: &[String]) -> PathBuf {
    PathBuf::from(Compression::None.file_name(&path.join("_")))
}

fn compression_for(dest: &Path) -> Compression {
    let name = dest.to_string_lossy();
    if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        Compression::Gzip
    } else {
        Compression::None
    }
}

/// Run the backend, archive its output to `dest` and return the entry names.
///
/// The backend's working directory is removed before returning, on success
/// and on failure.
fn scaffold_to(
    backend: &dyn ScaffoldBackend,
    path: &[String],
    params: Vec<(String, String)>,
    dest: &Path,
    verbosity: Verbosity,
) -> Result<Vec<String>> {
    let params: Map<String, Value> = params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    let result = backend.run(path, &params);
    let (status, message, logs, out) = result.into_parts();
    output::scaffold_logs(&logs, verbosity);

    let Some(out) = out.filter(|_| status == ScaffoldStatus::Ok) else {
        bail!("{}", message);
    };

    let written = archive::create_tar(out.path(), dest, compression_for(dest))
        .with_context(|| format!("failed to archive {}", out.path().display()));
    if let Err(e) = out.cleanup() {
        output::warn(format!("failed to remove working directory: {}", e), verbosity);
    }
    written?;

    let bytes = std::fs::read(dest).with_context(|| format!("failed to read {}", dest.display()))?;
    Ok(archive::entry_names(&bytes, compression_for(dest))?)
}
