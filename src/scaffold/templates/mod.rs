//! scaffold::templates
//!
//! The built-in template backend.
//!
//! # Design
//!
//! Each [`Command`] maps to a fixed template set and an output directory
//! name. Rendering is plain placeholder substitution: `{{ name }}` is
//! replaced only when `name` is a variable the command defines, so Jinja
//! expressions in generated playbooks survive verbatim.

mod content;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::command::{Command, PluginKind};
use super::logs::LogBuffer;
use super::tree::{self, CapabilityNode};
use super::{workspace, ScaffoldBackend, ScaffoldError, ScaffoldOutput, ScaffoldResult};
use content::Template;

/// Template variables for one render.
type Vars = BTreeMap<&'static str, String>;

/// Backend that renders the built-in templates.
#[derive(Debug, Clone)]
pub struct TemplateBackend {
    tree: CapabilityNode,
}

impl TemplateBackend {
    pub fn new() -> Self {
        Self {
            tree: tree::builtin(),
        }
    }
}

impl Default for TemplateBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// What a command produces.
struct Plan {
    /// Directory created inside the workspace.
    dir_name: String,
    templates: &'static [Template],
    vars: Vars,
    message: String,
}

impl ScaffoldBackend for TemplateBackend {
    fn name(&self) -> &str {
        "templates"
    }

    fn capabilities(&self) -> &CapabilityNode {
        &self.tree
    }

    fn run(&self, path: &[String], params: &Map<String, Value>) -> ScaffoldResult {
        let mut logs = LogBuffer::new();

        let node = match self.tree.resolve(path) {
            Ok(node) => node,
            Err(e) => return fail(e, logs, None),
        };
        if let Err(e) = node.validate_params(params) {
            return fail(e, logs, None);
        }
        let params = node.apply_defaults(params);

        let plan = match plan_for(&Command::from_path(path), &params) {
            Ok(plan) => plan,
            Err(e) => return fail(e, logs, None),
        };

        let workdir = match workspace() {
            Ok(dir) => dir,
            Err(e) => return fail(e, logs, None),
        };
        logs.debug(format!("working directory: {}", workdir.path().display()));

        let out = workdir.path().join(&plan.dir_name);
        match render_all(&out, plan.templates, &plan.vars, &mut logs) {
            Ok(()) => {
                logs.note(&plan.message);
                ScaffoldResult::ok(plan.message, logs.into_lines(), ScaffoldOutput::new(workdir, out))
            }
            Err(e) => fail(e, logs, Some(ScaffoldOutput::new(workdir, out))),
        }
    }
}

fn fail(err: ScaffoldError, mut logs: LogBuffer, partial: Option<ScaffoldOutput>) -> ScaffoldResult {
    let message = err.to_string();
    logs.error(&message);
    ScaffoldResult::error(message, logs.into_lines(), partial)
}

fn param(params: &Map<String, Value>, key: &str) -> Result<String, ScaffoldError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ScaffoldError::InvalidParams(format!("'{}' is required", key)))
}

fn split_fqcn(fqcn: &str) -> Result<(String, String), ScaffoldError> {
    match fqcn.split_once('.') {
        Some((ns, name)) if !ns.is_empty() && !name.is_empty() && !name.contains('.') => {
            Ok((ns.to_string(), name.to_string()))
        }
        _ => Err(ScaffoldError::InvalidParams(format!(
            "collection '{}' must be in the form <namespace>.<name>",
            fqcn
        ))),
    }
}

fn plan_for(command: &Command, params: &Map<String, Value>) -> Result<Plan, ScaffoldError> {
    let mut vars = Vars::new();
    let plan = match command {
        Command::InitCollection => {
            let fqcn = param(params, "collection")?;
            let (ns, name) = split_fqcn(&fqcn)?;
            vars.insert("namespace", ns);
            vars.insert("collection_name", name);
            Plan {
                dir_name: fqcn.clone(),
                templates: content::COLLECTION,
                vars,
                message: format!("Collection {} created", fqcn),
            }
        }
        Command::InitPlaybook => {
            let fqcn = param(params, "collection")?;
            let (ns, name) = split_fqcn(&fqcn)?;
            let dir_name = format!("{}-{}", ns, name);
            vars.insert("namespace", ns);
            vars.insert("collection_name", name);
            Plan {
                dir_name,
                templates: content::PLAYBOOK,
                vars,
                message: format!("Playbook project for {} created", fqcn),
            }
        }
        Command::InitExecutionEnv => {
            let image = param(params, "image_name")?;
            vars.insert("image_name", image.clone());
            Plan {
                dir_name: "execution_env".to_string(),
                templates: content::EXECUTION_ENV_PROJECT,
                vars,
                message: format!("Execution environment project {} created", image),
            }
        }
        Command::AddDevfile => {
            vars.insert("image", param(params, "image")?);
            Plan {
                dir_name: "devfile".to_string(),
                templates: content::DEVFILE,
                vars,
                message: "Resource devfile added".to_string(),
            }
        }
        Command::AddDevcontainer => {
            vars.insert("image", param(params, "image")?);
            Plan {
                dir_name: "devcontainer".to_string(),
                templates: content::DEVCONTAINER,
                vars,
                message: "Resource devcontainer added".to_string(),
            }
        }
        Command::AddExecutionEnvironment => {
            vars.insert("base_image", param(params, "base_image")?);
            Plan {
                dir_name: "execution-environment".to_string(),
                templates: content::EXECUTION_ENVIRONMENT,
                vars,
                message: "Resource execution-environment added".to_string(),
            }
        }
        Command::AddPattern => {
            let name = param(params, "pattern_name")?;
            vars.insert("pattern_name", name.clone());
            Plan {
                dir_name: "pattern".to_string(),
                templates: content::PATTERN,
                vars,
                message: format!("Pattern {} added", name),
            }
        }
        Command::AddPlugin(kind) => {
            let name = param(params, "plugin_name")?;
            vars.insert("plugin_name", name.clone());
            let templates = match kind {
                PluginKind::Filter => content::FILTER_PLUGIN,
                PluginKind::Lookup => content::LOOKUP_PLUGIN,
                PluginKind::Module => content::MODULE_PLUGIN,
            };
            Plan {
                dir_name: format!("plugin-{}", kind.dir_name()),
                templates,
                vars,
                message: format!("{} plugin {} added", kind, name),
            }
        }
        Command::Unknown(path) => return Err(ScaffoldError::Unsupported(path.join(" "))),
    };
    Ok(plan)
}

fn render_all(
    out: &Path,
    templates: &[Template],
    vars: &Vars,
    logs: &mut LogBuffer,
) -> Result<(), ScaffoldError> {
    fs::create_dir_all(out)?;
    for template in templates {
        let relative = render(template.path, vars);
        let dest = safe_join(out, &relative)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ScaffoldError::Render(format!("{}: {}", parent.display(), e)))?;
        }
        fs::write(&dest, render(template.body, vars))
            .map_err(|e| ScaffoldError::Render(format!("{}: {}", dest.display(), e)))?;
        logs.debug(format!("wrote {}", relative));
    }
    Ok(())
}

/// Join a rendered relative path, refusing anything that escapes `root`.
fn safe_join(root: &Path, relative: &str) -> Result<PathBuf, ScaffoldError> {
    let rel = Path::new(relative);
    let escapes = rel.components().any(|c| {
        !matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir)
    });
    if escapes {
        return Err(ScaffoldError::Render(format!(
            "template path '{}' escapes the output directory",
            relative
        )));
    }
    Ok(root.join(rel))
}

/// Substitute `{{ key }}` placeholders for known keys.
///
/// Whitespace inside the braces is optional. Unknown keys are left as-is.
fn render(template: &str, vars: &Vars) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(&after[..end]);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
