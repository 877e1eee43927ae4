//! scaffold::tree
//!
//! The capability tree: every command the backend knows, with a JSON-Schema
//! parameter object at each leaf.
//!
//! # Design
//!
//! Subcommands live in a `BTreeMap` so serialization is deterministic; two
//! requests for the capability tree produce byte-identical JSON. Parameter
//! schemas are plain `serde_json::Value`s and are compiled on demand when a
//! command runs.

use std::collections::BTreeMap;

use jsonschema::JSONSchema;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::ScaffoldError;

/// Name of the root node.
pub const ROOT_NAME: &str = "ansible-creator";

/// One node of the capability tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityNode {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub subcommands: BTreeMap<String, CapabilityNode>,
    /// JSON-Schema object describing the parameters; leaves only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl CapabilityNode {
    /// A group node with no parameters.
    pub fn group(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            subcommands: BTreeMap::new(),
            parameters: None,
        }
    }

    /// A leaf node with a parameter schema.
    pub fn leaf(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            parameters: Some(parameters),
            ..Self::group(name, description)
        }
    }

    pub fn with(mut self, child: CapabilityNode) -> Self {
        self.subcommands.insert(child.name.clone(), child);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.subcommands.is_empty()
    }

    /// Walk a command path down from this node.
    ///
    /// # Errors
    ///
    /// - `EmptyPath` for an empty path
    /// - `UnknownCommand` naming the first segment that does not exist
    /// - `NotALeaf` when the path stops at a group
    pub fn resolve(&self, path: &[String]) -> Result<&CapabilityNode, ScaffoldError> {
        if path.is_empty() {
            return Err(ScaffoldError::EmptyPath);
        }

        let mut node = self;
        for segment in path {
            node = node
                .subcommands
                .get(segment)
                .ok_or_else(|| ScaffoldError::UnknownCommand {
                    segment: segment.clone(),
                    path: path.join(" "),
                })?;
        }

        if !node.is_leaf() {
            return Err(ScaffoldError::NotALeaf {
                path: path.join(" "),
                available: node.subcommands.keys().cloned().collect(),
            });
        }
        Ok(node)
    }

    /// Validate parameters against this leaf's schema.
    ///
    /// # Errors
    ///
    /// `InvalidParams` listing every violation.
    pub fn validate_params(&self, params: &Map<String, Value>) -> Result<(), ScaffoldError> {
        let Some(schema) = &self.parameters else {
            return Ok(());
        };
        let compiled = JSONSchema::compile(schema)
            .map_err(|e| ScaffoldError::Render(format!("invalid parameter schema: {}", e)))?;
        let instance = Value::Object(params.clone());
        let result = compiled.validate(&instance);
        if let Err(errors) = result {
            let details = errors.map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
            return Err(ScaffoldError::InvalidParams(details));
        }
        Ok(())
    }

    /// Fill in `default` values declared by the schema for absent keys.
    pub fn apply_defaults(&self, params: &Map<String, Value>) -> Map<String, Value> {
        let mut out = params.clone();
        let properties = self
            .parameters
            .as_ref()
            .and_then(|p| p.get("properties"))
            .and_then(Value::as_object);
        if let Some(properties) = properties {
            for (key, prop) in properties {
                if let Some(default) = prop.get("default") {
                    out.entry(key.clone()).or_insert_with(|| default.clone());
                }
            }
        }
        out
    }
}

fn fqcn_param() -> Value {
    json!({
        "type": "string",
        "description": "Collection name in the form <namespace>.<name>",
        "pattern": "^[a-z][a-z0-9_]*\\.[a-z][a-z0-9_]*$",
    })
}

fn identifier_param(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
        "pattern": "^[a-z][a-z0-9_]*$",
    })
}

fn params(required: &[&str], properties: Value) -> Value {
    json!({
        "type": "object",
        "required": required,
        "properties": properties,
        "additionalProperties": false,
    })
}

fn devcontainer_image() -> Value {
    json!({
        "type": "string",
        "description": "Container image for the development environment",
        "default": "ghcr.io/ansible/community-ansible-dev-tools:latest",
    })
}

/// The tree served by the built-in template backend.
pub fn builtin() -> CapabilityNode {
    let init = CapabilityNode::group("init", "Initialize a new Ansible project.")
        .with(CapabilityNode::leaf(
            "collection",
            "Create a new Ansible collection project.",
            params(
                &["collection"],
                json!({
                    "collection": fqcn_param(),
                    "project": {
                        "type": "string",
                        "description": "Project type",
                        "default": "collection",
                    },
                }),
            ),
        ))
        .with(CapabilityNode::leaf(
            "playbook",
            "Create a new Ansible playbook project.",
            params(
                &["collection"],
                json!({
                    "collection": fqcn_param(),
                    "project": {
                        "type": "string",
                        "description": "Project type",
                        "default": "ansible-project",
                    },
                }),
            ),
        ))
        .with(CapabilityNode::leaf(
            "execution_env",
            "Create a new execution environment project.",
            params(
                &[],
                json!({
                    "image_name": {
                        "type": "string",
                        "description": "Name of the image built by the workflow",
                        "default": "ansible-ee",
                    },
                }),
            ),
        ));

    let resource = CapabilityNode::group("resource", "Add a resource to an existing project.")
        .with(CapabilityNode::leaf(
            "devfile",
            "Add a devfile for cloud development environments.",
            params(&[], json!({ "image": devcontainer_image() })),
        ))
        .with(CapabilityNode::leaf(
            "devcontainer",
            "Add devcontainer definitions for docker and podman.",
            params(&[], json!({ "image": devcontainer_image() })),
        ))
        .with(CapabilityNode::leaf(
            "execution-environment",
            "Add an execution-environment.yml definition.",
            params(
                &[],
                json!({
                    "base_image": {
                        "type": "string",
                        "description": "Base image for the execution environment",
                        "default": "quay.io/fedora/fedora:latest",
                    },
                }),
            ),
        ))
        .with(CapabilityNode::leaf(
            "pattern",
            "Add a pattern skeleton to a collection.",
            params(
                &["pattern_name"],
                json!({ "pattern_name": identifier_param("Name of the pattern") }),
            ),
        ));

    let mut plugin = CapabilityNode::group("plugin", "Add a plugin to an existing collection.");
    for kind in ["filter", "lookup", "module"] {
        plugin = plugin.with(CapabilityNode::leaf(
            kind,
            &format!("Add a {} plugin.", kind),
            params(
                &["plugin_name"],
                json!({ "plugin_name": identifier_param("Name of the plugin") }),
            ),
        ));
    }

    let add = CapabilityNode::group("add", "Add resources or plugins to a project.")
        .with(resource)
        .with(plugin);

    CapabilityNode::group(ROOT_NAME, "Scaffold Ansible content.")
        .with(init)
        .with(add)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builtin_tree_has_expected_shape() {
        let tree = builtin();
        assert_eq!(tree.name, ROOT_NAME);
        let init = &tree.subcommands["init"];
        for leaf in ["collection", "playbook", "execution_env"] {
            assert!(init.subcommands.contains_key(leaf), "missing init {}", leaf);
        }
        assert!(tree.subcommands["add"].subcommands.contains_key("resource"));
    }

    #[test]
    fn serialization_is_stable() {
        let a = serde_json::to_string(&builtin()).unwrap();
        let b = serde_json::to_string(&builtin()).unwrap();
        assert_eq!(a, b);
        assert!(!a.contains("\"subcommands\":{}"));
    }

    #[test]
    fn resolve_finds_leaf() {
        let tree = builtin();
        let node = tree.resolve(&path(&["init", "collection"])).unwrap();
        assert_eq!(node.name, "collection");
        assert!(node.parameters.as_ref().unwrap()["properties"]
            .get("collection")
            .is_some());
    }

    #[test]
    fn resolve_names_missing_segment() {
        let tree = builtin();
        match tree.resolve(&path(&["init", "nonexistent"])) {
            Err(ScaffoldError::UnknownCommand { segment, path }) => {
                assert_eq!(segment, "nonexistent");
                assert_eq!(path, "init nonexistent");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn resolve_rejects_groups_and_empty_paths() {
        let tree = builtin();
        assert!(matches!(
            tree.resolve(&path(&["add", "resource"])),
            Err(ScaffoldError::NotALeaf { .. })
        ));
        assert!(matches!(tree.resolve(&[]), Err(ScaffoldError::EmptyPath)));
    }

    #[test]
    fn params_are_validated() {
        let tree = builtin();
        let node = tree.resolve(&path(&["init", "collection"])).unwrap();

        let mut params = Map::new();
        assert!(matches!(
            node.validate_params(&params),
            Err(ScaffoldError::InvalidParams(_))
        ));

        params.insert("collection".into(), Value::from("Bad Name"));
        assert!(node.validate_params(&params).is_err());

        params.insert("collection".into(), Value::from("ns.name"));
        assert!(node.validate_params(&params).is_ok());

        params.insert("surprise".into(), Value::from(1));
        assert!(node.validate_params(&params).is_err());
    }

    #[test]
    fn defaults_fill_absent_keys_only() {
        let tree = builtin();
        let node = tree.resolve(&path(&["init", "collection"])).unwrap();

        let mut params = Map::new();
        params.insert("collection".into(), Value::from("ns.name"));
        let filled = node.apply_defaults(&params);
        assert_eq!(filled["project"], "collection");

        params.insert("project".into(), Value::from("custom"));
        assert_eq!(node.apply_defaults(&params)["project"], "custom");
    }
}
