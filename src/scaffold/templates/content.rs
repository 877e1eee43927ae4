//! scaffold::templates::content
//!
//! Built-in file templates. Paths and bodies may contain `{{ var }}`
//! placeholders; Jinja expressions meant for Ansible are left untouched
//! because only known variables are substituted.

/// One file to generate.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub path: &'static str,
    pub body: &'static str,
}

const fn t(path: &'static str, body: &'static str) -> Template {
    Template { path, body }
}

const GITIGNORE: &str = r#"# Generated by ansible-creator
__pycache__/
*.py[cod]
.tox/
.cache/
tests/output/
*.tar.gz
"#;

pub const COLLECTION: &[Template] = &[
    t(
        "galaxy.yml",
        r#"---
namespace: {{ namespace }}
name: {{ collection_name }}
version: 1.0.0
readme: README.md
authors:
  - your name <example@domain.com>
description: your collection description
license_file: LICENSE
tags: []
dependencies: {}
repository: http://example.com/repository
documentation: http://docs.example.com
homepage: http://example.com
issues: http://example.com/issue/tracker
build_ignore:
  - .gitignore
  - changelogs/.plugin-cache.yaml
"#,
    ),
    t(
        "README.md",
        r#"# {{ namespace }}.{{ collection_name }} Collection

This repository contains the `{{ namespace }}.{{ collection_name }}` Ansible Collection.

## Installing this collection

```
ansible-galaxy collection install {{ namespace }}.{{ collection_name }}
```
"#,
    ),
    t(
        "meta/runtime.yml",
        r#"---
requires_ansible: ">=2.15.0"
"#,
    ),
    t(
        "plugins/README.md",
        r#"# Collections Plugins Directory

This directory can be used to ship various plugins inside an Ansible collection.
Refer to them by their fully qualified collection name, for example
`{{ namespace }}.{{ collection_name }}.sample_filter`.
"#,
    ),
    t(
        "roles/run/tasks/main.yml",
        r#"---
- name: Debug print task-1
  ansible.builtin.debug:
    msg: "This is task-1 on {{ inventory_hostname }}"
"#,
    ),
    t(
        "tests/integration/targets/hello_world/tasks/main.yml",
        r#"---
- name: Basic hello world test
  ansible.builtin.assert:
    that:
      - true
"#,
    ),
    t("docs/.keep", ""),
    t(".gitignore", GITIGNORE),
];

pub const PLAYBOOK: &[Template] = &[
    t(
        "site.yml",
        r#"---
- name: Draw the site
  hosts: all
  gather_facts: true
  tasks:
    - name: Run the local collection role
      ansible.builtin.import_role:
        name: {{ namespace }}.{{ collection_name }}.run
"#,
    ),
    t(
        "ansible.cfg",
        r#"[defaults]
inventory = inventory/hosts.yml
collections_path = collections
"#,
    ),
    t(
        "ansible-navigator.yml",
        r#"---
ansible-navigator:
  execution-environment:
    enabled: true
  playbook-artifact:
    enable: false
"#,
    ),
    t(
        "inventory/hosts.yml",
        r#"---
all:
  hosts:
    localhost:
      ansible_connection: local
"#,
    ),
    t(
        "collections/requirements.yml",
        r#"---
collections:
  - name: ansible.utils
"#,
    ),
    t(
        "collections/ansible_collections/{{ namespace }}/{{ collection_name }}/roles/run/tasks/main.yml",
        r#"---
- name: Debug print from {{ namespace }}.{{ collection_name }}
  ansible.builtin.debug:
    msg: "Hello from {{ inventory_hostname }}"
"#,
    ),
    t(
        "README.md",
        r#"# {{ namespace }}.{{ collection_name }} playbook project

Run `ansible-navigator run site.yml` to execute the project.
"#,
    ),
];

pub const EXECUTION_ENV_PROJECT: &[Template] = &[
    t(
        "execution-environment.yml",
        r#"---
version: 3

images:
  base_image:
    name: quay.io/fedora/fedora:latest

dependencies:
  ansible_core:
    package_pip: ansible-core
  ansible_runner:
    package_pip: ansible-runner
  galaxy:
    collections:
      - ansible.utils

options:
  tags:
    - {{ image_name }}
"#,
    ),
    t(
        ".github/workflows/ee-build.yml",
        r#"---
name: Build {{ image_name }}

on:
  push:
    branches: [main]
  workflow_dispatch:

jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - name: Build image
        run: ansible-builder build --tag {{ image_name }}
"#,
    ),
    t(
        "README.md",
        r#"# {{ image_name }}

Execution environment project. Build it with `ansible-builder build`.
"#,
    ),
];

pub const DEVFILE: &[Template] = &[t(
    "devfile.yaml",
    r#"schemaVersion: 2.2.2
metadata:
  name: ansible-project
components:
  - name: tooling-container
    container:
      image: {{ image }}
      memoryRequest: 256M
      memoryLimit: 6Gi
      mountSources: true
commands:
  - id: molecule-test
    exec:
      label: "Molecule: Run Scenario for Backup Role"
      commandLine: source $HOME/.bashrc && molecule test
      workingDir: ${PROJECTS_ROOT}/ansible-devspaces-demo/collections/example/collection
      component: tooling-container
"#,
)];

const DEVCONTAINER_DOCKER: &str = r#"{
  "name": "ansible-dev-container-docker",
  "image": "{{ image }}",
  "containerUser": "root",
  "runArgs": ["--privileged", "--device", "/dev/fuse"],
  "updateRemoteUserUID": true,
  "customizations": {
    "vscode": {
      "extensions": ["redhat.ansible"]
    }
  }
}
"#;

const DEVCONTAINER_PODMAN: &str = r#"{
  "name": "ansible-dev-container-podman",
  "image": "{{ image }}",
  "containerUser": "root",
  "runArgs": ["--cap-add=SYS_ADMIN", "--cap-add=SYS_RESOURCE", "--device", "/dev/fuse"],
  "updateRemoteUserUID": true,
  "customizations": {
    "vscode": {
      "extensions": ["redhat.ansible"]
    }
  }
}
"#;

pub const DEVCONTAINER: &[Template] = &[
    t(".devcontainer/devcontainer.json", DEVCONTAINER_PODMAN),
    t(".devcontainer/docker/devcontainer.json", DEVCONTAINER_DOCKER),
    t(".devcontainer/podman/devcontainer.json", DEVCONTAINER_PODMAN),
];

pub const EXECUTION_ENVIRONMENT: &[Template] = &[t(
    "execution-environment.yml",
    r#"---
version: 3

images:
  base_image:
    name: {{ base_image }}

dependencies:
  ansible_core:
    package_pip: ansible-core
  ansible_runner:
    package_pip: ansible-runner
"#,
)];

pub const PATTERN: &[Template] = &[
    t(
        "extensions/patterns/{{ pattern_name }}/meta/pattern.json",
        r#"{
  "schema_version": "1.0",
  "name": "{{ pattern_name }}",
  "title": "{{ pattern_name }}",
  "description": "Describe what the {{ pattern_name }} pattern automates.",
  "playbooks": ["site.yml"]
}
"#,
    ),
    t(
        "extensions/patterns/{{ pattern_name }}/playbooks/site.yml",
        r#"---
- name: Run the {{ pattern_name }} pattern
  hosts: localhost
  gather_facts: false
  tasks:
    - name: Placeholder
      ansible.builtin.debug:
        msg: "{{ pattern_name }} ran on {{ inventory_hostname }}"
"#,
    ),
    t(
        "extensions/patterns/{{ pattern_name }}/README.md",
        r#"# {{ pattern_name }}

Pattern scaffolded by ansible-creator.
"#,
    ),
];

pub const FILTER_PLUGIN: &[Template] = &[t(
    "plugins/filter/{{ plugin_name }}.py",
    r#""""A {{ plugin_name }} filter plugin."""

from __future__ import annotations


def _{{ plugin_name }}(value):
    return value


class FilterModule:
    """{{ plugin_name }} filter."""

    def filters(self):
        return {"{{ plugin_name }}": _{{ plugin_name }}}
"#,
)];

pub const LOOKUP_PLUGIN: &[Template] = &[t(
    "plugins/lookup/{{ plugin_name }}.py",
    r#""""A {{ plugin_name }} lookup plugin."""

from __future__ import annotations

from ansible.plugins.lookup import LookupBase


class LookupModule(LookupBase):
    """{{ plugin_name }} lookup."""

    def run(self, terms, variables=None, **kwargs):
        return list(terms)
"#,
)];

pub const MODULE_PLUGIN: &[Template] = &[t(
    "plugins/modules/{{ plugin_name }}.py",
    r#""""A {{ plugin_name }} module."""

from __future__ import annotations

from ansible.module_utils.basic import AnsibleModule


def main():
    module = AnsibleModule(argument_spec={"name": {"type": "str", "required": True}})
    module.exit_json(changed=False, name=module.params["name"])


if __name__ == "__main__":
    main()
"#,
)];
