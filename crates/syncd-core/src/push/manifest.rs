// Copyright (c) Syncd contributors

// SPDX-License-Identifier: MIT
// Third-party contributions licensed under CLA

// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:

// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NON-INFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

// ----------------------------------------------------------------------------

//! Manifest mode: walks a project manifest compatible with Rojo's
//! `*.project.json` tree format.
//!
//! A manifest node's `$`-prefixed keys are metadata; every other key is a
//! child node name. A `$path` merges a filesystem subtree in at that node,
//! with manifest-declared children taking precedence over same-named entries
//! found on disk. A directory pointed at by `$path` that itself holds a
//! `*.project.json` is a nested, independent project and is not walked
//! directly.

use ahash::HashMap;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::id::NodeId;
use crate::identity::classify_file;
use crate::protocol::RawInstance;

use super::{plain, Pending};

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Glob patterns a `$path` merge always skips, regardless of a node's own
/// `$ignore` list.
const DEFAULT_IGNORES: &[&str] = &["**/.git", "**/sourcemap.json", "**/*.lock", "**/~$*"];

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Top-level manifest document.
#[derive(Deserialize)]
struct ManifestFile {
    #[serde(default)]
    name: Option<String>,
    tree: ManifestNode,
}

/// A single manifest tree node.
#[derive(Clone, Default, Deserialize)]
struct ManifestNode {
    #[serde(rename = "$className")]
    class_name: Option<String>,
    #[serde(rename = "$path")]
    path: Option<String>,
    #[serde(rename = "$ignore", default)]
    ignore: Vec<String>,
    #[serde(flatten)]
    children: BTreeMap<String, ManifestNode>,
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Loads and walks the manifest at `manifest_path`.
///
/// # Errors
///
/// Returns [`Error::Manifest`] if the file can't be read or doesn't parse,
/// or an I/O error if a `$path` merge can't read the filesystem.
pub fn walk(manifest_path: &Path, default_extension: &str) -> Result<(Vec<RawInstance>, HashMap<NodeId, PathBuf>)> {
    let data = fs::read_to_string(manifest_path).map_err(|err| Error::Manifest(format!("{}: {err}", manifest_path.display())))?;
    let manifest: ManifestFile =
        serde_json::from_str(&data).map_err(|err| Error::Manifest(format!("{}: {err}", manifest_path.display())))?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let root_name = manifest.name.unwrap_or_else(|| String::from("Project"));
    let mut pending = Vec::new();
    collect(&root_name, &manifest.tree, None, 0, &root_name.clone(), base_dir, default_extension, &mut pending)?;
    Ok(super::finish(pending))
}

/// Recursively builds pending entries for `node`, merging a `$path` subtree
/// when present.
#[allow(clippy::too_many_arguments)]
fn collect(
    name: &str, node: &ManifestNode, parent: Option<NodeId>, depth: usize, key: &str, base_dir: &Path, default_extension: &str,
    out: &mut Vec<Pending>,
) -> Result {
    let id = NodeId::generate();
    let mut class_name = node.class_name.clone();
    let mut source = None;
    let mut disk_path = None;

    if let Some(rel_path) = &node.path {
        let abs = base_dir.join(rel_path);

        if is_nested_project(&abs) {
            // An independent project lives here; record only the anchor.
        } else if abs.is_dir() {
            if class_name.is_none() {
                if let Some(init) = plain::find_init_file(&abs, default_extension)? {
                    let (c, s) = plain::read_script(&init)?;
                    class_name = Some(c);
                    source = Some(s);
                    disk_path = Some(init);
                }
            }
            if disk_path.is_none() {
                disk_path = Some(abs.clone());
            }

            out.push(Pending {
                depth,
                key: key.to_string(),
                instance: RawInstance { id: id.clone(), class_name: class_name.clone().unwrap_or_else(|| String::from("Folder")), name: name.to_string(), parent, source: source.clone() },
                path: disk_path,
            });

            let children = &node.children;
            let skip = move |candidate: &str| children.contains_key(candidate);
            let ignore_set = build_ignore_set(&node.ignore)?;
            let ignore = move |path: &Path| ignore_set.is_match(path);
            plain::collect_children(&abs, &id, default_extension, depth + 1, key, &skip, &ignore, out)?;

            for (child_name, child_node) in &node.children {
                let child_key = format!("{key}/{child_name}");
                collect(child_name, child_node, Some(id.clone()), depth + 1, &child_key, base_dir, default_extension, out)?;
            }
            return Ok(());
        } else if abs.is_file() {
            if class_name.is_none() {
                let file_name = abs.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                if let Some((c, _)) = classify_file(file_name) {
                    class_name = Some(c.as_str().to_string());
                }
            }
            source = Some(fs::read_to_string(&abs).map_err(|err| Error::Manifest(format!("{}: {err}", abs.display())))?);
            disk_path = Some(abs);
        }
    }

    out.push(Pending {
        depth,
        key: key.to_string(),
        instance: RawInstance { id: id.clone(), class_name: class_name.unwrap_or_else(|| String::from("Folder")), name: name.to_string(), parent, source },
        path: disk_path,
    });

    for (child_name, child_node) in &node.children {
        let child_key = format!("{key}/{child_name}");
        collect(child_name, child_node, Some(id.clone()), depth + 1, &child_key, base_dir, default_extension, out)?;
    }

    Ok(())
}

/// Builds the glob set a `$path` merge filters absolute candidate paths
/// through: the built-in [`DEFAULT_IGNORES`] plus the node's own `$ignore`
/// patterns.
fn build_ignore_set(extra: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in DEFAULT_IGNORES.iter().copied().chain(extra.iter().map(String::as_str)) {
        let glob = Glob::new(pattern).map_err(|err| Error::Manifest(format!("invalid $ignore pattern {pattern:?}: {err}")))?;
        builder.add(glob);
    }
    builder.build().map_err(|err| Error::Manifest(format!("invalid $ignore pattern set: {err}")))
}

/// Returns whether `dir` itself holds a `*.project.json` manifest, making it
/// an independent nested project rather than plain filesystem content to
/// merge in directly.
fn is_nested_project(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else { return false };
    entries.filter_map(std::result::Result::ok).any(|entry| entry.file_name().to_str().is_some_and(|name| name.ends_with(".project.json")))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn walk_merges_path_and_honors_explicit_children() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("Main.luau"), "1").unwrap();
        fs::write(src.join("Overridden.luau"), "disk").unwrap();

        let manifest = dir.path().join("default.project.json");
        fs::write(
            &manifest,
            r#"{
                "name": "Game",
                "tree": {
                    "$className": "DataModel",
                    "ServerScriptService": {
                        "$path": "src",
                        "Overridden": { "$className": "ModuleScript" }
                    }
                }
            }"#,
        )
        .unwrap();

        let (instances, _) = walk(&manifest, "luau").unwrap();

        let main = instances.iter().find(|i| i.name == "Main").unwrap();
        assert_eq!(main.source.as_deref(), Some("1"));

        let overridden = instances.iter().find(|i| i.name == "Overridden").unwrap();
        assert_eq!(overridden.class_name, "ModuleScript");
        assert!(overridden.source.is_none());
    }

    #[test]
    fn is_nested_project_detects_project_json() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("default.project.json"), "{}").unwrap();
        assert!(is_nested_project(dir.path()));
    }

    #[test]
    fn walk_applies_default_and_explicit_ignores() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join(".git")).unwrap();
        fs::write(src.join(".git").join("Phantom.luau"), "should never surface").unwrap();
        fs::write(src.join("Keep.luau"), "1").unwrap();
        fs::write(src.join("Scratch.luau"), "2").unwrap();

        let manifest = dir.path().join("default.project.json");
        fs::write(
            &manifest,
            r#"{
                "name": "Game",
                "tree": {
                    "$className": "DataModel",
                    "ServerScriptService": {
                        "$path": "src",
                        "$ignore": ["**/Scratch.luau"]
                    }
                }
            }"#,
        )
        .unwrap();

        let (instances, _) = walk(&manifest, "luau").unwrap();

        assert!(instances.iter().any(|i| i.name == "Keep"));
        assert!(!instances.iter().any(|i| i.name == "Scratch"));
        assert!(!instances.iter().any(|i| i.name == ".git"));
        assert!(!instances.iter().any(|i| i.name == "Phantom"));
    }
}
