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

//! Index writer.
//!
//! Maintains `sourcemap.json`, a JSON document mirroring the tree store for
//! consumption by external tooling. Incremental updates are attempted first;
//! anything the incremental logic can't reconcile falls back to a full
//! [`regenerate`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::tree::{ClassName, Tree};

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// A single entry in the sourcemap document.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entry {
    /// Logical instance name.
    pub name: String,
    /// Class name, as reported by the editor (or the fallback described in
    /// [`regenerate`]'s root handling).
    #[serde(rename = "className")]
    pub class_name: String,
    /// On-disk file paths backing this entry, relative to the process's
    /// current working directory, forward-slash separated.
    #[serde(rename = "filePaths", skip_serializing_if = "Option::is_none")]
    pub file_paths: Option<Vec<String>>,
    /// Child entries, omitted entirely for leaf nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Entry>>,
}

impl Entry {
    fn named(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self { name: name.into(), class_name: class_name.into(), file_paths: None, children: None }
    }

    fn child_named(&mut self, name: &str) -> Option<&mut Entry> {
        self.children.as_mut()?.iter_mut().find(|c| c.name == name)
    }

    fn ensure_child(&mut self, name: &str, class_name: &str) -> &mut Entry {
        let children = self.children.get_or_insert_with(Vec::new);
        if let Some(idx) = children.iter().position(|c| c.name == name) {
            return &mut children[idx];
        }
        children.push(Entry::named(name, class_name));
        children.last_mut().unwrap()
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Rebuilds the sourcemap document from scratch and writes it to
/// `output_path`.
///
/// The outer document is always the synthetic `{name: "Game", className:
/// "DataModel"}` wrapper described in §4.4 - it is never derived from a
/// tracked tree node, since the editor never reports that root as an
/// instance of its own (every root-level entry it sends is already a root
/// *service*, one per [`Tree::roots`]). A root service's own `className` is
/// the explicit class it was reported with, falling back to its `name` only
/// when the class itself is unknown.
///
/// # Errors
///
/// Returns an error only if writing fails; an empty tree yields a document
/// with an empty `children` array, not an error.
pub fn regenerate(tree: &Tree, file_paths: &impl Fn(&crate::id::NodeId) -> Option<Vec<String>>, output_path: &Path) -> Result {
    let mut root = Entry::named("Game", "DataModel");
    let mut children = Vec::new();

    for root_id in tree.roots() {
        let Some(root_node) = tree.get(root_id) else { continue };
        let class = if matches!(root_node.class_name, ClassName::Other(_)) {
            root_node.name.clone()
        } else {
            root_node.class_name.as_str().to_string()
        };

        let mut child = Entry::named(root_node.name.clone(), class);
        build_subtree(tree, root_id, &mut child, file_paths, &mut Vec::new());
        children.push(child);
    }

    root.children = Some(children);
    write_atomic(output_path, &root)
}

/// Recursively builds a document subtree, guarding against cycles by
/// tracking the ids already on the current descent path.
fn build_subtree(
    tree: &Tree, id: &crate::id::NodeId, entry: &mut Entry,
    file_paths: &impl Fn(&crate::id::NodeId) -> Option<Vec<String>>, ancestors: &mut Vec<crate::id::NodeId>,
) {
    if ancestors.contains(id) {
        return;
    }
    ancestors.push(id.clone());

    if let Some(node) = tree.get(id) {
        if node.class_name.is_script() {
            entry.file_paths = file_paths(id);
        }
        for child_id in &node.children {
            if let Some(child_node) = tree.get(child_id) {
                let mut child = Entry::named(child_node.name.clone(), child_node.class_name.as_str());
                build_subtree(tree, child_id, &mut child, file_paths, ancestors);
                entry.children.get_or_insert_with(Vec::new).push(child);
            }
        }
    }

    ancestors.pop();
}

/// Loads the current document from `output_path`, if it exists and parses.
fn load(output_path: &Path) -> Option<Entry> {
    let data = fs::read_to_string(output_path).ok()?;
    serde_json::from_str(&data).ok()
}

/// Incrementally updates a single node's entry in the document.
///
/// Falls back to [`regenerate`] on any inconsistency the incremental logic
/// can't reconcile (a missing document, a missing ancestor along the path).
pub fn upsert(
    tree: &Tree, id: &crate::id::NodeId, path: &[String], old_path: Option<&[String]>,
    file_paths: &impl Fn(&crate::id::NodeId) -> Option<Vec<String>>, output_path: &Path,
) -> Result {
    let Some(mut root) = load(output_path) else {
        return regenerate(tree, file_paths, output_path);
    };
    let Some(node) = tree.get(id) else {
        return regenerate(tree, file_paths, output_path);
    };

    if let Some(old) = old_path {
        if old != path {
            if remove_path(&mut root, old, None).is_none() {
                return regenerate(tree, file_paths, output_path);
            }
        }
    }

    let Some(entry) = materialize_path(&mut root, path) else {
        return regenerate(tree, file_paths, output_path);
    };
    entry.name = node.name.clone();
    entry.class_name = node.class_name.as_str().to_string();
    if node.class_name.is_script() {
        entry.file_paths = file_paths(id);
    }

    write_atomic(output_path, &root)
}

/// Walks (creating placeholder ancestors as needed) to the entry at `path`,
/// relative to `root`. `path` is the node's full logical path - a root
/// service's own path is just its name, with no segment for the synthetic
/// document root, which `root` already represents.
fn materialize_path<'a>(root: &'a mut Entry, path: &[String]) -> Option<&'a mut Entry> {
    if path.is_empty() {
        return None;
    }

    let mut current = root;
    for segment in path {
        current = current.ensure_child(segment, "Folder");
    }
    Some(current)
}

/// Prunes the subtree at `path` from the document, then removes any ancestor
/// entry left childless, stopping at (and never removing) the root.
///
/// `class_name`, when given, requires the target entry's class to match
/// before it is removed, guarding against a stale `path` pointing at an
/// entry of a different class after a rename raced the deletion.
pub fn prune(
    tree: &Tree, path: &[String], class_name: Option<&ClassName>,
    file_paths: &impl Fn(&crate::id::NodeId) -> Option<Vec<String>>, output_path: &Path,
) -> Result {
    let Some(mut root) = load(output_path) else {
        return regenerate(tree, file_paths, output_path);
    };

    if remove_path(&mut root, path, class_name).is_none() {
        return regenerate(tree, file_paths, output_path);
    }

    write_atomic(output_path, &root)
}

/// Removes the entry at `path` (relative to `root`), then unwinds upward
/// dropping any ancestor left with zero children. Returns `None` if the
/// path couldn't be resolved or the class didn't match.
fn remove_path(root: &mut Entry, path: &[String], class_name: Option<&ClassName>) -> Option<()> {
    if path.is_empty() {
        return None;
    }
    remove_path_rec(root, path, class_name)
}

/// Removes `remaining.last()` from the subtree reached by walking
/// `remaining[..len-1]` down from `entry`, pruning empty intermediate
/// ancestors on the way back up. `entry` itself is never removed, even if it
/// ends up childless - that's the caller's responsibility at the root.
fn remove_path_rec(entry: &mut Entry, remaining: &[String], class_name: Option<&ClassName>) -> Option<()> {
    let children = entry.children.as_mut()?;

    if remaining.len() == 1 {
        let idx = children.iter().position(|c| {
            c.name == remaining[0]
                && class_name.is_none_or(|expected| c.class_name == expected.as_str())
        })?;
        children.remove(idx);
        return Some(());
    }

    let idx = children.iter().position(|c| c.name == remaining[0])?;
    remove_path_rec(&mut children[idx], &remaining[1..], class_name)?;
    if children[idx].children.as_ref().is_none_or(Vec::is_empty) {
        children.remove(idx);
    }
    Some(())
}

/// Serializes `entry` to `output_path` atomically: write to a temp file in
/// the same directory, then rename over the target.
fn write_atomic(output_path: &Path, entry: &Entry) -> Result {
    let mut json = serde_json::to_string_pretty(entry)?;
    json.push('\n');

    let dir = output_path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let tmp = dir.join(format!(
        ".{}.tmp",
        output_path.file_name().and_then(|n| n.to_str()).unwrap_or("sourcemap")
    ));
    fs::write(&tmp, json)?;
    fs::rename(&tmp, output_path)?;

    Ok(())
}

/// Converts a native path to a forward-slash-separated relative path string
/// suitable for a `filePaths` entry.
#[must_use]
pub fn relative_forward_slash(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/")
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::tree::{KnownClass, SnapshotEntry};
    use tempfile::tempdir;

    fn entry(id: &str, class: ClassName, name: &str, parent: Option<&str>) -> SnapshotEntry {
        SnapshotEntry { id: NodeId::from(id), class_name: class, name: name.to_string(), parent: parent.map(NodeId::from), source: None }
    }

    #[test]
    fn regenerate_writes_root_and_children() {
        let mut tree = Tree::new();
        tree.apply_full_snapshot(vec![
            entry("1", ClassName::Known(KnownClass::Folder), "ServerScriptService", None),
            entry("2", ClassName::Script, "Main", Some("1")),
        ]);

        let dir = tempdir().unwrap();
        let out = dir.path().join("sourcemap.json");
        regenerate(&tree, &|_| Some(vec!["ServerScriptService/Main.server.luau".to_string()]), &out).unwrap();

        let doc: Entry = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(doc.name, "Game");
        assert_eq!(doc.class_name, "DataModel");
        let folder = &doc.children.unwrap()[0];
        assert_eq!(folder.name, "ServerScriptService");
        let script = &folder.children.as_ref().unwrap()[0];
        assert_eq!(script.file_paths.as_ref().unwrap()[0], "ServerScriptService/Main.server.luau");
    }

    #[test]
    fn regenerate_on_empty_tree_writes_empty_children() {
        let tree = Tree::new();
        let dir = tempdir().unwrap();
        let out = dir.path().join("sourcemap.json");
        regenerate(&tree, &|_| None, &out).unwrap();

        let doc: Entry = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(doc.name, "Game");
        assert_eq!(doc.class_name, "DataModel");
        assert!(doc.children.unwrap().is_empty());
    }

    #[test]
    fn regenerate_keeps_every_root_service_as_a_sibling() {
        let mut tree = Tree::new();
        tree.apply_full_snapshot(vec![
            entry("1", ClassName::Known(KnownClass::Folder), "ReplicatedStorage", None),
            entry("2", ClassName::Known(KnownClass::Folder), "ServerScriptService", None),
        ]);

        let dir = tempdir().unwrap();
        let out = dir.path().join("sourcemap.json");
        regenerate(&tree, &|_| None, &out).unwrap();

        let doc: Entry = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let names: Vec<&str> = doc.children.as_ref().unwrap().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ReplicatedStorage", "ServerScriptService"]);
    }

    #[test]
    fn prune_removes_childless_ancestors() {
        let mut tree = Tree::new();
        tree.apply_full_snapshot(vec![
            entry("1", ClassName::Known(KnownClass::Folder), "A", None),
            entry("2", ClassName::Script, "Main", Some("1")),
        ]);

        let dir = tempdir().unwrap();
        let out = dir.path().join("sourcemap.json");
        regenerate(&tree, &|_| Some(vec!["A/Main.server.luau".to_string()]), &out).unwrap();

        prune(&tree, &["A".to_string(), "Main".to_string()], None, &|_| None, &out).unwrap();

        let doc: Entry = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert!(doc.children.unwrap().is_empty());
    }

    #[test]
    fn upsert_moves_entry_between_paths() {
        let mut tree = Tree::new();
        tree.apply_full_snapshot(vec![
            entry("1", ClassName::Known(KnownClass::Folder), "A", None),
            entry("2", ClassName::Known(KnownClass::Folder), "B", None),
            entry("3", ClassName::Script, "Main", Some("1")),
        ]);

        let dir = tempdir().unwrap();
        let out = dir.path().join("sourcemap.json");
        regenerate(&tree, &|_| Some(vec!["A/Main.server.luau".to_string()]), &out).unwrap();

        upsert(
            &tree,
            &NodeId::from("3"),
            &["B".to_string(), "Main".to_string()],
            Some(&["A".to_string(), "Main".to_string()]),
            &|_| Some(vec!["B/Main.server.luau".to_string()]),
            &out,
        )
        .unwrap();

        let doc: Entry = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        let names: Vec<&str> = doc.children.as_ref().unwrap().iter().map(|c| c.name.as_str()).collect();
        assert!(!names.contains(&"A"));
        assert!(names.contains(&"B"));
    }
}
