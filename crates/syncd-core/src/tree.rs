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

//! Tree store.
//!
//! The canonical in-memory forest mirroring the editor's DataModel. Nodes
//! never hold an owning reference to their parent - the relationship is
//! tracked only through the `parent` field plus the reverse `children`
//! adjacency on the store, which avoids reference cycles entirely.

use ahash::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::id::NodeId;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Instance class name.
///
/// A closed set of classes this daemon treats specially, plus an open
/// fallback so that any class name the editor reports round-trips losslessly
/// even if we don't attach special behavior to it.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassName {
    /// Known, well-behaved class.
    Known(KnownClass),
    /// Anything else, preserved verbatim.
    Other(String),
}

/// Well-known instance classes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum KnownClass {
    /// Server-side script.
    Script,
    /// Client-side script.
    LocalScript,
    /// Non-executing module.
    ModuleScript,
    /// Plain grouping node.
    Folder,
    /// The root of the tree.
    DataModel,
}

#[allow(non_upper_case_globals)]
impl ClassName {
    /// Server-side script.
    pub const Script: ClassName = ClassName::Known(KnownClass::Script);
    /// Client-side script.
    pub const LocalScript: ClassName = ClassName::Known(KnownClass::LocalScript);
    /// Non-executing module.
    pub const ModuleScript: ClassName = ClassName::Known(KnownClass::ModuleScript);
    /// Plain grouping node.
    pub const Folder: ClassName = ClassName::Known(KnownClass::Folder);
    /// The root of the tree.
    pub const DataModel: ClassName = ClassName::Known(KnownClass::DataModel);
}

impl ClassName {
    /// Parses a class name reported by the editor.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "Script" => ClassName::Script,
            "LocalScript" => ClassName::LocalScript,
            "ModuleScript" => ClassName::ModuleScript,
            "Folder" => ClassName::Folder,
            "DataModel" => ClassName::DataModel,
            other => ClassName::Other(other.to_string()),
        }
    }

    /// Returns whether this class holds a script body.
    #[must_use]
    pub fn is_script(&self) -> bool {
        matches!(
            self,
            ClassName::Script | ClassName::LocalScript | ClassName::ModuleScript
        )
    }

    /// Returns the class name as it should appear in the sourcemap and in
    /// outbound messages.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            ClassName::Known(KnownClass::Script) => "Script",
            ClassName::Known(KnownClass::LocalScript) => "LocalScript",
            ClassName::Known(KnownClass::ModuleScript) => "ModuleScript",
            ClassName::Known(KnownClass::Folder) => "Folder",
            ClassName::Known(KnownClass::DataModel) => "DataModel",
            ClassName::Other(name) => name,
        }
    }
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// A snapshot entry reported by the editor, either as part of a full
/// snapshot or a single `instanceUpdated` message.
#[derive(Clone, Debug)]
pub struct SnapshotEntry {
    /// Stable identifier.
    pub id: NodeId,
    /// Class name.
    pub class_name: ClassName,
    /// Logical (un-sanitized) name.
    pub name: String,
    /// Parent id, `None` for the root.
    pub parent: Option<NodeId>,
    /// Source body, for script-bearing classes only.
    pub source: Option<String>,
}

/// A single tree node.
#[derive(Clone, Debug)]
pub struct Node {
    /// Stable identifier.
    pub id: NodeId,
    /// Class name.
    pub class_name: ClassName,
    /// Logical (un-sanitized) name.
    pub name: String,
    /// Parent id, `None` for the root.
    pub parent: Option<NodeId>,
    /// Ordered child ids. Siblings may share a name.
    pub children: Vec<NodeId>,
    /// Source body, populated only for script-bearing classes.
    pub source: Option<String>,
}

/// The outcome of [`Tree::update_instance`].
#[derive(Clone, Debug)]
pub struct UpdateOutcome {
    /// The id of the updated (or newly inserted) node.
    pub node: NodeId,
    /// Whether the node did not previously exist.
    pub is_new: bool,
    /// The node's logical path prior to this update, if it existed.
    pub prev_path: Option<Vec<String>>,
    /// Whether the logical path changed (reparent and/or rename).
    pub path_changed: bool,
    /// Whether only the name changed (path's parent prefix is unchanged).
    pub name_changed: bool,
}

/// The in-memory forest.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    /// Secondary index: logical path -> id, kept incrementally consistent so
    /// that `find_by_path` never degrades to a tree walk.
    by_path: HashMap<Vec<String>, NodeId>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Tree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node with the given id, if any.
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Returns the number of nodes currently in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns whether the tree is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the root ids of the tree.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Computes the logical path (root to self) of the given node.
    #[must_use]
    pub fn path_of(&self, id: &NodeId) -> Option<Vec<String>> {
        let mut segments = Vec::new();
        let mut cursor = Some(id.clone());
        while let Some(current) = cursor {
            let node = self.nodes.get(&current)?;
            segments.push(node.name.clone());
            cursor = node.parent.clone();
        }
        segments.reverse();
        Some(segments)
    }

    /// Looks up a node by its logical path from the root.
    ///
    /// Backed by the secondary path index - `O(1)` on average, never a tree
    /// walk.
    #[must_use]
    pub fn find_by_path(&self, path: &[String]) -> Option<NodeId> {
        self.by_path.get(path).cloned()
    }

    /// Replaces the entire tree with a full snapshot.
    ///
    /// Builds the id map, parent/child adjacency, and path index in a single
    /// pass over the given entries, `O(N)` in the number of entries (the path
    /// index additionally costs `O(depth)` per node, so `O(N log N)` in the
    /// worst case of a deeply nested tree - never quadratic).
    pub fn apply_full_snapshot(&mut self, entries: Vec<SnapshotEntry>) {
        self.nodes.clear();
        self.roots.clear();
        self.by_path.clear();

        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for entry in &entries {
            children.entry(entry.id.clone()).or_default();
            if let Some(parent) = &entry.parent {
                children.entry(parent.clone()).or_default().push(entry.id.clone());
            }
        }

        for entry in entries {
            if entry.parent.is_none() {
                self.roots.push(entry.id.clone());
            }
            let node = Node {
                id: entry.id.clone(),
                class_name: entry.class_name,
                name: entry.name,
                parent: entry.parent,
                children: children.remove(&entry.id).unwrap_or_default(),
                source: entry.source,
            };
            self.nodes.insert(entry.id, node);
        }

        self.rebuild_path_index();
    }

    /// Rebuilds the secondary path index from scratch.
    fn rebuild_path_index(&mut self) {
        self.by_path.clear();
        let ids: Vec<NodeId> = self.nodes.keys().cloned().collect();
        for id in ids {
            if let Some(path) = self.path_of(&id) {
                self.by_path.insert(path, id);
            }
        }
    }

    /// Inserts or updates a single instance, handling reparenting and
    /// renaming.
    pub fn update_instance(&mut self, entry: SnapshotEntry) -> UpdateOutcome {
        let prev_path = self.path_of(&entry.id);
        let is_new = !self.nodes.contains_key(&entry.id);
        let prev_parent = self.nodes.get(&entry.id).and_then(|n| n.parent.clone());
        let prev_name = self.nodes.get(&entry.id).map(|n| n.name.clone());

        // Detach from old parent, if reparenting
        if let Some(old_parent) = &prev_parent {
            if prev_parent != entry.parent {
                if let Some(parent_node) = self.nodes.get_mut(old_parent) {
                    parent_node.children.retain(|c| c != &entry.id);
                }
            }
        } else if !is_new && entry.parent.is_some() {
            self.roots.retain(|r| r != &entry.id);
        }

        // Attach to new parent
        if let Some(new_parent) = &entry.parent {
            if prev_parent.as_ref() != Some(new_parent) {
                if let Some(parent_node) = self.nodes.get_mut(new_parent) {
                    parent_node.children.push(entry.id.clone());
                }
            }
        } else if prev_parent.is_some() || is_new {
            self.roots.push(entry.id.clone());
        }

        let children = self
            .nodes
            .get(&entry.id)
            .map(|n| n.children.clone())
            .unwrap_or_default();

        self.nodes.insert(
            entry.id.clone(),
            Node {
                id: entry.id.clone(),
                class_name: entry.class_name,
                name: entry.name.clone(),
                parent: entry.parent.clone(),
                children,
                source: entry.source,
            },
        );

        let new_path = self.path_of(&entry.id);
        if let Some(old) = &prev_path {
            self.by_path.remove(old);
        }
        if let Some(new) = &new_path {
            self.by_path.insert(new.clone(), entry.id.clone());
        }

        // Any descendant's cached path entries are stale once an ancestor
        // moves, so sweep and recompute them. This keeps the index correct
        // without requiring callers to enumerate descendants themselves.
        if prev_path != new_path {
            self.resync_descendant_paths(&entry.id);
        }

        let path_changed = prev_path != new_path;
        let name_changed = prev_name.as_deref() != Some(entry.name.as_str());

        UpdateOutcome {
            node: entry.id,
            is_new,
            prev_path,
            path_changed,
            name_changed,
        }
    }

    /// Recomputes path-index entries for every descendant of `id`.
    fn resync_descendant_paths(&mut self, id: &NodeId) {
        let descendants = self.descendant_ids(id);
        for descendant in descendants {
            if let Some(path) = self.path_of(&descendant) {
                self.by_path.retain(|_, v| v != &descendant);
                self.by_path.insert(path, descendant);
            }
        }
    }

    /// Returns all descendant ids of `id`, not including `id` itself.
    fn descendant_ids(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(id)
            .map(|n| n.children.clone())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(&next) {
                stack.extend(node.children.iter().cloned());
            }
            out.push(next);
        }
        out
    }

    /// Updates a script node's source body in place.
    ///
    /// Returns `None` if the id is unknown, in which case the caller should
    /// log and ignore the write rather than inventing a node.
    pub fn update_script_source(&mut self, id: &NodeId, source: String) -> Option<()> {
        let node = self.nodes.get_mut(id)?;
        node.source = Some(source);
        Some(())
    }

    /// Removes a node and all of its descendants, returning every removed id
    /// (the node itself first, then descendants in pre-order).
    pub fn delete_instance(&mut self, id: &NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };

        let mut removed = vec![id.clone()];
        removed.extend(self.descendant_ids(id));

        if let Some(parent) = node.parent.clone() {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|c| c != id);
            }
        } else {
            self.roots.retain(|r| r != id);
        }

        for removed_id in &removed {
            if let Some(path) = self.path_of(removed_id) {
                self.by_path.remove(&path);
            }
            self.nodes.remove(removed_id);
        }

        removed
    }

    /// Returns all script-bearing descendants of `id`, inclusive of `id`
    /// itself if applicable, in pre-order.
    #[must_use]
    pub fn get_descendant_scripts(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&current) {
                if node.class_name.is_script() {
                    out.push(current.clone());
                }
                // Push children in reverse so pre-order traversal visits
                // them in original sibling order.
                for child in node.children.iter().rev() {
                    stack.push(child.clone());
                }
            }
        }
        out
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, class: ClassName, name: &str, parent: Option<&str>) -> SnapshotEntry {
        SnapshotEntry {
            id: NodeId::from(id),
            class_name: class,
            name: name.to_string(),
            parent: parent.map(NodeId::from),
            source: None,
        }
    }

    #[test]
    fn full_snapshot_builds_path_index() {
        let mut tree = Tree::new();
        tree.apply_full_snapshot(vec![
            entry(
                "11111111111111111111111111111111",
                ClassName::Known(KnownClass::Folder),
                "ServerScriptService",
                None,
            ),
            entry(
                "22222222222222222222222222222222",
                ClassName::Script,
                "Main",
                Some("11111111111111111111111111111111"),
            ),
        ]);

        let found = tree
            .find_by_path(&["ServerScriptService".to_string(), "Main".to_string()])
            .unwrap();
        assert_eq!(found.as_str(), "22222222222222222222222222222222");
    }

    #[test]
    fn update_instance_reparents_and_updates_path_index() {
        let mut tree = Tree::new();
        tree.apply_full_snapshot(vec![
            entry("11111111111111111111111111111111", ClassName::Known(KnownClass::Folder), "A", None),
            entry("22222222222222222222222222222222", ClassName::Known(KnownClass::Folder), "B", None),
            entry(
                "33333333333333333333333333333333",
                ClassName::Script,
                "Main",
                Some("11111111111111111111111111111111"),
            ),
        ]);

        let outcome = tree.update_instance(entry(
            "33333333333333333333333333333333",
            ClassName::Script,
            "Main",
            Some("22222222222222222222222222222222"),
        ));

        assert!(outcome.path_changed);
        assert!(!outcome.name_changed);
        assert_eq!(outcome.prev_path, Some(vec!["A".to_string(), "Main".to_string()]));

        let new_id = tree.find_by_path(&["B".to_string(), "Main".to_string()]).unwrap();
        assert_eq!(new_id.as_str(), "33333333333333333333333333333333");
        assert!(tree.find_by_path(&["A".to_string(), "Main".to_string()]).is_none());
    }

    #[test]
    fn update_instance_no_op_reannouncement_of_a_root_stays_a_root() {
        let mut tree = Tree::new();
        tree.apply_full_snapshot(vec![entry("11111111111111111111111111111111", ClassName::Known(KnownClass::Folder), "A", None)]);

        tree.update_instance(entry("11111111111111111111111111111111", ClassName::Known(KnownClass::Folder), "A", None));

        assert_eq!(tree.roots(), &[NodeId::from("11111111111111111111111111111111")]);
        assert!(tree.find_by_path(&["A".to_string()]).is_some());
    }

    #[test]
    fn delete_instance_removes_descendants_and_path_entries() {
        let mut tree = Tree::new();
        tree.apply_full_snapshot(vec![
            entry("11111111111111111111111111111111", ClassName::Known(KnownClass::Folder), "A", None),
            entry(
                "22222222222222222222222222222222",
                ClassName::Script,
                "Main",
                Some("11111111111111111111111111111111"),
            ),
        ]);

        let removed = tree.delete_instance(&NodeId::from("11111111111111111111111111111111"));
        assert_eq!(removed.len(), 2);
        assert!(tree.get(&NodeId::from("22222222222222222222222222222222")).is_none());
        assert!(tree.find_by_path(&["A".to_string()]).is_none());
    }

    #[test]
    fn get_descendant_scripts_is_preorder_and_excludes_folders() {
        let mut tree = Tree::new();
        tree.apply_full_snapshot(vec![
            entry("11111111111111111111111111111111", ClassName::Known(KnownClass::Folder), "A", None),
            entry(
                "22222222222222222222222222222222",
                ClassName::Script,
                "One",
                Some("11111111111111111111111111111111"),
            ),
            entry(
                "33333333333333333333333333333333",
                ClassName::ModuleScript,
                "Two",
                Some("11111111111111111111111111111111"),
            ),
        ]);

        let scripts = tree.get_descendant_scripts(&NodeId::from("11111111111111111111111111111111"));
        assert_eq!(
            scripts,
            vec![
                NodeId::from("22222222222222222222222222222222"),
                NodeId::from("33333333333333333333333333333333"),
            ]
        );
    }
}
