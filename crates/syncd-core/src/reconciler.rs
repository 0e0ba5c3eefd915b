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

//! The daemon's single-threaded orchestrator.
//!
//! Dispatches both inbound editor messages and local filesystem events.
//! Exactly one of those runs at a time - nothing here is processed
//! concurrently with itself, which is what lets the tree-then-disk ordering
//! and echo suppression elsewhere in this crate actually hold.

use crossbeam::channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::id::NodeId;
use crate::identity::{encode_named_file, sanitize_path_segment};
use crate::index;
use crate::projector::Projector;
use crate::protocol::{Inbound, Outbound, RawInstance};
use crate::transport::Transport;
use crate::tree::{ClassName, SnapshotEntry, Tree};
use crate::watch::Watcher;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// The daemon's orchestrator, owning the tree, the filesystem projector, the
/// transport endpoint, and the filesystem watcher.
pub struct Reconciler {
    tree: Tree,
    projector: Projector,
    transport: Transport,
    watcher: Option<Watcher>,
    local_tx: Sender<(PathBuf, String)>,
    local_rx: Receiver<(PathBuf, String)>,
    config: Config,
    running: Arc<AtomicBool>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Reconciler {
    /// Creates the reconciler and binds its transport endpoint.
    ///
    /// The filesystem watcher is not started until the first `fullSnapshot`
    /// arrives, since until then there is nothing projected to watch.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync directory can't be created or the
    /// transport endpoint's address can't be bound.
    pub fn start(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.sync_dir)?;
        let transport = Transport::spawn(("0.0.0.0", config.port), config.stale_client_timeout())?;
        let projector = Projector::new(config.sync_dir.clone(), config.script_extension.clone());
        let (local_tx, local_rx) = unbounded();

        Ok(Self { tree: Tree::new(), projector, transport, watcher: None, local_tx, local_rx, config, running: Arc::new(AtomicBool::new(true)) })
    }

    /// Returns a handle that, when cleared, stops [`Self::run`] after its
    /// current iteration.
    ///
    /// Intended for a caller to wire up to a process signal; this crate does
    /// not install one itself.
    #[must_use]
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Runs the dispatch loop until [`Self::shutdown_handle`] is cleared.
    ///
    /// Drains whichever of the transport's inbound queue or the filesystem
    /// watcher's change queue has something waiting, preferring the
    /// transport so an editor-originated message is never starved by a burst
    /// of local edits. Idles briefly when both are empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a dispatched message causes an unrecoverable I/O
    /// failure (the sourcemap can't be written, a script file can't be
    /// written or removed).
    pub fn run(&mut self) -> Result {
        while self.running.load(Ordering::Relaxed) {
            if let Some(message) = self.transport.try_recv() {
                if let Err(err) = self.dispatch_inbound(&message) {
                    tracing::warn!(%err, "failed to dispatch inbound message");
                }
                continue;
            }

            if let Ok((path, body)) = self.local_rx.try_recv() {
                if let Err(err) = self.dispatch_local_change(path, body) {
                    tracing::warn!(%err, "failed to dispatch local change");
                }
                continue;
            }

            thread::sleep(Duration::from_millis(20));
        }
        Ok(())
    }

    /// Dispatches a single inbound editor message.
    fn dispatch_inbound(&mut self, message: &str) -> Result {
        match serde_json::from_str(message)? {
            Inbound::FullSnapshot { data } => self.handle_full_snapshot(data),
            Inbound::InstanceUpdated { data } => self.handle_instance_updated(data),
            Inbound::ScriptChanged { id, path, class_name, source } => {
                self.handle_script_changed(id, path, class_name, source)
            }
            Inbound::Deleted { id } => self.handle_deleted(id),
            Inbound::Ping => self.send(Outbound::Pong),
            Inbound::ClientDisconnect => {
                self.transport.disconnect();
                Ok(())
            }
            Inbound::PushConfig { .. } => {
                tracing::debug!("ignoring pushConfig received outside a push session");
                Ok(())
            }
        }
    }

    /// Replaces the tree wholesale, projects every script, runs the opt-in
    /// orphan sweep, (re)starts the filesystem watcher, and regenerates the
    /// index from scratch.
    fn handle_full_snapshot(&mut self, data: Vec<RawInstance>) -> Result {
        let entries: Vec<SnapshotEntry> =
            data.into_iter().filter(|raw| !self.is_excluded(&raw.class_name)).map(Into::into).collect();
        self.tree.apply_full_snapshot(entries);

        let mut live = ahash::HashSet::default();
        for root in self.tree.roots().to_vec() {
            for script_id in self.tree.get_descendant_scripts(&root) {
                self.project_script(&script_id)?;
                live.insert(script_id);
            }
        }

        if self.config.delete_orphans_on_connect {
            self.projector.prune_orphans(&live)?;
        }

        self.restart_watcher();

        index::regenerate(&self.tree, &|id| self.file_paths(id), &self.config.sourcemap_abs_path())
    }

    /// Updates a single script's source, writes the file, and upserts the
    /// index incrementally.
    ///
    /// If `id` names a node the tree doesn't yet know about, it's upserted
    /// from `path`/`class_name` first (per §4.7's "if node unknown, upsert
    /// it from the message"), the same way `instanceUpdated` would insert
    /// it, rather than being silently dropped.
    fn handle_script_changed(
        &mut self, id: NodeId, path: Vec<String>, class_name: String, source: String,
    ) -> Result {
        if self.tree.get(&id).is_none() {
            let parent = match path.len() {
                0 => None,
                1 => None,
                _ => match self.tree.find_by_path(&path[..path.len() - 1]) {
                    Some(parent) => Some(parent),
                    None => {
                        tracing::warn!(%id, ?path, "scriptChanged for unknown node with missing parent, dropping");
                        return Ok(());
                    }
                },
            };
            let name = path.last().cloned().unwrap_or_default();
            self.tree.update_instance(SnapshotEntry {
                id: id.clone(),
                class_name: ClassName::parse(&class_name),
                name,
                parent,
                source: Some(source.clone()),
            });
        } else {
            self.tree.update_script_source(&id, source.clone());
        }

        self.project_script(&id)?;

        let path = self.tree.path_of(&id).unwrap_or_default();
        index::upsert(&self.tree, &id, &path, None, &|nid| self.file_paths(nid), &self.config.sourcemap_abs_path())
    }

    /// Upserts an instance into the tree. If the update moved or renamed the
    /// node, rewrites it and every script-bearing descendant at their new
    /// paths, then upserts the index using the previous path so the stale
    /// entry is pruned.
    fn handle_instance_updated(&mut self, data: RawInstance) -> Result {
        if self.is_excluded(&data.class_name) {
            return Ok(());
        }

        let entry: SnapshotEntry = data.into();
        let id = entry.id.clone();
        let outcome = self.tree.update_instance(entry);

        if outcome.path_changed || outcome.is_new {
            for script_id in self.tree.get_descendant_scripts(&id) {
                self.project_script(&script_id)?;
            }
        }

        let new_path = self.tree.path_of(&id).unwrap_or_default();
        index::upsert(
            &self.tree,
            &id,
            &new_path,
            outcome.prev_path.as_deref(),
            &|nid| self.file_paths(nid),
            &self.config.sourcemap_abs_path(),
        )
    }

    /// Snapshots the node's descendant scripts before removing it from the
    /// tree, deletes their files, then prunes the index.
    fn handle_deleted(&mut self, id: NodeId) -> Result {
        let scripts = self.tree.get_descendant_scripts(&id);
        let class_name = self.tree.get(&id).map(|node| node.class_name.clone());
        let path = self.tree.path_of(&id);

        self.tree.delete_instance(&id);

        for script_id in &scripts {
            self.projector.delete_path(script_id)?;
        }

        if let Some(path) = path {
            index::prune(&self.tree, &path, class_name.as_ref(), &|nid| self.file_paths(nid), &self.config.sourcemap_abs_path())?;
        }

        Ok(())
    }

    /// Dispatches a local filesystem change: looks up the node owning the
    /// changed path and, if found, updates its source and notifies the
    /// editor. Unmapped paths are logged and ignored rather than turned into
    /// a tree node.
    fn dispatch_local_change(&mut self, path: PathBuf, body: String) -> Result {
        let Some(id) = self.projector.id_of(&path).cloned() else {
            tracing::debug!(path = %path.display(), "local change to untracked file, ignoring");
            return Ok(());
        };

        if self.tree.update_script_source(&id, body.clone()).is_none() {
            return Ok(());
        }

        self.send(Outbound::PatchScript { id, source: body })
    }

    /// Computes the on-disk directory segments and file name for a
    /// script-bearing node, honoring container collapse for nodes that have
    /// children of their own.
    fn script_file(&self, id: &NodeId) -> Option<(Vec<String>, String)> {
        let node = self.tree.get(id)?;
        if !node.class_name.is_script() {
            return None;
        }

        let path = self.tree.path_of(id)?;
        let sanitized: Vec<String> = path.iter().map(|s| sanitize_path_segment(s)).collect();
        let collapse = !node.children.is_empty();

        let mut segments = sanitized;
        let name = segments.pop().unwrap_or_else(|| sanitize_path_segment(&node.name));
        if collapse {
            segments.push(name.clone());
        }

        let file_name = encode_named_file(&name, node.class_name.clone(), &self.config.script_extension, collapse);
        Some((segments, file_name))
    }

    /// Writes a script node's current source to disk, arming suppression for
    /// both its new path and (if it moved) its previous path beforehand.
    fn project_script(&mut self, id: &NodeId) -> Result {
        let Some((segments, file_name)) = self.script_file(id) else {
            return Ok(());
        };
        let source = self.tree.get(id).and_then(|node| node.source.clone()).unwrap_or_default();

        let old_path = self.projector.path_of(id).map(std::path::Path::to_path_buf);
        let mut new_path = self.projector.root().to_path_buf();
        for segment in &segments {
            new_path.push(segment);
        }
        new_path.push(&file_name);

        if let Some(watcher) = &self.watcher {
            watcher.suppress_next_change(new_path.clone());
            if old_path.as_ref().is_some_and(|old| old != &new_path) {
                watcher.suppress_next_change(old_path.unwrap());
            }
        }

        self.projector.write_script(id.clone(), &segments, &file_name, &source).map(|_| ())
    }

    /// Returns the `filePaths` entry for a sourcemap node.
    fn file_paths(&self, id: &NodeId) -> Option<Vec<String>> {
        let path = self.projector.path_of(id)?;
        Some(vec![index::relative_forward_slash(self.projector.root(), path)])
    }

    /// Restarts the filesystem watcher rooted at the sync directory.
    ///
    /// Dropping the previous [`Watcher`], if any, disconnects its agent
    /// thread's channel, which terminates it.
    fn restart_watcher(&mut self) {
        let tx = self.local_tx.clone();
        self.watcher = Some(Watcher::new(&self.config.sync_dir, self.config.file_watch_debounce(), move |path, body| {
            let _ = tx.send((path, body));
        }));
    }

    /// Returns whether `class_name` is in the configured exclusion set.
    ///
    /// Applied to both `fullSnapshot` entries and `instanceUpdated` messages,
    /// per the strict reading of `excluded_services` adopted in the
    /// project's design notes.
    fn is_excluded(&self, class_name: &str) -> bool {
        self.config.excluded_services.iter().any(|excluded| excluded == class_name)
    }

    /// Serializes and sends a message over whichever transport variant is
    /// currently active.
    fn send(&self, message: Outbound) -> Result {
        self.transport.send(serde_json::to_string(&message)?)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn raw(id: &str, class: &str, name: &str, parent: Option<&str>, source: Option<&str>) -> RawInstance {
        RawInstance {
            id: NodeId::from(id),
            class_name: class.to_string(),
            name: name.to_string(),
            parent: parent.map(NodeId::from),
            source: source.map(str::to_string),
        }
    }

    fn reconciler(sync_dir: &std::path::Path) -> Reconciler {
        let config = Config { sync_dir: sync_dir.to_path_buf(), port: 0, ..Config::default() };
        Reconciler::start(config).unwrap()
    }

    #[test]
    fn full_snapshot_projects_scripts_and_writes_index() {
        let dir = tempdir().unwrap();
        let mut rec = reconciler(dir.path());

        rec.handle_full_snapshot(vec![
            raw("1", "Folder", "ServerScriptService", None, None),
            raw("2", "Script", "Main", Some("1"), Some("print('hi')")),
        ])
        .unwrap();

        let file = dir.path().join("ServerScriptService").join("Main.server.luau");
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "print('hi')");
        assert!(dir.path().join("sourcemap.json").exists());
    }

    #[test]
    fn container_collapse_writes_init_file_for_script_with_children() {
        let dir = tempdir().unwrap();
        let mut rec = reconciler(dir.path());

        rec.handle_full_snapshot(vec![
            raw("1", "Script", "Weapon", None, Some("return {}")),
            raw("2", "ModuleScript", "Config", Some("1"), Some("return 1")),
        ])
        .unwrap();

        let file = dir.path().join("Weapon").join("init.server.luau");
        assert!(file.is_file());
        let child = dir.path().join("Weapon").join("Config.luau");
        assert!(child.is_file());
    }

    #[test]
    fn script_changed_rewrites_file_and_updates_tree() {
        let dir = tempdir().unwrap();
        let mut rec = reconciler(dir.path());
        rec.handle_full_snapshot(vec![raw("1", "Script", "Main", None, Some("old"))]).unwrap();

        rec.handle_script_changed(
            NodeId::from("1"),
            vec![String::from("Main")],
            String::from("Script"),
            String::from("new"),
        )
        .unwrap();

        let file = dir.path().join("Main.server.luau");
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "new");
        assert_eq!(rec.tree.get(&NodeId::from("1")).unwrap().source.as_deref(), Some("new"));
    }

    #[test]
    fn script_changed_for_unknown_node_upserts_it_from_the_message() {
        let dir = tempdir().unwrap();
        let mut rec = reconciler(dir.path());
        rec.handle_full_snapshot(vec![raw("1", "Folder", "ServerScriptService", None, None)]).unwrap();

        rec.handle_script_changed(
            NodeId::from("2"),
            vec![String::from("ServerScriptService"), String::from("Main")],
            String::from("Script"),
            String::from("print('new')"),
        )
        .unwrap();

        let node = rec.tree.get(&NodeId::from("2")).unwrap();
        assert_eq!(node.source.as_deref(), Some("print('new')"));
        let file = dir.path().join("ServerScriptService").join("Main.server.luau");
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "print('new')");
    }

    #[test]
    fn script_changed_for_unknown_node_with_missing_parent_is_dropped() {
        let dir = tempdir().unwrap();
        let mut rec = reconciler(dir.path());
        rec.handle_full_snapshot(vec![raw("1", "Folder", "ServerScriptService", None, None)]).unwrap();

        rec.handle_script_changed(
            NodeId::from("9"),
            vec![String::from("Missing"), String::from("Main")],
            String::from("Script"),
            String::from("x"),
        )
        .unwrap();

        assert!(rec.tree.get(&NodeId::from("9")).is_none());
    }

    #[test]
    fn deleted_removes_files_and_tree_node() {
        let dir = tempdir().unwrap();
        let mut rec = reconciler(dir.path());
        rec.handle_full_snapshot(vec![
            raw("1", "Folder", "A", None, None),
            raw("2", "Script", "Main", Some("1"), Some("x")),
        ])
        .unwrap();

        rec.handle_deleted(NodeId::from("1")).unwrap();

        assert!(rec.tree.get(&NodeId::from("1")).is_none());
        assert!(!dir.path().join("A").exists());
    }

    #[test]
    fn excluded_service_is_dropped_from_full_snapshot() {
        let dir = tempdir().unwrap();
        let config = Config {
            sync_dir: dir.path().to_path_buf(),
            port: 0,
            excluded_services: vec![String::from("Folder")],
            ..Config::default()
        };
        let mut rec = Reconciler::start(config).unwrap();

        rec.handle_full_snapshot(vec![raw("1", "Folder", "ServerScriptService", None, None)]).unwrap();

        assert!(rec.tree.get(&NodeId::from("1")).is_none());
    }

    #[test]
    fn local_change_to_untracked_path_is_ignored_without_error() {
        let dir = tempdir().unwrap();
        let mut rec = reconciler(dir.path());
        rec.handle_full_snapshot(vec![raw("1", "Folder", "ServerScriptService", None, None)]).unwrap();

        rec.dispatch_local_change(dir.path().join("stray.luau"), String::from("x")).unwrap();
    }

    #[test]
    fn ping_replies_without_error_when_no_editor_connected() {
        let dir = tempdir().unwrap();
        let mut rec = reconciler(dir.path());
        rec.dispatch_inbound(r#"{"type":"ping"}"#).unwrap();
    }
}
