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

//! Push projector.
//!
//! One-shot mode: walks an existing source tree and emits a `pushSnapshot` to
//! an editor, then exits. No tree store, no watcher, no projector - the
//! filesystem is the source of truth here, not a mirror of one.

use ahash::HashMap;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::id::NodeId;
use crate::index;
use crate::protocol::{Inbound, Outbound, PushMapping, PushSnapshotMapping, RawInstance};
use crate::transport::Transport;
use crate::tree::{ClassName, SnapshotEntry, Tree};

pub mod manifest;
pub mod plain;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// A single instance awaiting depth-then-lexical ordering before it's
/// emitted, carrying the on-disk path backing it, if any.
pub(crate) struct Pending {
    pub depth: usize,
    pub key: String,
    pub instance: RawInstance,
    pub path: Option<PathBuf>,
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Sorts pending entries by depth, then lexically by key, splitting the
/// result into the emitted instance list and its path map.
pub(crate) fn finish(mut pending: Vec<Pending>) -> (Vec<RawInstance>, HashMap<NodeId, PathBuf>) {
    pending.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.key.cmp(&b.key)));

    let mut paths = HashMap::default();
    let mut instances = Vec::with_capacity(pending.len());
    for entry in pending {
        if let Some(path) = entry.path {
            paths.insert(entry.instance.id.clone(), path);
        }
        instances.push(entry.instance);
    }
    (instances, paths)
}

/// Where a push's source-to-destination mapping comes from.
pub enum MappingSource {
    /// Fully specified on the command line.
    Explicit(Vec<PushMapping>),
    /// Requested from the connected editor's own place-level configuration.
    RequestFromEditor,
}

/// Waits for an editor connection, resolves the mapping, walks each
/// mapping's source according to its mode, and sends a single
/// `pushSnapshot`.
///
/// # Errors
///
/// Returns [`Error::ConnectTimeout`] if no editor connects (or reports its
/// mapping, for [`MappingSource::RequestFromEditor`]) within
/// `push_connect_timeout`, or an I/O/manifest error if a mapping's source
/// can't be read.
pub fn run(config: &Config, source: MappingSource) -> Result {
    let transport = Transport::spawn(("0.0.0.0", config.port), config.stale_client_timeout())?;

    let deadline = Instant::now() + config.push_connect_timeout();
    while !transport.is_connected() {
        if Instant::now() >= deadline {
            return Err(Error::ConnectTimeout);
        }
        thread::sleep(Duration::from_millis(50));
    }

    let mappings = match source {
        MappingSource::Explicit(mappings) => mappings,
        MappingSource::RequestFromEditor => request_editor_mappings(&transport, deadline)?,
    };

    let mut snapshot_mappings = Vec::with_capacity(mappings.len());
    for mapping in &mappings {
        snapshot_mappings.push(build_mapping(mapping, &config.script_extension)?);
    }

    transport.send(serde_json::to_string(&Outbound::PushSnapshot { mappings: snapshot_mappings })?)
}

/// Asks the connected editor for its place-level mapping and waits for the
/// reply, up to `deadline`.
fn request_editor_mappings(transport: &Transport, deadline: Instant) -> Result<Vec<PushMapping>> {
    transport.send(serde_json::to_string(&Outbound::RequestPushConfig)?)?;
    loop {
        if let Some(message) = transport.try_recv() {
            if let Inbound::PushConfig { config } = serde_json::from_str(&message)? {
                return Ok(config.mappings);
            }
        }
        if Instant::now() >= deadline {
            return Err(Error::ConnectTimeout);
        }
        thread::sleep(Duration::from_millis(50));
    }
}

/// Walks a single mapping's source into a [`PushSnapshotMapping`].
fn build_mapping(mapping: &PushMapping, extension: &str) -> Result<PushSnapshotMapping> {
    let source = Path::new(&mapping.source);
    let (instances, _) = if mapping.rojo_mode {
        manifest::walk(source, extension)?
    } else {
        plain::walk(source, extension)?
    };
    Ok(PushSnapshotMapping { destination: mapping.destination.clone(), destructive: mapping.destructive, instances })
}

/// Builds a sourcemap-equivalent index purely from disk, without requiring a
/// live editor connection.
///
/// Each mapping's walked subtree is grafted at its destination path,
/// creating placeholder `Folder` ancestors (as tree roots, same as any other
/// root-level service) for destination segments that don't already exist.
/// This is a best-effort reconstruction for validating a mirror's shape in
/// CI, not a faithful replay of what a connected editor would report; the
/// synthetic `Game`/`DataModel` wrapper around it comes from
/// [`index::regenerate`], same as for a live tree.
///
/// # Errors
///
/// Returns an I/O or manifest error if a mapping's source can't be read, or
/// if the resulting index can't be written.
pub fn build(config: &Config, mappings: &[PushMapping]) -> Result {
    let mut entries = Vec::new();
    let mut paths: HashMap<NodeId, PathBuf> = HashMap::default();
    let mut folders: HashMap<(Option<NodeId>, String), NodeId> = HashMap::default();

    for mapping in mappings {
        let source = Path::new(&mapping.source);
        let (instances, instance_paths) =
            if mapping.rojo_mode { manifest::walk(source, &config.script_extension)? } else { plain::walk(source, &config.script_extension)? };
        paths.extend(instance_paths);

        let anchor = ensure_folder_path(&mut entries, &mut folders, &mapping.destination);

        for (index, raw) in instances.into_iter().enumerate() {
            let parent = if index == 0 { anchor.clone() } else { raw.parent };
            entries.push(SnapshotEntry {
                id: raw.id,
                class_name: ClassName::parse(&raw.class_name),
                name: raw.name,
                parent,
                source: raw.source,
            });
        }
    }

    let mut tree = Tree::new();
    tree.apply_full_snapshot(entries);

    index::regenerate(
        &tree,
        &|id| paths.get(id).map(|path| vec![index::relative_forward_slash(Path::new("."), path)]),
        &config.sourcemap_abs_path(),
    )
}

/// Walks (creating placeholder `Folder` entries as needed) down `segments`
/// from the tree's implicit top, returning the id of the final segment, or
/// `None` if `segments` is empty (the mapping lands directly at the root).
fn ensure_folder_path(
    entries: &mut Vec<SnapshotEntry>, folders: &mut HashMap<(Option<NodeId>, String), NodeId>, segments: &[String],
) -> Option<NodeId> {
    let mut parent: Option<NodeId> = None;
    for segment in segments {
        let key = (parent.clone(), segment.clone());
        if let Some(existing) = folders.get(&key) {
            parent = Some(existing.clone());
            continue;
        }

        let id = NodeId::generate();
        entries.push(SnapshotEntry { id: id.clone(), class_name: ClassName::Folder, name: segment.clone(), parent: parent.clone(), source: None });
        folders.insert(key, id.clone());
        parent = Some(id);
    }
    parent
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_folder_path_reuses_existing_segments() {
        let mut entries = Vec::new();
        let mut folders = HashMap::default();

        let a = ensure_folder_path(&mut entries, &mut folders, &[String::from("ServerScriptService")]);
        let b = ensure_folder_path(&mut entries, &mut folders, &[String::from("ServerScriptService")]);

        assert_eq!(a, b);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn ensure_folder_path_on_empty_segments_anchors_at_root() {
        let mut entries = Vec::new();
        let mut folders = HashMap::default();

        let anchor = ensure_folder_path(&mut entries, &mut folders, &[]);

        assert!(anchor.is_none());
        assert!(entries.is_empty());
    }

    #[test]
    fn finish_orders_by_depth_then_key() {
        let pending = vec![
            Pending {
                depth: 1,
                key: String::from("b"),
                instance: RawInstance { id: NodeId::from("b"), class_name: String::from("Folder"), name: String::from("b"), parent: None, source: None },
                path: None,
            },
            Pending {
                depth: 0,
                key: String::from("a"),
                instance: RawInstance { id: NodeId::from("a"), class_name: String::from("Folder"), name: String::from("a"), parent: None, source: None },
                path: None,
            },
        ];

        let (instances, _) = finish(pending);
        assert_eq!(instances[0].id, NodeId::from("a"));
        assert_eq!(instances[1].id, NodeId::from("b"));
    }
}
