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

//! Filesystem projector.
//!
//! Owns the id-to-path mapping that the tree store itself doesn't need to
//! know about, and is the only module allowed to write or delete files under
//! the sync directory.

use ahash::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::id::NodeId;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Projects tree nodes onto the filesystem.
#[derive(Debug)]
pub struct Projector {
    /// Root directory scripts are written under.
    root: PathBuf,
    /// File extension scripts are written with, e.g. `luau`.
    extension: String,
    /// Currently known id -> absolute file path mapping.
    paths: HashMap<NodeId, PathBuf>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Projector {
    /// Creates a projector rooted at `root`, writing files with the given
    /// extension (without a leading dot).
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self { root: root.into(), extension: extension.into(), paths: HashMap::new() }
    }

    /// Returns the absolute path currently associated with `id`, if any.
    #[must_use]
    pub fn path_of(&self, id: &NodeId) -> Option<&Path> {
        self.paths.get(id).map(PathBuf::as_path)
    }

    /// Returns the id currently associated with the given absolute path, if
    /// any, by reverse lookup.
    #[must_use]
    pub fn id_of(&self, path: &Path) -> Option<&NodeId> {
        self.paths.iter().find(|(_, p)| p.as_path() == path).map(|(id, _)| id)
    }

    /// Writes (or rewrites) a script's file on disk, creating parent
    /// directories as needed.
    ///
    /// `segments` is the sanitized path from the sync root to the file's
    /// containing directory, and `file_name` is the codec-encoded leaf name
    /// (see [`crate::identity`]).
    pub fn write_script(
        &mut self, id: NodeId, segments: &[String], file_name: &str, source: &str,
    ) -> Result<PathBuf> {
        let mut dir = self.root.clone();
        for segment in segments {
            dir.push(segment);
        }
        fs::create_dir_all(&dir)?;

        let path = dir.join(file_name);
        fs::write(&path, source)?;

        if let Some(old) = self.paths.insert(id, path.clone()) {
            if old != path {
                self.remove_file_and_prune(&old)?;
            }
        }

        Ok(path)
    }

    /// Removes the file (or directory, if the node collapsed into an `init`
    /// file) previously associated with `id`, pruning now-empty ancestor
    /// directories up to (but not including) the sync root.
    pub fn delete_path(&mut self, id: &NodeId) -> Result {
        if let Some(path) = self.paths.remove(id) {
            self.remove_file_and_prune(&path)?;
        }
        Ok(())
    }

    /// Removes a single file and prunes empty ancestor directories.
    fn remove_file_and_prune(&self, path: &Path) -> Result {
        if path.is_file() {
            fs::remove_file(path)?;
        }

        let mut dir = path.parent().map(Path::to_path_buf);
        while let Some(current) = dir {
            if current == self.root || !current.starts_with(&self.root) {
                break;
            }
            let is_empty = fs::read_dir(&current).map(|mut it| it.next().is_none()).unwrap_or(false);
            if !is_empty {
                break;
            }
            fs::remove_dir(&current)?;
            dir = current.parent().map(Path::to_path_buf);
        }

        Ok(())
    }

    /// Removes every file on disk whose id is not present in `live`.
    ///
    /// Disabled by default (see `delete_orphans_on_connect`); only invoked
    /// by the reconciler when a full snapshot is applied and the
    /// configuration opts in.
    pub fn prune_orphans(&mut self, live: &ahash::HashSet<NodeId>) -> Result {
        let orphaned: Vec<NodeId> =
            self.paths.keys().filter(|id| !live.contains(*id)).cloned().collect();
        for id in orphaned {
            self.delete_path(&id)?;
        }
        Ok(())
    }

    /// Returns the configured script extension.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the sync root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_script_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let mut projector = Projector::new(dir.path(), "luau");

        let path = projector
            .write_script(
                NodeId::from("a"),
                &["ServerScriptService".to_string()],
                "Main.server.luau",
                "print('hi')",
            )
            .unwrap();

        assert!(path.is_file());
        assert_eq!(fs::read_to_string(&path).unwrap(), "print('hi')");
    }

    #[test]
    fn write_script_moves_and_prunes_old_location() {
        let dir = tempdir().unwrap();
        let mut projector = Projector::new(dir.path(), "luau");

        let old = projector
            .write_script(NodeId::from("a"), &["A".to_string()], "Main.luau", "1")
            .unwrap();
        assert!(old.is_file());

        let new = projector
            .write_script(NodeId::from("a"), &["B".to_string()], "Main.luau", "1")
            .unwrap();

        assert!(new.is_file());
        assert!(!old.exists());
        assert!(!old.parent().unwrap().exists());
    }

    #[test]
    fn delete_path_removes_file_and_empty_ancestors() {
        let dir = tempdir().unwrap();
        let mut projector = Projector::new(dir.path(), "luau");
        projector
            .write_script(NodeId::from("a"), &["A".to_string(), "B".to_string()], "Main.luau", "1")
            .unwrap();

        projector.delete_path(&NodeId::from("a")).unwrap();

        assert!(!dir.path().join("A").exists());
    }

    #[test]
    fn delete_path_keeps_sibling_files() {
        let dir = tempdir().unwrap();
        let mut projector = Projector::new(dir.path(), "luau");
        projector
            .write_script(NodeId::from("a"), &["A".to_string()], "One.luau", "1")
            .unwrap();
        projector
            .write_script(NodeId::from("b"), &["A".to_string()], "Two.luau", "2")
            .unwrap();

        projector.delete_path(&NodeId::from("a")).unwrap();

        assert!(dir.path().join("A").exists());
        assert!(dir.path().join("A").join("Two.luau").exists());
    }
}
