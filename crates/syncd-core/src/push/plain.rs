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

//! Plain mode: walks a directory tree directly, with no project manifest.
//!
//! The inverse of [`crate::projector`]'s container collapse - a directory
//! holding an `init` file becomes a single scripted node instead of a
//! `Folder` plus a same-named child.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::id::NodeId;
use crate::identity::classify_file;
use crate::protocol::RawInstance;

use super::Pending;

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Walks `root`, returning its instances (shallow-first) and the disk path
/// backing each.
///
/// # Errors
///
/// Returns an error if `root` or any of its descendants can't be read.
pub fn walk(root: &Path, extension: &str) -> Result<(Vec<RawInstance>, ahash::HashMap<NodeId, PathBuf>)> {
    let root_id = NodeId::generate();
    let name = root.file_name().and_then(|n| n.to_str()).unwrap_or_default().to_string();
    let key = name.clone();

    let mut pending = vec![Pending {
        depth: 0,
        key: key.clone(),
        instance: RawInstance { id: root_id.clone(), class_name: String::from("Folder"), name, parent: None, source: None },
        path: Some(root.to_path_buf()),
    }];

    collect_children(root, &root_id, extension, 1, &key, &|_| false, &|_| false, &mut pending)?;
    Ok(super::finish(pending))
}

/// Walks the immediate children of `dir` and recurses, skipping any name for
/// which `skip` returns true (used by manifest mode to give explicit entries
/// precedence over what's found on disk) or any path for which `ignore`
/// returns true (the default glob-ignore set plus a manifest node's
/// `$ignore`).
pub(crate) fn collect_children(
    dir: &Path, parent: &NodeId, extension: &str, depth: usize, key_prefix: &str, skip: &dyn Fn(&str) -> bool,
    ignore: &dyn Fn(&Path) -> bool, out: &mut Vec<Pending>,
) -> Result {
    let mut entries: Vec<_> = fs::read_dir(dir)?.filter_map(std::result::Result::ok).collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().into_owned();

        if is_init_file(&file_name) || ignore(&path) {
            continue;
        }

        if path.is_dir() {
            let logical_name = file_name;
            if skip(&logical_name) {
                continue;
            }
            let key = format!("{key_prefix}/{logical_name}");
            let id = NodeId::generate();

            if let Some(init) = find_init_file(&path, extension)? {
                let (class_name, source) = read_script(&init)?;
                out.push(Pending {
                    depth,
                    key: key.clone(),
                    instance: RawInstance { id: id.clone(), class_name, name: logical_name, parent: Some(parent.clone()), source: Some(source) },
                    path: Some(init),
                });
            } else {
                out.push(Pending {
                    depth,
                    key: key.clone(),
                    instance: RawInstance { id: id.clone(), class_name: String::from("Folder"), name: logical_name, parent: Some(parent.clone()), source: None },
                    path: Some(path.clone()),
                });
            }
            collect_children(&path, &id, extension, depth + 1, &key, &|_| false, ignore, out)?;
        } else if let Some((class_name, name)) = classify_file(&file_name) {
            if skip(&name) {
                continue;
            }
            let source = fs::read_to_string(&path)?;
            let key = format!("{key_prefix}/{name}");
            out.push(Pending {
                depth,
                key,
                instance: RawInstance { id: NodeId::generate(), class_name: class_name.as_str().to_string(), name, parent: Some(parent.clone()), source: Some(source) },
                path: Some(path),
            });
        }
    }

    Ok(())
}

/// Returns the first `init*` file found directly inside `dir`, if any.
///
/// `.lua` candidates are only tried when `extension` isn't already `lua`,
/// mirroring [`crate::identity::classify_file`]'s read-side leniency.
pub(crate) fn find_init_file(dir: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let mut candidates = vec![format!("init.server.{extension}"), format!("init.client.{extension}"), format!("init.{extension}")];
    if extension != "lua" {
        candidates.extend([String::from("init.server.lua"), String::from("init.client.lua"), String::from("init.lua")]);
    }

    for candidate in candidates {
        let path = dir.join(&candidate);
        if path.is_file() {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

/// Classifies and reads an `init*` file's class and source.
pub(crate) fn read_script(path: &Path) -> Result<(String, String)> {
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let (class_name, _) =
        classify_file(file_name).ok_or_else(|| crate::error::Error::Manifest(format!("not a script file: {}", path.display())))?;
    let source = fs::read_to_string(path)?;
    Ok((class_name.as_str().to_string(), source))
}

/// Returns whether `file_name` is one of the `init*` container-collapse
/// forms.
pub(crate) fn is_init_file(file_name: &str) -> bool {
    classify_file(file_name).is_some_and(|(_, name)| name == "init")
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn walk_collapses_init_directory_into_scripted_node() {
        let dir = tempdir().unwrap();
        let weapon = dir.path().join("Weapon");
        fs::create_dir_all(&weapon).unwrap();
        fs::write(weapon.join("init.server.luau"), "return {}").unwrap();
        fs::write(weapon.join("Config.luau"), "return 1").unwrap();

        let (instances, _) = walk(dir.path(), "luau").unwrap();

        let weapon_entry = instances.iter().find(|i| i.name == "Weapon").unwrap();
        assert_eq!(weapon_entry.class_name, "Script");
        assert_eq!(weapon_entry.source.as_deref(), Some("return {}"));

        let config_entry = instances.iter().find(|i| i.name == "Config").unwrap();
        assert_eq!(config_entry.parent.as_ref(), Some(&weapon_entry.id));
    }

    #[test]
    fn walk_is_shallow_first() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("A");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("Main.luau"), "x").unwrap();

        let (instances, _) = walk(dir.path(), "luau").unwrap();
        let root_idx = 0;
        let folder_idx = instances.iter().position(|i| i.name == "A").unwrap();
        let script_idx = instances.iter().position(|i| i.name == "Main").unwrap();
        assert!(root_idx < folder_idx);
        assert!(folder_idx < script_idx);
    }

    #[test]
    fn walk_orders_siblings_lexically() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Zeta.luau"), "1").unwrap();
        fs::write(dir.path().join("Alpha.luau"), "2").unwrap();

        let (instances, _) = walk(dir.path(), "luau").unwrap();
        let names: Vec<&str> = instances.iter().skip(1).map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }
}
