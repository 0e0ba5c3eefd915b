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

//! Daemon and push configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Daemon configuration, merged from an optional `--config` JSON file
/// overlaid by explicit CLI flags (flags win).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// TCP port the transport endpoint binds to.
    pub port: u16,
    /// Directory the filesystem mirror is rooted at.
    pub sync_dir: PathBuf,
    /// Path to the sourcemap JSON index, relative to `sync_dir` unless
    /// absolute.
    pub sourcemap_path: PathBuf,
    /// Extension the Filesystem Projector writes new files with.
    pub script_extension: String,
    /// Class names exempted from projection and from inbound filtering.
    pub excluded_services: Vec<String>,
    /// Whether a full snapshot removes files with no corresponding node.
    pub delete_orphans_on_connect: bool,
    /// Per-path debounce window, in milliseconds, before a local edit is
    /// dispatched.
    pub file_watch_debounce_ms: u64,
    /// Seconds a long-poll client may go without polling before its queue
    /// is reaped.
    pub stale_client_timeout_secs: u64,
    /// Seconds the Push Projector waits for an editor connection before
    /// giving up.
    pub push_connect_timeout_secs: u64,
    /// Raises the log verbosity floor when set.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            sync_dir: PathBuf::from("src"),
            sourcemap_path: PathBuf::from("sourcemap.json"),
            script_extension: String::from("luau"),
            excluded_services: Vec::new(),
            delete_orphans_on_connect: false,
            file_watch_debounce_ms: 100,
            stale_client_timeout_secs: 60,
            push_connect_timeout_secs: 8,
            debug: false,
        }
    }
}

impl Config {
    /// Loads a configuration overlay from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or doesn't parse.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Resolves `sourcemap_path` to an absolute path under `sync_dir` when
    /// it was given as relative.
    #[must_use]
    pub fn sourcemap_abs_path(&self) -> PathBuf {
        if self.sourcemap_path.is_absolute() {
            self.sourcemap_path.clone()
        } else {
            self.sync_dir.join(&self.sourcemap_path)
        }
    }

    /// Returns the per-path debounce window as a [`std::time::Duration`].
    #[must_use]
    pub fn file_watch_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.file_watch_debounce_ms)
    }

    /// Returns the stale client timeout as a [`std::time::Duration`].
    #[must_use]
    pub fn stale_client_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.stale_client_timeout_secs)
    }

    /// Returns the push connect timeout as a [`std::time::Duration`].
    #[must_use]
    pub fn push_connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.push_connect_timeout_secs)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.script_extension, "luau");
        assert!(!config.delete_orphans_on_connect);
        assert_eq!(config.file_watch_debounce_ms, 100);
        assert_eq!(config.stale_client_timeout_secs, 60);
        assert_eq!(config.push_connect_timeout_secs, 8);
    }

    #[test]
    fn sourcemap_abs_path_joins_relative_under_sync_dir() {
        let config = Config { sync_dir: PathBuf::from("/tmp/game"), ..Config::default() };
        assert_eq!(config.sourcemap_abs_path(), PathBuf::from("/tmp/game/sourcemap.json"));
    }

    #[test]
    fn load_parses_a_partial_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syncd.json");
        std::fs::write(&path, r#"{"port": 9000}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.script_extension, "luau");
    }
}
