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

//! Filesystem watcher.
//!
//! Wraps [`syncd_watch::Agent`] with script-extension filtering and per-path
//! echo suppression, so the reconciler never has to handle its own writes
//! bouncing back as spurious local edits.

use ahash::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use syncd_watch::event::Kind;
use syncd_watch::Agent;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// Watches the sync directory, filtering to script files and suppressing
/// echoes of the projector's own writes.
pub struct Watcher {
    agent: Agent,
    suppressed: Arc<Mutex<HashSet<PathBuf>>>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Watcher {
    /// Starts watching `root`, invoking `on_change(abs_path, body)` whenever
    /// a non-suppressed `.lua`/`.luau` file stabilizes after an edit.
    ///
    /// `debounce` is the per-path stability window (see the redesign notes
    /// in the module docs): a changed path only fires once no further write
    /// to that exact path lands within the window.
    pub fn new<F>(root: impl AsRef<Path>, debounce: Duration, mut on_change: F) -> Self
    where
        F: FnMut(PathBuf, String) + Send + 'static,
    {
        let suppressed: Arc<Mutex<HashSet<PathBuf>>> = Arc::new(Mutex::new(HashSet::default()));
        let suppressed_for_agent = Arc::clone(&suppressed);

        let agent = Agent::new(debounce, move |event| {
            let event = event?;
            if event.kind() != Kind::File {
                return Ok(());
            }

            let path = event.path();
            if !is_script_path(path.as_path()) {
                return Ok(());
            }

            {
                let mut suppressed = suppressed_for_agent.lock().unwrap_or_else(|e| e.into_inner());
                if suppressed.remove(path.as_path()) {
                    return Ok(());
                }
            }

            if let Ok(body) = std::fs::read_to_string(path.as_path()) {
                on_change(path.as_path().to_path_buf(), body);
            }

            Ok(())
        });

        let root = root.as_ref();
        let _ = agent.watch(root);

        Self { agent, suppressed }
    }

    /// Arms a single-use suppression token for `path`.
    ///
    /// Must be called *before* the write that is expected to trigger the
    /// echo, never after - otherwise the watcher event can fire before the
    /// token is armed.
    pub fn suppress_next_change(&self, path: impl Into<PathBuf>) {
        let mut suppressed = self.suppressed.lock().unwrap_or_else(|e| e.into_inner());
        suppressed.insert(path.into());
    }

    /// Returns whether the watcher's background thread has terminated.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.agent.is_terminated()
    }

    /// Watches an additional root path.
    ///
    /// # Errors
    ///
    /// Propagates [`syncd_watch::Error`] if the path can't be canonicalized
    /// or the agent's channel has disconnected.
    pub fn watch(&self, path: impl AsRef<Path>) -> syncd_watch::Result {
        self.agent.watch(path)
    }

    /// Stops watching a previously-watched root path.
    ///
    /// # Errors
    ///
    /// Propagates [`syncd_watch::Error`] if the path can't be canonicalized
    /// or the agent's channel has disconnected.
    pub fn unwatch(&self, path: impl AsRef<Path>) -> syncd_watch::Result {
        self.agent.unwatch(path)
    }
}

/// Returns whether `path` has a `.lua` or `.luau` extension.
fn is_script_path(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("lua" | "luau"))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_script_path_accepts_lua_and_luau() {
        assert!(is_script_path(Path::new("foo.lua")));
        assert!(is_script_path(Path::new("foo.luau")));
        assert!(!is_script_path(Path::new("foo.txt")));
        assert!(!is_script_path(Path::new("foo")));
    }
}
