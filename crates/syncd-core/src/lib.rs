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

//! Core engine for the `syncd` filesystem-to-editor synchronization daemon.
//!
//! This crate owns everything that doesn't depend on a particular front end:
//! the tree store, the filesystem projector and its identity codec, the
//! sourcemap index writer, the filesystem watcher wrapper, the editor
//! transport, the reconciler that drives them all, and the push projector
//! used by one-shot invocations. `syncd-cli` is the only consumer.

pub mod config;
pub mod error;
pub mod id;
pub mod identity;
pub mod index;
pub mod projector;
pub mod protocol;
pub mod push;
pub mod reconciler;
pub mod transport;
pub mod tree;
pub mod watch;

pub use config::Config;
pub use error::{Error, Result};
pub use reconciler::Reconciler;
