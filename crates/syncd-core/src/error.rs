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

//! Top-level error type.

use std::{io, result};
use thiserror::Error;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Reconciliation error.
///
/// Per the concurrency model, none of these are allowed to bubble out of the
/// daemon's event loop - the [`crate::reconciler::Reconciler`] logs and
/// recovers from all of them. They only propagate as `Err` from one-shot
/// `push`/`build` invocations, where they cause a non-zero exit.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// File watcher error.
    #[error(transparent)]
    Watch(#[from] syncd_watch::Error),

    /// Transport error.
    #[error(transparent)]
    Transport(#[from] syncd_serve::server::Error),

    /// Referenced an unknown node id.
    #[error("unknown node id: {0}")]
    UnknownNode(String),

    /// Malformed project manifest.
    #[error("malformed project manifest: {0}")]
    Manifest(String),

    /// No editor connected within the configured timeout.
    #[error("timed out waiting for an editor connection")]
    ConnectTimeout,

    /// The reconciliation loop's channel disconnected.
    #[error("internal channel disconnected")]
    Disconnected,
}

impl<T> From<crossbeam::channel::SendError<T>> for Error {
    #[inline]
    fn from(_: crossbeam::channel::SendError<T>) -> Self {
        Error::Disconnected
    }
}

impl From<crossbeam::channel::RecvError> for Error {
    #[inline]
    fn from(_: crossbeam::channel::RecvError) -> Self {
        Error::Disconnected
    }
}

// ----------------------------------------------------------------------------
// Type aliases
// ----------------------------------------------------------------------------

/// Result type alias using [`Error`].
pub type Result<T = ()> = result::Result<T, Error>;
