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

//! Errors that can occur when parsing a request.

use std::result;
use thiserror::Error;

use crate::http::component;
use crate::http::Status;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Errors that can occur when parsing a request.
#[derive(Debug, Error)]
pub enum Error {
    /// The given buffer contained insufficient data to parse a complete
    /// request. The caller should keep reading from the socket and retry
    /// once more data is available.
    #[error("incomplete request")]
    Incomplete,

    /// The buffer contained invalid data that could not be parsed as an
    /// HTTP request.
    #[error("malformed request: {0}")]
    Parser(#[from] httparse::Error),

    /// The parsed request contained an invalid [`Method`][] or [`Header`][].
    ///
    /// [`Method`]: crate::http::Method
    /// [`Header`]: crate::http::Header
    #[error(transparent)]
    Component(#[from] component::Error),

    /// The request failed a validation check and should be answered with the
    /// given status code instead of being processed further.
    #[error("invalid request: {0}")]
    Validation(Status),
}

/// A specialized [`Result`][] type for request parsing.
///
/// [`Result`]: std::result::Result
pub type Result<T = ()> = result::Result<T, Error>;
