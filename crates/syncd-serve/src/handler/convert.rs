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

//! Handler.

use super::{Handler, Result};

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Attempt conversion into [`Handler`].
pub trait TryIntoHandler: 'static {
    /// Output type of conversion.
    type Output: Handler;

    /// Attempts to convert into a handler.
    ///
    /// Since conversion can be fallible, it's a good idea to move validation
    /// prior to handler instantiation into this method. This allows to keep
    /// the number of fallible methods as low as possible and allows for a more
    /// fluent API, as well as better error handling.
    ///
    /// # Errors
    ///
    /// In case conversion fails, an error should be returned.
    fn try_into_handler(self) -> Result<Self::Output>;
}

// ----------------------------------------------------------------------------
// Blanket implementations
// ----------------------------------------------------------------------------

impl<H> TryIntoHandler for H
where
    H: Handler,
{
    type Output = Self;

    #[inline]
    fn try_into_handler(self) -> Result<Self> {
        Ok(self)
    }
}
