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

//! Identity and path codec.
//!
//! Pure functions translating between on-disk file names and instance
//! identity. Nothing in this module touches the filesystem or the tree
//! store - it's the one part of the daemon that's trivially unit-testable
//! in isolation.

use crate::tree::ClassName;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Characters that are illegal in path segments on at least one major
/// platform, and are therefore sanitized when writing to disk.
const ILLEGAL: [char; 6] = ['<', '>', ':', '"', '|', '?', '*'];

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Classifies a bare file name, returning the inferred class and the logical
/// (un-sanitized) name.
///
/// Returns `None` if the file name has neither a `.lua` nor `.luau`
/// extension, i.e. it's not a script file this daemon projects at all.
///
/// # Examples
///
/// ```
/// use syncd_core::identity::classify_file;
/// use syncd_core::tree::ClassName;
///
/// assert_eq!(
///     classify_file("Weapon.server.luau"),
///     Some((ClassName::Script, String::from("Weapon"))),
/// );
/// assert_eq!(
///     classify_file("Utility.luau"),
///     Some((ClassName::ModuleScript, String::from("Utility"))),
/// );
/// ```
#[must_use]
pub fn classify_file(file_name: &str) -> Option<(ClassName, String)> {
    let stem = strip_script_extension(file_name)?;

    if let Some(name) = stem.strip_suffix(".server") {
        Some((ClassName::Script, name.to_string()))
    } else if let Some(name) = stem.strip_suffix(".client") {
        Some((ClassName::LocalScript, name.to_string()))
    } else if let Some(name) = stem.strip_suffix(".module") {
        Some((ClassName::ModuleScript, name.to_string()))
    } else {
        Some((ClassName::ModuleScript, stem.to_string()))
    }
}

/// Strips a `.lua` or `.luau` extension, returning the remaining stem.
///
/// `.lua` is treated as an alias of `.luau` for the purposes of reading an
/// existing tree: the canonical extension this daemon *writes* is always
/// `.luau` (or whatever `script_extension` is configured to), but both are
/// accepted when classifying files that already exist on disk.
fn strip_script_extension(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(".luau")
        .or_else(|| file_name.strip_suffix(".lua"))
}

/// Computes the file name for a script-bearing node, given its logical name.
///
/// If `collapse` is true (the node's logical name equals its parent
/// directory's name), the returned name is one of the `init*` forms, and the
/// caller is expected to place the returned file *inside* the directory
/// named after the node, rather than as a sibling of it.
///
/// # Examples
///
/// ```
/// use syncd_core::identity::encode_named_file;
/// use syncd_core::tree::ClassName;
///
/// assert_eq!(
///     encode_named_file("Weapon", ClassName::Script, "luau", false),
///     "Weapon.server.luau",
/// );
/// assert_eq!(
///     encode_named_file("Weapon", ClassName::Script, "luau", true),
///     "init.server.luau",
/// );
/// ```
#[must_use]
pub fn encode_named_file(
    name: &str, class: ClassName, extension: &str, collapse: bool,
) -> String {
    let suffix = match class {
        ClassName::Script => ".server",
        ClassName::LocalScript => ".client",
        ClassName::ModuleScript => "",
        _ => "",
    };

    if collapse {
        format!("init{suffix}.{extension}")
    } else {
        format!("{name}{suffix}.{extension}")
    }
}

/// Sanitizes a single path segment for safe use on disk.
///
/// This is a one-way, lossy transformation: it must never be applied to the
/// canonical logical name held in the tree store, only to the path segments
/// actually written to (or read from) the filesystem.
///
/// # Examples
///
/// ```
/// use syncd_core::identity::sanitize_path_segment;
///
/// assert_eq!(sanitize_path_segment("Wait: What?"), "Wait_ What_");
/// ```
#[must_use]
pub fn sanitize_path_segment(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL.contains(&c) { '_' } else { c })
        .collect()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_server_script() {
        assert_eq!(
            classify_file("Weapon.server.luau"),
            Some((ClassName::Script, String::from("Weapon")))
        );
    }

    #[test]
    fn classify_client_script() {
        assert_eq!(
            classify_file("Hud.client.lua"),
            Some((ClassName::LocalScript, String::from("Hud")))
        );
    }

    #[test]
    fn classify_module_script_explicit_suffix() {
        assert_eq!(
            classify_file("Vector3Utils.module.luau"),
            Some((ClassName::ModuleScript, String::from("Vector3Utils")))
        );
    }

    #[test]
    fn classify_module_script_no_suffix() {
        assert_eq!(
            classify_file("Constants.luau"),
            Some((ClassName::ModuleScript, String::from("Constants")))
        );
    }

    #[test]
    fn classify_rejects_non_script_files() {
        assert_eq!(classify_file("README.md"), None);
        assert_eq!(classify_file("icon.png"), None);
    }

    #[test]
    fn encode_named_file_without_collapse() {
        assert_eq!(
            encode_named_file("Weapon", ClassName::Script, "luau", false),
            "Weapon.server.luau"
        );
        assert_eq!(
            encode_named_file("Hud", ClassName::LocalScript, "luau", false),
            "Hud.client.luau"
        );
        assert_eq!(
            encode_named_file(
                "Constants",
                ClassName::ModuleScript,
                "luau",
                false
            ),
            "Constants.luau"
        );
    }

    #[test]
    fn encode_named_file_with_collapse() {
        assert_eq!(
            encode_named_file("Weapon", ClassName::Script, "luau", true),
            "init.server.luau"
        );
        assert_eq!(
            encode_named_file(
                "Constants",
                ClassName::ModuleScript,
                "luau",
                true
            ),
            "init.luau"
        );
    }

    #[test]
    fn sanitize_replaces_illegal_characters() {
        assert_eq!(sanitize_path_segment("Wait: What?"), "Wait_ What_");
        assert_eq!(sanitize_path_segment("a<b>c:d\"e|f?g*h"), "a_b_c_d_e_f_g_h");
    }

    #[test]
    fn sanitize_is_noop_for_clean_names() {
        assert_eq!(sanitize_path_segment("PlayerController"), "PlayerController");
    }

    #[test]
    fn classify_and_encode_round_trip_for_clean_names() {
        let (class, name) = classify_file("Weapon.server.luau").unwrap();
        assert_eq!(encode_named_file(&name, class, "luau", false), "Weapon.server.luau");
    }
}
