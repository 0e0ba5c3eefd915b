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

//! Wire protocol.
//!
//! Tagged JSON messages exchanged with the editor agent, over whichever
//! transport variant is currently active.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;
use crate::tree::SnapshotEntry;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// A message received from the editor.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Inbound {
    /// Full tree replacement.
    #[serde(rename = "fullSnapshot")]
    FullSnapshot {
        /// Every instance in the tree, in no particular order.
        data: Vec<RawInstance>,
    },

    /// A single instance was created, reparented, or renamed.
    #[serde(rename = "instanceUpdated")]
    InstanceUpdated {
        /// The updated instance.
        data: RawInstance,
    },

    /// A script's source body changed.
    #[serde(rename = "scriptChanged")]
    ScriptChanged {
        /// The script's id.
        id: NodeId,
        /// The script's logical path, root first.
        path: Vec<String>,
        /// The script's class name.
        #[serde(rename = "className")]
        class_name: String,
        /// The new source body.
        source: String,
    },

    /// An instance (and its descendants) was removed.
    #[serde(rename = "deleted")]
    Deleted {
        /// The removed instance's id.
        id: NodeId,
    },

    /// Keepalive.
    #[serde(rename = "ping")]
    Ping,

    /// The editor is closing its connection voluntarily.
    #[serde(rename = "clientDisconnect")]
    ClientDisconnect,

    /// Project mapping reported in response to a push's
    /// [`Outbound::RequestPushConfig`].
    #[serde(rename = "pushConfig")]
    PushConfig {
        /// The reported configuration.
        config: PushConfig,
    },
}

/// A message sent to the editor.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum Outbound {
    /// A local edit to a mirrored script, to be applied to the live
    /// instance.
    #[serde(rename = "patchScript")]
    PatchScript {
        /// The script's id.
        id: NodeId,
        /// The new source body.
        source: String,
    },

    /// Asks the editor to send a fresh [`Inbound::FullSnapshot`].
    #[serde(rename = "requestSnapshot")]
    RequestSnapshot,

    /// Asks the editor to report its current project mapping.
    #[serde(rename = "requestPushConfig")]
    RequestPushConfig,

    /// The result of a one-shot `build` invocation.
    #[serde(rename = "buildSnapshot")]
    BuildSnapshot {
        /// The built tree, root first.
        data: Vec<RawInstance>,
    },

    /// A one-shot push payload.
    #[serde(rename = "pushSnapshot")]
    PushSnapshot {
        /// One entry per configured mapping.
        mappings: Vec<PushSnapshotMapping>,
    },

    /// Reply to [`Inbound::Ping`].
    #[serde(rename = "pong")]
    Pong,

    /// An error the editor should surface to the user.
    #[serde(rename = "error")]
    Error {
        /// Human-readable message.
        message: String,
    },
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// An instance as reported over the wire, before it's been translated into
/// a [`SnapshotEntry`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawInstance {
    /// Stable identifier.
    pub id: NodeId,
    /// Class name.
    #[serde(rename = "className")]
    pub class_name: String,
    /// Logical (un-sanitized) name.
    pub name: String,
    /// Parent id, `None` for the root.
    pub parent: Option<NodeId>,
    /// Source body, present only for script-bearing classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl From<RawInstance> for SnapshotEntry {
    fn from(value: RawInstance) -> Self {
        SnapshotEntry {
            id: value.id,
            class_name: crate::tree::ClassName::parse(&value.class_name),
            name: value.name,
            parent: value.parent,
            source: value.source,
        }
    }
}

/// The editor-reported project mapping used by the Push Projector.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PushConfig {
    /// Source-to-instance mappings the editor wants applied.
    pub mappings: Vec<PushMapping>,
}

/// A single source-path-to-destination-instance mapping.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PushMapping {
    /// Filesystem path, relative to the sync directory.
    pub source: String,
    /// Destination path within the DataModel, root first, e.g.
    /// `["game", "ServerScriptService"]`.
    pub destination: Vec<String>,
    /// Whether instances at the destination not present in the pushed tree
    /// should be removed.
    #[serde(default)]
    pub destructive: bool,
    /// Whether the mapping was derived from a Rojo project file.
    #[serde(default, rename = "rojoMode")]
    pub rojo_mode: bool,
}

/// One mapping's worth of instances in an [`Outbound::PushSnapshot`].
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PushSnapshotMapping {
    /// Destination path within the DataModel, root first.
    pub destination: Vec<String>,
    /// Whether instances at the destination not present in `instances`
    /// should be removed.
    pub destructive: bool,
    /// The instances to apply at `destination`, root of the subtree first.
    pub instances: Vec<RawInstance>,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_full_snapshot_round_trips_through_json() {
        let json = r#"{"type":"fullSnapshot","data":[
            {"id":"0","className":"DataModel","name":"Game","parent":null}
        ]}"#;
        let message: Inbound = serde_json::from_str(json).unwrap();
        match message {
            Inbound::FullSnapshot { data } => assert_eq!(data.len(), 1),
            _ => panic!("expected FullSnapshot"),
        }
    }

    #[test]
    fn outbound_patch_script_serializes_with_type_tag() {
        let message = Outbound::PatchScript { id: NodeId::from("0"), source: String::from("x") };
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains(r#""type":"patchScript""#));
    }

    #[test]
    fn inbound_ping_has_no_payload_fields() {
        let message: Inbound = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(message, Inbound::Ping));
    }
}
