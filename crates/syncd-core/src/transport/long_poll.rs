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

//! HTTP long-poll fallback for editors that can't open a WebSocket.
//!
//! `Server` drives its WebSocket clients synchronously inline in its poll
//! loop, so there is no way for a handler on this server to hold a response
//! open while it waits for a message to arrive - doing so would stall every
//! other connection, including the WebSocket one, for as long as the hold
//! lasts. `/poll` therefore always returns immediately, with whatever is
//! queued for the calling client, which may be nothing. Editors built against
//! this fallback are expected to poll at a short, fixed interval rather than
//! treat the request as a long-lived hold.

use crossbeam::channel::{unbounded, Receiver, Sender};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use syncd_serve::handler::Stack;
use syncd_serve::http::response::ResponseExt;
use syncd_serve::http::{Header, Request, Response, Status};
use syncd_serve::router::{Params, Router};

use super::Active;

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// A single long-poll client's outbound queue.
struct Client {
    outbound: Sender<String>,
    inbox: Receiver<String>,
    last_poll: Instant,
}

/// Shared state for the long-poll fallback, owned by [`super::Transport`] and
/// reachable from the routes registered by [`router`].
pub struct LongPoll {
    clients: Mutex<HashMap<u64, Client>>,
    next_id: Mutex<u64>,
    stale_timeout: std::time::Duration,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl LongPoll {
    /// Creates empty long-poll state.
    ///
    /// `stale_timeout` bounds how long a connected client may go without
    /// calling `/poll` before [`LongPoll::reap_stale`] evicts it.
    pub fn new(stale_timeout: std::time::Duration) -> Self {
        Self { clients: Mutex::new(HashMap::new()), next_id: Mutex::new(0), stale_timeout }
    }

    /// Registers a new client, evicting whatever was there before.
    ///
    /// Only one long-poll client is ever tracked at a time, mirroring the
    /// single-connection invariant enforced for the WebSocket variant.
    fn connect(&self) -> u64 {
        let (outbound, inbox) = unbounded();
        let mut id = self.next_id.lock().unwrap_or_else(|e| e.into_inner());
        *id += 1;
        let id = *id;

        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        clients.clear();
        clients.insert(id, Client { outbound, inbox, last_poll: Instant::now() });
        id
    }

    /// Sends a message to the active client, if `client_id` still matches it.
    fn send_to(&self, client_id: u64, message: String) -> bool {
        let clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        clients.get(&client_id).is_some_and(|client| client.outbound.send(message).is_ok())
    }

    /// Drains whatever is queued for `client_id` and refreshes its last-poll
    /// timestamp, confirming it's still the one connected client.
    fn drain(&self, client_id: u64) -> Option<Vec<String>> {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        let client = clients.get_mut(&client_id)?;
        client.last_poll = Instant::now();
        Some(client.inbox.try_iter().collect())
    }

    /// Evicts `client_id` if it's the active client.
    fn disconnect(&self, client_id: u64) {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        clients.remove(&client_id);
    }

    /// Broadcasts `message` to the active client, if any.
    ///
    /// Mirrors [`Server::poll`]'s WebSocket broadcast, which is written for a
    /// potential multi-client future but in practice only ever has one
    /// recipient given the single-connection invariant.
    pub fn push_active(&self, message: String) {
        let clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        for client in clients.values() {
            let _ = client.outbound.send(message.clone());
        }
    }

    /// Returns the next message received from the active client, if any.
    pub fn try_recv(&self) -> Option<String> {
        let clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        clients.values().find_map(|client| client.inbox.try_recv().ok())
    }

    /// Evicts every client, used when a WebSocket connection takes over.
    pub fn evict_all(&self) {
        self.clients.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Evicts clients that haven't called `/poll` within the stale timeout.
    pub fn reap_stale(&self, now: Instant) {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());
        clients.retain(|_, client| now.duration_since(client.last_poll) < self.stale_timeout);
    }
}

// ----------------------------------------------------------------------------
// Functions
// ----------------------------------------------------------------------------

/// Builds the `/connect`, `/send`, `/poll`, `/disconnect` routes.
///
/// `active` and `evict_ws` let `/connect` hand off the single connection slot
/// away from a WebSocket client; the handoff itself can only happen on the
/// server thread, so `/connect` just raises the `evict_ws` flag and lets
/// [`super::Transport::spawn`]'s loop act on it.
pub fn router(long_poll: Arc<LongPoll>, active: Arc<Mutex<Active>>, evict_ws: Arc<AtomicBool>) -> Stack {
    let connect = {
        let long_poll = Arc::clone(&long_poll);
        let active = Arc::clone(&active);
        let evict_ws = Arc::clone(&evict_ws);
        move |_req: Request, _params: Params| {
            let id = long_poll.connect();
            evict_ws.store(true, Ordering::Release);
            *active.lock().unwrap_or_else(|e| e.into_inner()) = Active::LongPoll;
            Response::from_json(&ConnectReply { client_id: id })
                .unwrap_or_else(|_| Response::from_status(Status::InternalServerError))
                .with_cors()
        }
    };

    let send = {
        let long_poll = Arc::clone(&long_poll);
        move |req: Request, _params: Params| {
            let Some(id) = client_id(&req) else {
                return Response::from_status(Status::BadRequest).with_cors();
            };
            let Ok(body) = String::from_utf8(req.body.into_owned()) else {
                return Response::from_status(Status::BadRequest).with_cors();
            };
            if long_poll.send_to(id, body) {
                Response::from_status(Status::Ok).with_cors()
            } else {
                Response::from_status(Status::NotFound).with_cors()
            }
        }
    };

    let poll = {
        let long_poll = Arc::clone(&long_poll);
        move |req: Request, _params: Params| {
            let Some(id) = client_id(&req) else {
                return Response::from_status(Status::BadRequest).with_cors();
            };
            match long_poll.drain(id) {
                Some(messages) => Response::from_json(&PollReply { messages })
                    .unwrap_or_else(|_| Response::from_status(Status::InternalServerError))
                    .with_cors(),
                None => Response::from_status(Status::NotFound).with_cors(),
            }
        }
    };

    let disconnect = {
        let long_poll = Arc::clone(&long_poll);
        let active = Arc::clone(&active);
        move |req: Request, _params: Params| {
            if let Some(id) = client_id(&req) {
                long_poll.disconnect(id);
            }
            *active.lock().unwrap_or_else(|e| e.into_inner()) = Active::None;
            Response::from_status(Status::Ok).with_cors()
        }
    };

    let options = |_req: Request, _params: Params| Response::from_status(Status::NoContent).with_cors();

    let router = Router::default()
        .post("/connect", connect)
        .post("/send", send)
        .get("/poll", poll)
        .post("/disconnect", disconnect)
        .options("/connect", options)
        .options("/send", options)
        .options("/poll", options)
        .options("/disconnect", options);

    Stack::new().with(router)
}

/// Extracts `clientId` from the request's query string.
fn client_id(req: &Request) -> Option<u64> {
    req.uri.query.get("clientId")?.parse().ok()
}

// ----------------------------------------------------------------------------
// Traits
// ----------------------------------------------------------------------------

/// Attaches permissive CORS headers, since the editor agent issuing these
/// requests runs outside the browser origin model entirely.
trait Cors: Sized {
    fn with_cors(self) -> Self;
}

impl Cors for Response {
    fn with_cors(self) -> Self {
        self.header(Header::AccessControlAllowOrigin, "*")
            .header(Header::AccessControlAllowMethods, "GET, POST, OPTIONS")
            .header(Header::AccessControlAllowHeaders, "Content-Type")
    }
}

// ----------------------------------------------------------------------------
// Wire types
// ----------------------------------------------------------------------------

#[derive(serde::Serialize)]
struct ConnectReply {
    #[serde(rename = "clientId")]
    client_id: u64,
}

#[derive(serde::Serialize)]
struct PollReply {
    messages: Vec<String>,
}
