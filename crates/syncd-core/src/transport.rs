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

//! The single editor-facing connection.
//!
//! Two interoperable variants share one logical endpoint: a WebSocket upgrade
//! (handled entirely inside [`syncd_serve::server::Server`]) and an HTTP
//! long-poll fallback (`/connect`, `/send`, `/poll`, `/disconnect`, built as
//! ordinary routes on top of the same server). At most one editor connection
//! is active at a time, regardless of variant — a freshly accepted connection
//! of either kind evicts whatever was active before.
//!
//! Both variants, and the single thread that drives them, live behind one
//! [`Transport`] handle. Everything that touches the server or the long-poll
//! client table happens on that thread; [`Transport::send`] and
//! [`Transport::try_recv`] only ever move plain strings across a
//! [`crossbeam::channel`], so callers never need to reason about `mio`.

use crossbeam::channel::{unbounded, Receiver, Sender};
use mio::Waker;
use std::net::ToSocketAddrs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use syncd_serve::handler::Stack;
use syncd_serve::middleware::WebSocketHandshake;
use syncd_serve::server::Server;

use crate::error::{Error, Result};

mod long_poll;

use long_poll::LongPoll;

// ----------------------------------------------------------------------------
// Enums
// ----------------------------------------------------------------------------

/// Which transport variant currently owns the single editor connection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Active {
    /// No editor is connected.
    None,
    /// A WebSocket client is connected.
    WebSocket,
    /// A long-poll client is connected.
    LongPoll,
}

// ----------------------------------------------------------------------------
// Structs
// ----------------------------------------------------------------------------

/// The editor-facing transport endpoint.
pub struct Transport {
    /// Sender for messages broadcast to the WebSocket client, picked up by
    /// [`Server::poll`] and forwarded to whatever is connected.
    outbound: Sender<String>,
    /// Receiver for messages read from the WebSocket client.
    inbound: Receiver<(usize, String)>,
    /// Waker used to nudge the server thread out of its poll wait, both for
    /// outbound broadcasts and for evicting the WebSocket client.
    waker: Arc<Waker>,
    /// Shared state for the long-poll fallback.
    long_poll: Arc<LongPoll>,
    /// Which variant currently owns the connection.
    active: Arc<Mutex<Active>>,
    /// Set by a long-poll `/connect` to ask the server thread to evict the
    /// WebSocket client on its next iteration.
    evict_ws: Arc<AtomicBool>,
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl Transport {
    /// Binds the transport endpoint to `addr` and spawns its event loop.
    ///
    /// `stale_client_timeout` bounds how long a long-poll client may go
    /// without calling `/poll` before it's reaped.
    ///
    /// # Errors
    ///
    /// Returns an error if the address could not be bound.
    pub fn spawn<A>(addr: A, stale_client_timeout: Duration) -> Result<Self>
    where
        A: ToSocketAddrs + Send + 'static,
    {
        let (outbound_tx, outbound_rx) = unbounded::<String>();
        let (inbound_tx, inbound_rx) = unbounded::<(usize, String)>();
        let (ready_tx, ready_rx) = unbounded();

        let long_poll = Arc::new(LongPoll::new(stale_client_timeout));
        let active = Arc::new(Mutex::new(Active::None));
        let evict_ws = Arc::new(AtomicBool::new(false));

        thread::spawn({
            let long_poll = Arc::clone(&long_poll);
            let active = Arc::clone(&active);
            let evict_ws = Arc::clone(&evict_ws);
            move || {
                let stack = Stack::new()
                    .with(WebSocketHandshake::default())
                    .with(long_poll::router(
                        Arc::clone(&long_poll),
                        Arc::clone(&active),
                        Arc::clone(&evict_ws),
                    ));

                let mut server = match Server::builder(stack)
                    .and_then(|builder| builder.bind(addr))
                    .and_then(|builder| builder.inbound(inbound_tx).listen())
                {
                    Ok(server) => server,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(server.waker()));

                loop {
                    match server.poll(Some(&outbound_rx)) {
                        Ok(true) => {}
                        Ok(false) | Err(_) => break,
                    }

                    // A long-poll `/connect` asked us to evict the WebSocket
                    // client, which we can only do from this thread. Drain
                    // this before consulting `has_clients` below, or a stale
                    // WebSocket client not yet closed would make the
                    // re-assertion re-steal `active` back from the long-poll
                    // client that just connected.
                    if evict_ws.swap(false, Ordering::AcqRel) {
                        let _ = server.close_clients();
                    }

                    // A new WebSocket client always wins over a long-poll
                    // client, since `Server` already evicts any previous
                    // WebSocket client on upgrade.
                    if server.has_clients() {
                        *active.lock().expect("invariant") = Active::WebSocket;
                        long_poll.evict_all();
                    }

                    long_poll.reap_stale(Instant::now());
                }
            }
        });

        let waker = ready_rx.recv().map_err(|_| Error::Disconnected)??;
        Ok(Self { outbound: outbound_tx, inbound: inbound_rx, waker, long_poll, active, evict_ws })
    }

    /// Sends a message to whichever editor connection is currently active.
    ///
    /// Silently drops the message if no editor is connected — callers that
    /// care should check [`Transport::is_connected`] first.
    pub fn send(&self, message: impl Into<String>) -> Result {
        let message = message.into();
        match *self.active.lock().expect("invariant") {
            Active::None => {}
            Active::LongPoll => self.long_poll.push_active(message),
            Active::WebSocket => {
                self.outbound.send(message).map_err(|_| Error::Disconnected)?;
                self.waker.wake()?;
            }
        }
        Ok(())
    }

    /// Returns the next message received from the editor, if any.
    ///
    /// Does not block. Drains the WebSocket inbound channel first, then the
    /// long-poll inbound queue.
    pub fn try_recv(&self) -> Option<String> {
        if let Ok((_, message)) = self.inbound.try_recv() {
            return Some(message);
        }
        self.long_poll.try_recv()
    }

    /// Returns whether an editor connection, of either kind, is active.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !matches!(*self.active.lock().expect("invariant"), Active::None)
    }

    /// Closes out the currently active connection.
    ///
    /// Used when the editor sends `clientDisconnect` over whichever variant
    /// is currently active.
    pub fn disconnect(&self) {
        let mut active = self.active.lock().expect("invariant");
        match *active {
            Active::None => {}
            Active::WebSocket => {
                self.evict_ws.store(true, Ordering::Release);
                let _ = self.waker.wake();
            }
            Active::LongPoll => self.long_poll.evict_all(),
        }
        *active = Active::None;
    }
}
