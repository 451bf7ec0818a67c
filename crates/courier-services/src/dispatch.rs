//! Server dispatch — classifies incoming datagrams and applies them to the
//! session store.
//!
//! [`Dispatcher::handle`] is the socket-free state transition; [`serve`] is
//! the receive loop around it. One datagram is fully processed before the
//! next is received, so no per-origin operation can stall another origin.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::{broadcast, mpsc};

use courier_core::control::{self, Frame};
use courier_core::envelope::{Envelope, EnvelopeError};

use crate::session::SessionStore;

/// Routes datagrams to the session store. Owns all mutable server state.
#[derive(Debug)]
pub struct Dispatcher {
    sessions: SessionStore,
    message_size_limit: usize,
}

/// What a successfully handled datagram did.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A probe — the caller answers [`control::ONLINE`] to the origin.
    Online,
    /// A chunk was appended; `chunks` is the origin's accumulated count.
    Appended { chunks: usize },
    /// The origin ended its transfer; `payload` is the reassembled content,
    /// joined in arrival order. The session is gone.
    Completed { payload: String },
}

/// Per-message failures. None of these terminate the dispatch loop or touch
/// any other origin's session.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error("end from {origin} with no open session")]
    UnknownSession { origin: SocketAddr },
}

impl Dispatcher {
    pub fn new(message_size_limit: usize) -> Self {
        Self {
            sessions: SessionStore::new(),
            message_size_limit,
        }
    }

    /// The session store, for inspection by callers and tests.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Apply one datagram from `origin`.
    ///
    /// Control literals are matched on raw content first; everything else
    /// must decode as an [`Envelope`]. A decode failure drops the message
    /// and leaves the origin's session exactly as it was.
    pub fn handle(&self, origin: SocketAddr, datagram: &[u8]) -> Result<Outcome, DispatchError> {
        match control::classify(datagram) {
            Frame::Ping => Ok(Outcome::Online),

            Frame::End => self
                .sessions
                .finalize(origin)
                .map(|payload| Outcome::Completed { payload })
                .ok_or(DispatchError::UnknownSession { origin }),

            Frame::Data(raw) => {
                let envelope = Envelope::decode(raw)?;
                let chunks = self.sessions.append(origin, envelope.body);
                Ok(Outcome::Appended { chunks })
            }
        }
    }
}

/// A reassembled payload, handed to whoever consumes the completed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTransfer {
    pub origin: SocketAddr,
    pub payload: String,
}

/// The dispatch loop: receive, classify, apply, repeat.
///
/// Completed transfers go out on `completed_tx`; the caller decides what
/// emission means (the daemon prints them). Exits on shutdown or when the
/// socket itself fails; a bad message from one origin is logged and skipped.
pub async fn serve(
    socket: Arc<UdpSocket>,
    dispatcher: Arc<Dispatcher>,
    completed_tx: mpsc::Sender<CompletedTransfer>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    // Anything past the message size limit would be fragmented or dropped
    // by the transport; recv_from truncates the rest.
    let mut buf = vec![0u8; dispatcher.message_size_limit];

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("dispatch loop shutting down");
                return Ok(());
            }

            received = socket.recv_from(&mut buf) => {
                let (len, origin) = received.context("recv_from failed")?;
                let datagram = Bytes::copy_from_slice(&buf[..len]);

                match dispatcher.handle(origin, &datagram) {
                    Ok(Outcome::Online) => {
                        tracing::debug!(origin = %origin, "probe answered");
                        if let Err(e) = socket.send_to(control::ONLINE, origin).await {
                            tracing::warn!(origin = %origin, error = %e, "failed to answer probe");
                        }
                    }
                    Ok(Outcome::Appended { chunks }) => {
                        tracing::debug!(origin = %origin, chunks, "chunk appended");
                    }
                    Ok(Outcome::Completed { payload }) => {
                        tracing::info!(
                            origin = %origin,
                            bytes = payload.len(),
                            open_sessions = dispatcher.sessions().len(),
                            "transfer complete"
                        );
                        if completed_tx
                            .send(CompletedTransfer { origin, payload })
                            .await
                            .is_err()
                        {
                            bail!("completed receiver dropped, terminating dispatch loop");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(origin = %origin, error = %e, "message dropped");
                    }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
