//! Session store — per-origin accumulation state for in-flight transfers.

use std::net::SocketAddr;
use std::time::Instant;

use dashmap::DashMap;

/// Accumulation state for one origin.
///
/// Chunk bodies are kept in arrival order. The transport may reorder
/// datagrams, so arrival order is not necessarily send order — reassembly
/// reflects what the wire delivered.
#[derive(Debug)]
pub struct SessionState {
    chunks: Vec<String>,
    /// When the first chunk from this origin arrived.
    pub started_at: Instant,
}

impl SessionState {
    fn new() -> Self {
        Self {
            chunks: Vec::new(),
            started_at: Instant::now(),
        }
    }
}

/// The session store — one entry per origin currently sending data.
///
/// Owned by the dispatcher; created at server start and dropped with it.
/// Entries are created lazily on the first data message from an origin and
/// never overwritten mid-transfer. Different origins' state is independent;
/// the map locks per key, so no cross-origin serialization happens on
/// append.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<SocketAddr, SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk body to `origin`'s session, creating the session if
    /// this is the origin's first data message. Returns the accumulated
    /// chunk count.
    pub fn append(&self, origin: SocketAddr, body: String) -> usize {
        let mut entry = self
            .sessions
            .entry(origin)
            .or_insert_with(SessionState::new);
        entry.chunks.push(body);
        entry.chunks.len()
    }

    /// Tear down `origin`'s session and return its chunk bodies joined in
    /// arrival order. `None` when the origin has no session — either it
    /// never sent data or it already ended the transfer.
    ///
    /// Removing the entry here means a second `end` is reported as unknown
    /// instead of re-emitting stale data, and a restarted transfer from the
    /// same origin starts fresh.
    pub fn finalize(&self, origin: SocketAddr) -> Option<String> {
        self.sessions.remove(&origin).map(|(_, state)| {
            tracing::debug!(
                origin = %origin,
                chunks = state.chunks.len(),
                age_ms = state.started_at.elapsed().as_millis() as u64,
                "session finalized"
            );
            state.chunks.concat()
        })
    }

    /// Drop `origin`'s session without emitting anything. Returns whether
    /// a session existed.
    pub fn clear(&self, origin: SocketAddr) -> bool {
        self.sessions.remove(&origin).is_some()
    }

    /// Number of origins with an in-flight transfer.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
