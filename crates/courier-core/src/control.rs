//! Control vocabulary — out-of-band commands shared with data traffic.
//!
//! Control messages travel over the same channel as data and are told apart
//! by raw content alone, before any envelope decoding is attempted. The
//! literals are matched verbatim: case-sensitive, no surrounding whitespace.

/// Liveness probe, client → server.
pub const PING: &[u8] = b"ping";

/// Probe reply, server → client.
pub const ONLINE: &[u8] = b"online";

/// Transfer complete for this origin, client → server.
pub const END: &[u8] = b"end";

/// A received datagram, classified by raw content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// Liveness probe — answer with [`ONLINE`].
    Ping,
    /// The sending origin's transfer is complete.
    End,
    /// Anything else — must decode as an envelope.
    Data(&'a [u8]),
}

/// Classify a raw datagram.
pub fn classify(datagram: &[u8]) -> Frame<'_> {
    match datagram {
        PING => Frame::Ping,
        END => Frame::End,
        other => Frame::Data(other),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
