//! Courier wire envelope — the on-wire form of every data message.
//!
//! A data datagram is one JSON-encoded [`Envelope`]. Both sides must agree
//! on this module; changing a field name here is a breaking change.

use serde::{Deserialize, Serialize};

/// Hard ceiling on the serialized size of a single datagram, in bytes.
///
/// IPv4 guarantees reassembly only up to 576 bytes per packet, so any
/// datagram whose IP packet stays under that is delivered without
/// fragmentation. Capping the message at 400 leaves 176 bytes of headroom
/// for the IP and UDP headers.
pub const MESSAGE_SIZE_LIMIT: usize = 400;

/// One data message: inert transfer metadata plus a single chunk body.
///
/// `title` and `author` describe the transfer as a whole and are carried
/// unchanged on every message; the receiver routes on `body` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub title: String,
    pub author: String,
    /// One chunk of the payload, in send order on the wire but with no
    /// delivery-order guarantee from the transport.
    pub body: String,
}

impl Envelope {
    /// Serialize to bytes for transmission.
    ///
    /// Fails with [`EnvelopeError::SizeExceeded`] when the encoded form
    /// would not fit in `limit` bytes. The envelope is never truncated;
    /// an oversized encode is a bug in the caller's chunking.
    pub fn encode(&self, limit: usize) -> Result<Vec<u8>, EnvelopeError> {
        let bytes = serde_json::to_vec(self)?;
        if bytes.len() > limit {
            return Err(EnvelopeError::SizeExceeded {
                size: bytes.len(),
                limit,
            });
        }
        Ok(bytes)
    }

    /// Parse a received datagram into an envelope.
    ///
    /// Anything that is not a JSON object with all three fields is
    /// [`EnvelopeError::Malformed`].
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Errors that can arise when encoding or decoding an envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("encoded envelope is {size} bytes, over the {limit}-byte message limit")]
    SizeExceeded { size: usize, limit: usize },

    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),
}

// ── Tests ─────────────────────────────────────────────────────────────────────
