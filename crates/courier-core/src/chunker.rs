//! Payload chunking — splits a payload into fixed-size pieces for transmission.

/// Default number of characters carried in one envelope body.
///
/// Sized so that a full chunk plus the envelope's metadata and JSON framing
/// stays under [`crate::envelope::MESSAGE_SIZE_LIMIT`].
pub const CHUNK_SIZE: usize = 100;

/// Split `payload` into chunks of exactly `size` characters, the final chunk
/// carrying the remainder. An empty payload yields no chunks.
///
/// The returned iterator is lazy and borrows the payload; clone it to
/// restart the sequence from the beginning. Chunk boundaries fall on char
/// boundaries, so every chunk is valid UTF-8 on its own.
pub fn chunks(payload: &str, size: usize) -> Chunks<'_> {
    assert!(size > 0, "chunk size must be non-zero");
    Chunks {
        rest: payload,
        size,
    }
}

/// Iterator returned by [`chunks`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    size: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let split = self
            .rest
            .char_indices()
            .nth(self.size)
            .map(|(at, _)| at)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(split);
        self.rest = rest;
        Some(chunk)
    }
}

impl std::iter::FusedIterator for Chunks<'_> {}

// ── Tests ─────────────────────────────────────────────────────────────────────
