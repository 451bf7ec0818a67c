//! courier-core — wire envelope, chunker, control vocabulary, and config.
//! Both the daemon and the client depend on this one.

pub mod chunker;
pub mod config;
pub mod control;
pub mod envelope;

pub use chunker::{chunks, CHUNK_SIZE};
pub use control::Frame;
pub use envelope::{Envelope, EnvelopeError, MESSAGE_SIZE_LIMIT};
