//! Client-side transfer — liveness probe and chunked transmission.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::UdpSocket;

use courier_core::chunker::chunks;
use courier_core::config::CourierConfig;
use courier_core::control;
use courier_core::envelope::Envelope;

/// Liveness probe failure.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("server did not answer any of {attempts} probes")]
    ServerSilent { attempts: u32 },

    #[error("probe I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Send `ping` until the server answers with the exact `online` literal,
/// waiting `retry_delay` for each reply. Gives up after `max_attempts`
/// unanswered probes.
pub async fn probe(
    socket: &UdpSocket,
    server: SocketAddr,
    max_attempts: u32,
    retry_delay: Duration,
) -> Result<(), ProbeError> {
    let mut buf = [0u8; 64];

    for attempt in 1..=max_attempts {
        socket.send_to(control::PING, server).await?;

        match tokio::time::timeout(retry_delay, socket.recv_from(&mut buf)).await {
            Ok(received) => {
                let (len, from) = received?;
                if from == server && &buf[..len] == control::ONLINE {
                    tracing::info!(attempt, "server is online");
                    return Ok(());
                }
                tracing::debug!(attempt, from = %from, "unexpected probe reply, retrying");
            }
            Err(_) => {
                tracing::debug!(attempt, "no probe reply, retrying");
            }
        }
    }

    Err(ProbeError::ServerSilent {
        attempts: max_attempts,
    })
}

/// Chunk `payload` and transmit it, one envelope per chunk, then signal
/// `end`. The encode ceiling is enforced per chunk; an oversized chunk
/// aborts the transfer rather than truncating on the wire.
pub async fn send_payload(
    socket: &UdpSocket,
    server: SocketAddr,
    payload: &str,
    config: &CourierConfig,
) -> Result<()> {
    let mut sent = 0usize;

    for chunk in chunks(payload, config.transfer.chunk_size) {
        let envelope = Envelope {
            title: config.metadata.title.clone(),
            author: config.metadata.author.clone(),
            body: chunk.to_string(),
        };
        let bytes = envelope
            .encode(config.transfer.message_size_limit)
            .context("chunk does not fit in one message")?;

        socket
            .send_to(&bytes, server)
            .await
            .context("failed to send chunk")?;
        sent += 1;
        tracing::debug!(chunk = sent, bytes = bytes.len(), "chunk sent");
    }

    socket
        .send_to(control::END, server)
        .await
        .context("failed to send end")?;
    tracing::info!(chunks = sent, chars = payload.chars().count(), "payload sent");

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
