//! Courier integration test harness.
//!
//! Tests run a real dispatch loop on a loopback UDP socket and drive it
//! through the public wire protocol — raw control literals and JSON
//! envelopes — exactly as a remote client would.
//!
//! Each test starts its own server on an ephemeral port; tests share
//! nothing and may run concurrently.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::{broadcast, mpsc};

use courier_core::envelope::{Envelope, MESSAGE_SIZE_LIMIT};
use courier_services::{serve, CompletedTransfer, Dispatcher};

mod liveness;
mod resilience;

// ── Harness ───────────────────────────────────────────────────────────────────

/// A dispatch loop running on an ephemeral loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub dispatcher: Arc<Dispatcher>,
    pub completed: mpsc::Receiver<CompletedTransfer>,
    shutdown: broadcast::Sender<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
    }
}

/// Bind a loopback socket for a server that is not serving yet.
pub async fn bind_server() -> Arc<UdpSocket> {
    Arc::new(UdpSocket::bind("127.0.0.1:0").await.expect("bind server"))
}

/// Start the dispatch loop on an already-bound socket.
pub fn serve_on(socket: Arc<UdpSocket>) -> TestServer {
    let addr = socket.local_addr().expect("server addr");
    let dispatcher = Arc::new(Dispatcher::new(MESSAGE_SIZE_LIMIT));
    let (completed_tx, completed_rx) = mpsc::channel(16);
    let (shutdown_tx, _) = broadcast::channel(1);

    tokio::spawn(serve(
        socket,
        dispatcher.clone(),
        completed_tx,
        shutdown_tx.subscribe(),
    ));

    TestServer {
        addr,
        dispatcher,
        completed: completed_rx,
        shutdown: shutdown_tx,
    }
}

/// Bind and serve in one step.
pub async fn start_server() -> TestServer {
    serve_on(bind_server().await)
}

/// A wire-level client: one loopback socket aimed at a server.
pub struct TestClient {
    pub socket: UdpSocket,
    server: SocketAddr,
}

impl TestClient {
    pub async fn new(server: SocketAddr) -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind client");
        Self { socket, server }
    }

    pub async fn send_raw(&self, datagram: &[u8]) {
        self.socket
            .send_to(datagram, self.server)
            .await
            .expect("send datagram");
    }

    /// Wrap one chunk body in an envelope and send it.
    pub async fn send_chunk(&self, body: &str) {
        let bytes = Envelope {
            title: "A Fairy Song".into(),
            author: "William Shakespeare".into(),
            body: body.into(),
        }
        .encode(MESSAGE_SIZE_LIMIT)
        .expect("encode chunk");
        self.send_raw(&bytes).await;
    }

    pub async fn send_end(&self) {
        self.send_raw(b"end").await;
    }

    /// Receive one reply, or `None` after `timeout`.
    pub async fn recv_reply(&self, timeout: Duration) -> Option<Vec<u8>> {
        let mut buf = [0u8; 512];
        match tokio::time::timeout(timeout, self.socket.recv_from(&mut buf)).await {
            Ok(Ok((len, _))) => Some(buf[..len].to_vec()),
            _ => None,
        }
    }
}

/// Wait for the next completed transfer, panicking if none arrives in time.
pub async fn next_completed(server: &mut TestServer) -> CompletedTransfer {
    tokio::time::timeout(Duration::from_secs(5), server.completed.recv())
        .await
        .expect("timed out waiting for a completed transfer")
        .expect("dispatch loop gone")
}
