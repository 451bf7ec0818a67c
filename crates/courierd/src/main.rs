//! courierd — Courier transfer daemon.
//!
//! Binds a UDP socket and runs the dispatch loop until ctrl-c. Reassembled
//! payloads are written to stdout; everything else goes through tracing.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::UdpSocket;

use courier_core::config::CourierConfig;
use courier_services::{serve, CompletedTransfer, Dispatcher};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = CourierConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = CourierConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        CourierConfig::default()
    });

    let bind_addr = format!("{}:{}", config.network.host, config.network.port);
    let socket = Arc::new(
        UdpSocket::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind {bind_addr}"))?,
    );
    tracing::info!(
        addr = %socket.local_addr()?,
        message_size_limit = config.transfer.message_size_limit,
        "courierd listening"
    );

    let dispatcher = Arc::new(Dispatcher::new(config.transfer.message_size_limit));

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // Completed transfers are printed as they arrive.
    let (completed_tx, mut completed_rx) = tokio::sync::mpsc::channel::<CompletedTransfer>(16);
    let printer_task = tokio::spawn(async move {
        while let Some(transfer) = completed_rx.recv().await {
            println!("{}", transfer.payload);
        }
    });

    let serve_task = tokio::spawn(serve(socket, dispatcher, completed_tx, shutdown_tx.subscribe()));

    // ── Wait for exit ────────────────────────────────────────────────────────
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv() => tracing::info!("shutting down"),
        r = serve_task         => tracing::error!("dispatch loop exited: {:?}", r),
        r = printer_task       => tracing::error!("printer exited: {:?}", r),
    }

    Ok(())
}
