//! courier-send — command-line client for the Courier daemon.
//!
//! Probes the server until it answers, then streams the payload as chunked
//! envelopes followed by `end`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::UdpSocket;

use courier_core::config::CourierConfig;

mod transfer;

const DEFAULT_HOST: &str = "127.0.0.1";

fn print_usage(default_port: u16) {
    println!("Usage: courier-send [options]");
    println!();
    println!("Reads the payload from --file, or stdin when omitted, and");
    println!("transfers it to the Courier daemon.");
    println!();
    println!("Options:");
    println!("  --host <host>   Server host (default: {DEFAULT_HOST})");
    println!("  --port <port>   Server port (default: {default_port})");
    println!("  --file <path>   Payload file (default: read stdin)");
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = CourierConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        CourierConfig::default()
    });

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut host = DEFAULT_HOST.to_string();
    let mut port = config.network.port;
    let mut file: Option<PathBuf> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                i += 1;
                host = args.get(i).context("--host requires a value")?.clone();
            }
            "--port" => {
                i += 1;
                port = args
                    .get(i)
                    .context("--port requires a value")?
                    .parse()
                    .context("--port must be a number")?;
            }
            "--file" => {
                i += 1;
                file = Some(PathBuf::from(
                    args.get(i).context("--file requires a value")?,
                ));
            }
            "help" | "--help" | "-h" => {
                print_usage(config.network.port);
                return Ok(());
            }
            other => {
                eprintln!("Unknown option: {other}");
                eprintln!();
                print_usage(config.network.port);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let payload = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload from {}", path.display()))?,
        None => {
            use std::io::Read;
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read payload from stdin")?;
            text
        }
    };

    let server: SocketAddr = tokio::net::lookup_host((host.as_str(), port))
        .await
        .with_context(|| format!("failed to resolve {host}:{port}"))?
        .next()
        .with_context(|| format!("no address for {host}"))?;

    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .context("failed to bind client socket")?;

    tracing::info!(server = %server, "checking if server is online");
    transfer::probe(
        &socket,
        server,
        config.probe.max_attempts,
        Duration::from_millis(config.probe.retry_delay_ms),
    )
    .await
    .context("server never came online")?;

    transfer::send_payload(&socket, server, &payload, &config).await?;

    Ok(())
}
