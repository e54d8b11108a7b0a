//! Alpaca UDP discovery responder.
//!
//! Clients broadcast the ASCII probe `alpacadiscovery1` to UDP port 32227.
//! Every Alpaca server that hears it answers the sender directly with
//! `{"AlpacaPort": <http port>}`. With `allow_remote` off, only probes from
//! loopback addresses are answered.

use std::net::SocketAddr;

use serde::Serialize;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The version 1 discovery probe.
pub const DISCOVERY_PROBE: &[u8] = b"alpacadiscovery1";

/// Probes longer than this are not Alpaca discovery messages.
const MAX_PROBE_LEN: usize = 64;

/// Errors raised by the discovery responder.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// The UDP socket could not be bound.
    #[error("failed to bind discovery socket on {addr}: {source}")]
    Bind {
        /// The requested address.
        addr: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Receiving or replying failed.
    #[error("discovery socket error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
struct DiscoveryReply {
    #[serde(rename = "AlpacaPort")]
    alpaca_port: u16,
}

/// The reply for one datagram, or `None` if it should be ignored.
pub fn respond_to(datagram: &[u8], source: SocketAddr, allow_remote: bool, alpaca_port: u16) -> Option<Vec<u8>> {
    if !datagram.starts_with(DISCOVERY_PROBE) {
        return None;
    }
    if !allow_remote && !source.ip().is_loopback() {
        debug!(%source, "ignoring remote discovery probe");
        return None;
    }
    serde_json::to_vec(&DiscoveryReply { alpaca_port }).ok()
}

/// Bind the discovery socket.
pub async fn bind_discovery(host: &str, port: u16) -> Result<UdpSocket, DiscoveryError> {
    let addr = format!("{host}:{port}");
    let socket = UdpSocket::bind(&addr)
        .await
        .map_err(|source| DiscoveryError::Bind { addr, source })?;
    socket.set_broadcast(true)?;
    Ok(socket)
}

/// Answer probes on `socket` forever.
///
/// A failed reply is logged and skipped; only a receive error ends the loop.
pub async fn run_discovery(socket: UdpSocket, alpaca_port: u16, allow_remote: bool) -> Result<(), DiscoveryError> {
    let mut buf = [0_u8; MAX_PROBE_LEN];
    loop {
        let (len, source) = socket.recv_from(&mut buf).await?;
        let Some(datagram) = buf.get(..len) else {
            continue;
        };
        let Some(reply) = respond_to(datagram, source, allow_remote, alpaca_port) else {
            continue;
        };
        match socket.send_to(&reply, source).await {
            Ok(_) => debug!(%source, alpaca_port, "answered discovery probe"),
            Err(error) => warn!(%source, %error, "failed to answer discovery probe"),
        }
    }
}

/// Run the responder on a background task.
pub fn spawn_discovery(socket: UdpSocket, alpaca_port: u16, allow_remote: bool) -> JoinHandle<()> {
    if let Ok(addr) = socket.local_addr() {
        info!(%addr, alpaca_port, allow_remote, "discovery responder listening");
    }
    tokio::spawn(async move {
        if let Err(error) = run_discovery(socket, alpaca_port, allow_remote).await {
            tracing::error!(%error, "discovery responder exited with error");
        }
    })
}
