//! Report egress.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::info;

use gridwatch_core::{GridwatchError, Result};

/// Destination of serialized reports.
#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    /// Transmit one serialized report.
    async fn send(&self, payload: &[u8]) -> Result<()>;

    /// Human-readable destination for logs.
    fn destination(&self) -> String;
}

/// Connectionless broadcast of each report to a fixed destination.
pub struct UdpBroadcastSink {
    socket: UdpSocket,
    destination: SocketAddr,
}

impl UdpBroadcastSink {
    /// Bind the local endpoint and enable broadcast.
    pub async fn bind(bind_addr: &str, destination: &str) -> Result<Self> {
        let destination = tokio::net::lookup_host(destination)
            .await
            .map_err(|source| GridwatchError::Bind {
                addr: destination.to_string(),
                source,
            })?
            .next()
            .ok_or_else(|| GridwatchError::Bind {
                addr: destination.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    "destination did not resolve",
                ),
            })?;

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|source| GridwatchError::Bind {
                addr: bind_addr.to_string(),
                source,
            })?;
        socket.set_broadcast(true)?;

        info!(
            local = %socket.local_addr()?,
            destination = %destination,
            "report sender bound"
        );
        Ok(Self {
            socket,
            destination,
        })
    }
}

#[async_trait::async_trait]
impl ReportSink for UdpBroadcastSink {
    async fn send(&self, payload: &[u8]) -> Result<()> {
        let sent = self
            .socket
            .send_to(payload, self.destination)
            .await
            .map_err(GridwatchError::Transport)?;
        if sent != payload.len() {
            return Err(GridwatchError::ShortSend {
                sent,
                expected: payload.len(),
            });
        }
        Ok(())
    }

    fn destination(&self) -> String {
        self.destination.to_string()
    }
}
