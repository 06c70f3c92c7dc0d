//! Inbound telemetry datagram loop.

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::{error, info, trace};

use gridwatch_core::{Event, GridwatchError, Result, TelemetryRecord};

use crate::evaluator::Evaluator;

/// Origin of inbound telemetry datagrams.
#[async_trait::async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Wait for the next datagram and copy it into `buf`.
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    fn local_addr(&self) -> io::Result<SocketAddr>;
}

#[async_trait::async_trait]
impl TelemetrySource for UdpSocket {
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        UdpSocket::local_addr(self)
    }
}

/// Receives telemetry datagrams and evaluates each one in order.
///
/// Evaluation happens inline on the receive loop, so throughput is bounded
/// by evaluation cost and records are processed strictly in arrival order.
pub struct TelemetryReceiver {
    source: Box<dyn TelemetrySource>,
    evaluator: Evaluator,
    max_datagram_bytes: usize,
}

impl TelemetryReceiver {
    pub fn new(
        source: impl TelemetrySource + 'static,
        evaluator: Evaluator,
        max_datagram_bytes: usize,
    ) -> Self {
        Self {
            source: Box::new(source),
            evaluator,
            max_datagram_bytes: max_datagram_bytes.max(1),
        }
    }

    /// Bind the inbound UDP endpoint.
    pub async fn bind(
        addr: &str,
        evaluator: Evaluator,
        max_datagram_bytes: usize,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|source| GridwatchError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        info!(local = %socket.local_addr()?, "telemetry receiver bound");
        Ok(Self::new(socket, evaluator, max_datagram_bytes))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.source.local_addr()?)
    }

    /// Receive and evaluate until the transport fails.
    ///
    /// Waits indefinitely while no telemetry arrives. A transport error is
    /// logged and ends the loop; it is not retried.
    pub async fn run(self) -> Result<()> {
        let mut buf = vec![0u8; self.max_datagram_bytes];
        loop {
            match self.source.recv_from(&mut buf).await {
                Ok((len, peer)) => {
                    trace!(%peer, len, "datagram received");
                    self.handle_datagram(&buf[..len]);
                }
                Err(e) => {
                    error!(error = %e, "telemetry receive failed, stopping ingestion");
                    return Err(GridwatchError::Transport(e));
                }
            }
        }
    }

    /// Decode one payload and evaluate it.
    ///
    /// Undecodable payloads are dropped and yield no events.
    pub fn handle_datagram(&self, payload: &[u8]) -> Vec<Event> {
        match TelemetryRecord::decode(payload) {
            Ok(record) => self.evaluator.evaluate(&record),
            Err(e) => {
                trace!(error = %e, "undecodable datagram dropped");
                Vec::new()
            }
        }
    }
}
