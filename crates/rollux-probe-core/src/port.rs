//! TCP port reachability

use std::io::{self, ErrorKind};
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;

use crate::endpoint::NodeEndpoint;
use crate::error::PortError;

pub const DEFAULT_PORT_TIMEOUT: Duration = Duration::from_secs(1);

#[async_trait]
pub trait PortProber: Send + Sync {
    /// True only if a TCP connection to the endpoint's host on `port` succeeds
    async fn is_reachable(&self, endpoint: &NodeEndpoint, port: u16) -> bool;
}

/// Plain TCP connect with a hard deadline covering resolution and connect
#[derive(Debug, Clone)]
pub struct TcpProber {
    deadline: Duration,
}

impl TcpProber {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub async fn probe(&self, host: &str, port: u16) -> Result<(), PortError> {
        timeout(self.deadline, connect(host, port))
            .await
            .map_err(|_| PortError::Timeout(self.deadline))?
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new(DEFAULT_PORT_TIMEOUT)
    }
}

async fn connect(host: &str, port: u16) -> Result<(), PortError> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|e| PortError::Dns {
            host: host.to_string(),
            reason: e.to_string(),
        })?
        .collect();

    if addrs.is_empty() {
        return Err(PortError::Dns {
            host: host.to_string(),
            reason: "no address found".into(),
        });
    }

    connect_any(&addrs).await
}

/// Try each address in resolver order, reporting the last failure.
async fn connect_any(addrs: &[SocketAddr]) -> Result<(), PortError> {
    let mut last = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            // stream is dropped (closed) as soon as the connect is confirmed
            Ok(_stream) => return Ok(()),
            Err(e) => {
                tracing::trace!(%addr, error = %e, "connect attempt failed");
                last = Some(e);
            }
        }
    }

    Err(match last {
        Some(e) if e.kind() == ErrorKind::ConnectionRefused => PortError::Refused,
        Some(e) => PortError::Io(e),
        None => PortError::Io(io::Error::new(
            ErrorKind::AddrNotAvailable,
            "no address to connect to",
        )),
    })
}

#[async_trait]
impl PortProber for TcpProber {
    async fn is_reachable(&self, endpoint: &NodeEndpoint, port: u16) -> bool {
        match self.probe(endpoint.hostname(), port).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(host = endpoint.hostname(), port, error = %e, "port probe failed");
                false
            }
        }
    }
}
