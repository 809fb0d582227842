//! Rollux Node Probe - Check Logic
//!
//! Verifies that an RPC node is healthy by comparing it against a trusted
//! reference node.
//!
//! ## Architecture
//!
//! Three independent checks are composed into one [`CheckReport`]:
//!
//! - Ports: TCP reachability of the node's peer-networking ports
//! - Consistency: block hash at the reference head matches the reference node
//! - Progression: the node's chain head advances within a time window
//!
//! Network I/O sits behind the [`RpcTransport`] and [`PortProber`] traits and
//! time behind [`Clock`], so [`Prober`] can be driven without a network.

pub mod checks;
pub mod clock;
pub mod consistency;
pub mod endpoint;
pub mod error;
pub mod port;
pub mod progression;
pub mod report;
pub mod reporter;
pub mod rpc;

#[cfg(test)]
mod testing;

pub use checks::{
    ProbeConfig, Prober, CLI_PORTS, DEFAULT_REFERENCE_URL, DEFAULT_TIMEOUT, SERVICE_PORTS,
};
pub use clock::{Clock, TokioClock};
// test support, also used by the binary's router tests
pub use clock::ManualClock;
pub use consistency::{check_consistency, ConsistencyOutcome, MissingHashPolicy};
pub use endpoint::NodeEndpoint;
pub use error::{PortError, ProbeError, RpcError};
pub use port::{PortProber, TcpProber, DEFAULT_PORT_TIMEOUT};
pub use progression::{check_progression, DEFAULT_POLL_INTERVAL};
pub use report::{BlockHandle, CheckReport, CheckResponse, PortCheckResult};
pub use reporter::{NullReporter, Reporter, TracingReporter};
pub use rpc::{HttpRpcClient, RpcTransport};
