//! Check aggregation
//!
//! [`Prober::run_checks`] runs the port, hash and progression checks in
//! sequence against one target and folds them into a [`CheckReport`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::clock::{Clock, TokioClock};
use crate::consistency::{check_consistency, MissingHashPolicy};
use crate::endpoint::NodeEndpoint;
use crate::error::ProbeError;
use crate::port::{PortProber, TcpProber, DEFAULT_PORT_TIMEOUT};
use crate::progression::{check_progression, DEFAULT_POLL_INTERVAL};
use crate::report::{CheckReport, PortCheckResult};
use crate::reporter::Reporter;
use crate::rpc::{block_number, HttpRpcClient, RpcTransport};

pub const DEFAULT_REFERENCE_URL: &str = "https://rpc.rollux.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ports checked by the one-shot command
pub const CLI_PORTS: [u16; 3] = [30303, 9003, 30304];
/// Ports checked by `/api/check`
pub const SERVICE_PORTS: [u16; 5] = [30303, 9003, 30304, 8369, 18369];

/// Check parameters
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Trusted node used as source of truth
    pub reference: NodeEndpoint,
    /// Window for the target's head to advance
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Connect deadline per port
    pub port_timeout: Duration,
    /// Per-call RPC timeout; `None` keeps the HTTP client default
    pub rpc_timeout: Option<Duration>,
    pub ports: Vec<u16>,
    pub missing_hash: MissingHashPolicy,
}

impl ProbeConfig {
    pub fn new(reference: NodeEndpoint, ports: &[u16]) -> Self {
        Self {
            reference,
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            port_timeout: DEFAULT_PORT_TIMEOUT,
            rpc_timeout: None,
            ports: ports.to_vec(),
            missing_hash: MissingHashPolicy::default(),
        }
    }

    pub fn cli_defaults() -> Self {
        Self::new(default_reference(), &CLI_PORTS)
    }

    pub fn service_defaults() -> Self {
        Self::new(default_reference(), &SERVICE_PORTS)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::cli_defaults()
    }
}

fn default_reference() -> NodeEndpoint {
    NodeEndpoint::parse(DEFAULT_REFERENCE_URL).expect("default reference URL is valid")
}

/// Runs checks with injected network, time and reporting collaborators
#[derive(Clone)]
pub struct Prober {
    rpc: Arc<dyn RpcTransport>,
    ports: Arc<dyn PortProber>,
    clock: Arc<dyn Clock>,
    reporter: Arc<dyn Reporter>,
}

impl Prober {
    pub fn new(
        rpc: Arc<dyn RpcTransport>,
        ports: Arc<dyn PortProber>,
        clock: Arc<dyn Clock>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            rpc,
            ports,
            clock,
            reporter,
        }
    }

    /// HTTP JSON-RPC, real TCP probes and the tokio clock
    pub fn http(config: &ProbeConfig, reporter: Arc<dyn Reporter>) -> Result<Self, ProbeError> {
        let rpc = match config.rpc_timeout {
            Some(timeout) => HttpRpcClient::with_timeout(timeout)?,
            None => HttpRpcClient::new(),
        };
        Ok(Self::new(
            Arc::new(rpc),
            Arc::new(TcpProber::new(config.port_timeout)),
            Arc::new(TokioClock),
            reporter,
        ))
    }

    pub async fn run_checks(&self, target: &NodeEndpoint, config: &ProbeConfig) -> CheckReport {
        let started_at = Utc::now();
        tracing::info!(node = %target, reference = %config.reference, "starting checks");

        let mut port_status = PortCheckResult::new();
        for &port in &config.ports {
            let open = self.ports.is_reachable(target, port).await;
            self.reporter.port_status(port, open);
            port_status.insert(port, open);
        }

        let report = match block_number(&*self.rpc, &config.reference).await {
            Some(head) => {
                tracing::debug!(head, "reference head");
                let consistency = check_consistency(
                    &*self.rpc,
                    &config.reference,
                    target,
                    head,
                    config.missing_hash,
                )
                .await;
                let progressed = check_progression(
                    &*self.rpc,
                    &*self.clock,
                    target,
                    config.timeout,
                    config.poll_interval,
                )
                .await;
                CheckReport::new(port_status, Some(&consistency), progressed, started_at)
            }
            None => {
                self.reporter.reference_unavailable(&config.reference);
                CheckReport::new(port_status, None, false, started_at)
            }
        };

        self.reporter.finished(&report);
        report
    }
}
