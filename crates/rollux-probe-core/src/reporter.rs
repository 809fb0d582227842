//! Narrative output for a check run

use tracing::{error, info};

use crate::endpoint::NodeEndpoint;
use crate::report::CheckReport;

/// Receives check events as they happen. All methods default to no-ops.
pub trait Reporter: Send + Sync {
    fn port_status(&self, _port: u16, _open: bool) {}

    fn reference_unavailable(&self, _reference: &NodeEndpoint) {}

    fn finished(&self, _report: &CheckReport) {}
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Logs each verdict through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn port_status(&self, port: u16, open: bool) {
        if open {
            info!("Port {} is open.", port);
        } else {
            error!("Port {} is closed.", port);
        }
    }

    fn reference_unavailable(&self, reference: &NodeEndpoint) {
        error!("Failed to fetch the latest block number from {}", reference);
    }

    fn finished(&self, report: &CheckReport) {
        if report.block_hash_check {
            info!("Hash check passed.");
        } else if let Some(block) = report.block_number {
            error!(
                "Hash check failed, for block {}, given rpc returns {}, correct hash was {}",
                block,
                report.target_hash.as_deref().unwrap_or("none"),
                report.reference_hash.as_deref().unwrap_or("none"),
            );
        } else {
            error!("Hash check failed, reference block number unavailable.");
        }

        if report.block_progression {
            info!("Block progression check passed.");
        } else {
            error!("Block progression check failed.");
        }

        if report.ports_open {
            info!("All specified ports are open. Port check passed.");
        } else {
            error!("One or more specified ports are closed. Port check failed.");
        }

        info!(
            "Checks completed. Hash Check: {}, Block Progression Check: {}, Port Check: {}",
            verdict(report.block_hash_check),
            verdict(report.block_progression),
            verdict(report.ports_open),
        );
    }
}

fn verdict(passed: bool) -> &'static str {
    if passed {
        "Pass"
    } else {
        "Fail"
    }
}
