//! Check results
//!
//! [`CheckReport`] is the full record of one run. [`CheckResponse`] is the
//! reduced shape served by `/api/check`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consistency::ConsistencyOutcome;

/// Port number -> reachable
pub type PortCheckResult = BTreeMap<u16, bool>;

/// A block number and the hash one endpoint reported for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHandle {
    pub number: u64,
    pub hash: Option<String>,
}

/// Result of a full check run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    /// Per-port reachability
    pub port_status: PortCheckResult,
    /// Every checked port was reachable
    pub ports_open: bool,
    /// Target and reference agree on the block hash
    pub block_hash_check: bool,
    /// Target head advanced within the timeout
    pub block_progression: bool,
    /// All three checks passed
    pub passed: bool,
    /// Reference head used for the hash comparison, if it could be fetched
    pub block_number: Option<u64>,
    pub reference_hash: Option<String>,
    pub target_hash: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl CheckReport {
    pub fn new(
        port_status: PortCheckResult,
        consistency: Option<&ConsistencyOutcome>,
        block_progression: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        let ports_open = port_status.values().all(|open| *open);
        let block_hash_check = consistency.map(|c| c.consistent).unwrap_or(false);

        Self {
            port_status,
            ports_open,
            block_hash_check,
            block_progression,
            passed: ports_open && block_hash_check && block_progression,
            block_number: consistency.map(|c| c.reference.number),
            reference_hash: consistency.and_then(|c| c.reference.hash.clone()),
            target_hash: consistency.and_then(|c| c.target.hash.clone()),
            started_at,
            completed_at: Utc::now(),
        }
    }
}

/// `/api/check` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub port_status: PortCheckResult,
    pub block_hash_check: bool,
    pub block_progression: bool,
}

impl From<&CheckReport> for CheckResponse {
    fn from(report: &CheckReport) -> Self {
        Self {
            port_status: report.port_status.clone(),
            block_hash_check: report.block_hash_check,
            block_progression: report.block_progression,
        }
    }
}
