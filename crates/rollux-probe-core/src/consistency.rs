//! Cross-node block hash comparison

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::endpoint::NodeEndpoint;
use crate::report::BlockHandle;
use crate::rpc::{block_by_number, RpcTransport};

/// Verdict when neither node returned a hash for the block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingHashPolicy {
    /// Two missing hashes are not evidence of agreement
    #[default]
    Fail,
    /// Treat two missing hashes as equal
    Pass,
}

impl FromStr for MissingHashPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "pass" => Ok(Self::Pass),
            other => Err(format!("unknown missing-hash policy '{}', expected fail or pass", other)),
        }
    }
}

impl fmt::Display for MissingHashPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingHashPolicy::Fail => write!(f, "fail"),
            MissingHashPolicy::Pass => write!(f, "pass"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyOutcome {
    pub reference: BlockHandle,
    pub target: BlockHandle,
    pub consistent: bool,
}

pub fn hashes_match(
    reference: Option<&str>,
    target: Option<&str>,
    policy: MissingHashPolicy,
) -> bool {
    match (reference, target) {
        (Some(r), Some(t)) => r == t,
        (None, None) => policy == MissingHashPolicy::Pass,
        _ => false,
    }
}

/// Fetch block `block_number` from both nodes and compare hashes
pub async fn check_consistency(
    rpc: &dyn RpcTransport,
    reference: &NodeEndpoint,
    target: &NodeEndpoint,
    block_number: u64,
    policy: MissingHashPolicy,
) -> ConsistencyOutcome {
    let reference_block = block_by_number(rpc, reference, block_number).await;
    let target_block = block_by_number(rpc, target, block_number).await;

    let consistent = hashes_match(
        reference_block.hash.as_deref(),
        target_block.hash.as_deref(),
        policy,
    );

    ConsistencyOutcome {
        reference: reference_block,
        target: target_block,
        consistent,
    }
}
