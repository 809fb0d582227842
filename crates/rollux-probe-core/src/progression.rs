//! Block progression check
//!
//! Captures the target's head once, then polls at a fixed interval until the
//! head moves past it or the timeout runs out. Elapsed time counts from before
//! the baseline query, so a slow baseline eats into the window.

use std::time::Duration;

use crate::clock::Clock;
use crate::endpoint::NodeEndpoint;
use crate::rpc::{block_number, RpcTransport};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// True iff the head reported by `endpoint` rises above its starting value
/// before `timeout` elapses. An absent baseline fails without polling.
pub async fn check_progression(
    rpc: &dyn RpcTransport,
    clock: &dyn Clock,
    endpoint: &NodeEndpoint,
    timeout: Duration,
    interval: Duration,
) -> bool {
    let start = clock.now();

    let Some(baseline) = block_number(rpc, endpoint).await else {
        tracing::warn!(endpoint = %endpoint, "could not fetch baseline block number");
        return false;
    };
    tracing::debug!(endpoint = %endpoint, baseline, "progression baseline");

    while clock.now().duration_since(start) < timeout {
        if let Some(head) = block_number(rpc, endpoint).await {
            if head > baseline {
                tracing::debug!(
                    endpoint = %endpoint,
                    baseline,
                    head,
                    elapsed_ms = clock.now().duration_since(start).as_millis() as u64,
                    "chain head advanced"
                );
                return true;
            }
        }
        clock.sleep(interval).await;
    }

    tracing::debug!(endpoint = %endpoint, baseline, ?timeout, "chain head did not advance");
    false
}
