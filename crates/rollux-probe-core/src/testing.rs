//! Scripted collaborators for driving checks without a network

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::endpoint::NodeEndpoint;
use crate::port::PortProber;
use crate::rpc::RpcTransport;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub endpoint: String,
    pub method: String,
    pub params: Vec<Value>,
}

/// Replays queued responses per (endpoint, method). The last queued response
/// repeats once the queue is down to one entry; unscripted calls are absent.
#[derive(Default)]
pub struct ScriptedRpc {
    responses: Mutex<HashMap<(String, String), VecDeque<Option<Value>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(
        self,
        endpoint: &NodeEndpoint,
        method: &str,
        responses: Vec<Option<Value>>,
    ) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((endpoint.to_string(), method.to_string()), responses.into());
        self
    }

    /// Chain head sequence for `eth_blockNumber`
    pub fn heads(self, endpoint: &NodeEndpoint, heads: &[Option<u64>]) -> Self {
        let responses = heads
            .iter()
            .map(|head| head.map(|n| Value::String(format!("{:#x}", n))))
            .collect();
        self.script(endpoint, "eth_blockNumber", responses)
    }

    /// Block hash returned by `eth_getBlockByNumber`
    pub fn block_hash(self, endpoint: &NodeEndpoint, hash: Option<&str>) -> Self {
        let response = hash.map(|h| serde_json::json!({ "hash": h }));
        self.script(endpoint, "eth_getBlockByNumber", vec![response])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &NodeEndpoint, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.endpoint == endpoint.to_string() && c.method == method)
            .collect()
    }
}

#[async_trait]
impl RpcTransport for ScriptedRpc {
    async fn call(
        &self,
        endpoint: &NodeEndpoint,
        method: &str,
        params: Vec<Value>,
    ) -> Option<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            params,
        });

        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&(endpoint.to_string(), method.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front().flatten()
        } else {
            queue.front().cloned().flatten()
        }
    }
}

/// Ports in `open` are reachable, everything else is closed
pub struct StaticPorts {
    open: Vec<u16>,
    probed: Mutex<Vec<u16>>,
}

impl StaticPorts {
    pub fn open(open: &[u16]) -> Self {
        Self {
            open: open.to_vec(),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<u16> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortProber for StaticPorts {
    async fn is_reachable(&self, _endpoint: &NodeEndpoint, port: u16) -> bool {
        self.probed.lock().unwrap().push(port);
        self.open.contains(&port)
    }
}
