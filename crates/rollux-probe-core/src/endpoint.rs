//! Node endpoint addressing

use std::fmt;
use std::str::FromStr;

use reqwest::Url;

use crate::error::ProbeError;

/// RPC URL of a node, with the hostname used for TCP probing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEndpoint {
    url: Url,
    hostname: String,
}

impl NodeEndpoint {
    /// Parse an RPC URL.
    ///
    /// A bare `host[:port]` is treated as `https://`. WebSocket schemes are
    /// mapped onto their HTTP counterparts since calls go over HTTP POST.
    pub fn parse(raw: &str) -> Result<Self, ProbeError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ProbeError::InvalidEndpoint("empty URL".into()));
        }

        let normalized = if let Some(rest) = raw.strip_prefix("wss://") {
            format!("https://{}", rest)
        } else if let Some(rest) = raw.strip_prefix("ws://") {
            format!("http://{}", rest)
        } else if raw.contains("://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };

        let url = Url::parse(&normalized)
            .map_err(|e| ProbeError::InvalidEndpoint(format!("{}: {}", raw, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ProbeError::InvalidEndpoint(format!(
                "{}: unsupported scheme {}",
                raw,
                url.scheme()
            )));
        }

        // host_str() keeps the brackets around IPv6 literals
        let hostname = url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string())
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ProbeError::InvalidEndpoint(format!("{}: no host", raw)))?;

        Ok(Self { url, hostname })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Host part of the URL, without scheme, port or path
    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}

impl FromStr for NodeEndpoint {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for NodeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
