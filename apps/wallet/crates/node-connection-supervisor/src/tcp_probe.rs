//! A connector that checks the node is reachable over TCP.
//!
//! It does not speak the node's API; it resolves the address and opens a
//! socket, reporting each phase. Anything that goes wrong is `Unreachable`.

use async_trait::async_trait;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tracing::debug;
use url::{Host, Url};

use crate::{ConnectionFailure, NodeConnector, StatusReporter};

/// Node used when the configured address is empty.
pub const DEFAULT_NODE: &str = "ws://127.0.0.1:8090";

/// Port assumed for bare `host` addresses without a scheme.
pub const DEFAULT_NODE_PORT: u16 = 8090;

/// Host and port of a node, parsed from a URL or `host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddress {
    pub host: String,
    pub port: u16,
}

impl NodeAddress {
    /// Parse `ws://`, `wss://`, `http://`, `https://` URLs or a bare `host[:port]`.
    pub fn parse(raw: &str) -> Result<Self, ConnectionFailure> {
        let raw = raw.trim();
        let invalid = |reason: String| {
            ConnectionFailure::Unreachable(format!("invalid node address {raw:?}: {reason}"))
        };

        let url = if raw.contains("://") {
            Url::parse(raw)
        } else {
            Url::parse(&format!("tcp://{raw}"))
        }
        .map_err(|e| invalid(e.to_string()))?;

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => return Err(invalid("missing host".to_string())),
        };

        let port = url.port_or_known_default().unwrap_or(DEFAULT_NODE_PORT);
        Ok(Self { host, port })
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Reachability probe used as the boot connection operation.
#[derive(Debug, Clone)]
pub struct TcpProbeConnector {
    default_node: String,
    timeout: Duration,
}

impl TcpProbeConnector {
    pub fn new(timeout: Duration) -> Self {
        Self {
            default_node: DEFAULT_NODE.to_string(),
            timeout,
        }
    }

    /// Use a different node when the requested address is empty.
    pub fn with_default_node(mut self, node: impl Into<String>) -> Self {
        self.default_node = node.into();
        self
    }

    fn timed_out(&self, address: &NodeAddress) -> ConnectionFailure {
        ConnectionFailure::Unreachable(format!(
            "timed out after {}ms connecting to {address}",
            self.timeout.as_millis()
        ))
    }
}

#[async_trait]
impl NodeConnector for TcpProbeConnector {
    async fn connect(&self, server: &str, status: StatusReporter) -> Result<(), ConnectionFailure> {
        let target = if server.trim().is_empty() {
            self.default_node.as_str()
        } else {
            server
        };
        let address = NodeAddress::parse(target)?;
        let deadline = Instant::now() + self.timeout;

        status.report(format!("Resolving {}", address.host));
        let resolved: Vec<SocketAddr> = timeout_at(
            deadline,
            tokio::net::lookup_host((address.host.as_str(), address.port)),
        )
        .await
        .map_err(|_| self.timed_out(&address))?
        .map_err(|e| {
            ConnectionFailure::Unreachable(format!("could not resolve {}: {e}", address.host))
        })?
        .collect();

        if resolved.is_empty() {
            return Err(ConnectionFailure::Unreachable(format!(
                "no addresses found for {}",
                address.host
            )));
        }
        debug!(address = %address, candidates = resolved.len(), "node address resolved");

        status.report(format!("Opening connection to {address}"));
        let stream = timeout_at(deadline, TcpStream::connect(resolved.as_slice()))
            .await
            .map_err(|_| self.timed_out(&address))?
            .map_err(|e| ConnectionFailure::Unreachable(format!("{address}: {e}")))?;

        let peer = stream.peer_addr().ok();
        drop(stream);

        debug!(peer = ?peer, "node accepted connection");
        status.report(format!("Connection to {} established", address.host));
        Ok(())
    }
}
