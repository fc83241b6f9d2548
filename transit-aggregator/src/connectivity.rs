//! Network reachability checks run before each cycle.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;

/// Answers whether the network is reachable right now.
pub trait ConnectivityProbe {
    async fn is_network_available(&self) -> bool;
}

/// Probe that dials a TCP address and reports whether it connected in time.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

impl ConnectivityProbe for TcpProbe {
    async fn is_network_available(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(addr = %self.addr, error = %e, "connectivity probe failed");
                false
            }
            Err(_) => {
                debug!(addr = %self.addr, "connectivity probe timed out");
                false
            }
        }
    }
}

/// Probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub bool);

impl ConnectivityProbe for StaticProbe {
    async fn is_network_available(&self) -> bool {
        self.0
    }
}

/// Either probe, chosen at startup.
#[derive(Debug, Clone)]
pub enum AnyProbe {
    Tcp(TcpProbe),
    Static(StaticProbe),
}

impl ConnectivityProbe for AnyProbe {
    async fn is_network_available(&self) -> bool {
        match self {
            AnyProbe::Tcp(p) => p.is_network_available().await,
            AnyProbe::Static(p) => p.is_network_available().await,
        }
    }
}
