//! Probe layer: independent, timeout-bounded operations against one host
//!
//! Every probe is a single attempt with an explicit deadline; a timeout is
//! a final outcome, never retried. The [`Probes`] trait is the seam the
//! field pipeline runs against, so tests can substitute canned results for
//! the platform facilities.

pub mod hostname;
pub mod neighbor;
pub mod ping;
pub mod port;

use crate::config::ScanConfig;
use async_trait::async_trait;
use std::net::Ipv4Addr;
use std::time::Duration;

pub use ping::detect_os_from_ttl;

/// Per-probe deadlines, taken from the scan configuration
#[derive(Debug, Clone, Copy)]
pub struct ProbeTimeouts {
    pub ping: Duration,
    pub latency: Duration,
    pub port: Duration,
    pub neighbor: Duration,
    pub hostname: Duration,
}

impl From<&ScanConfig> for ProbeTimeouts {
    fn from(config: &ScanConfig) -> Self {
        Self {
            ping: config.ping_timeout(),
            latency: config.latency_timeout(),
            port: config.port_timeout(),
            neighbor: config.arp_timeout(),
            hostname: config.hostname_timeout(),
        }
    }
}

/// Probe operations the field pipeline consumes
#[async_trait]
pub trait Probes: Send + Sync {
    /// One echo probe; true iff the host answered
    async fn is_alive(&self, addr: Ipv4Addr) -> bool;

    /// Round-trip latency in whole milliseconds
    async fn latency_ms(&self, addr: Ipv4Addr) -> Option<u32>;

    /// TTL observed in an echo reply
    async fn ttl(&self, addr: Ipv4Addr) -> Option<u32>;

    /// Subset of `ports` accepting TCP connections, ascending
    async fn open_ports(&self, addr: Ipv4Addr, ports: &[u16]) -> Vec<u16>;

    /// Hardware address from the neighbor table, uppercase colon form
    async fn mac_address(&self, addr: Ipv4Addr) -> Option<String>;

    /// Reverse-DNS name
    async fn hostname(&self, addr: Ipv4Addr) -> Option<String>;
}

/// Production probe set backed by the platform tools and TCP connects
#[derive(Debug, Clone)]
pub struct SystemProbes {
    timeouts: ProbeTimeouts,
    port_concurrency: usize,
}

impl SystemProbes {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            timeouts: ProbeTimeouts::from(config),
            port_concurrency: config.port_concurrency,
        }
    }
}

#[async_trait]
impl Probes for SystemProbes {
    async fn is_alive(&self, addr: Ipv4Addr) -> bool {
        ping::is_alive(addr, self.timeouts.ping).await
    }

    async fn latency_ms(&self, addr: Ipv4Addr) -> Option<u32> {
        ping::latency_ms(addr, self.timeouts.latency)
            .await
            .map(|ms| ms.round() as u32)
    }

    async fn ttl(&self, addr: Ipv4Addr) -> Option<u32> {
        ping::ttl(addr, self.timeouts.ping).await
    }

    async fn open_ports(&self, addr: Ipv4Addr, ports: &[u16]) -> Vec<u16> {
        port::scan(addr, ports, self.timeouts.port, self.port_concurrency).await
    }

    async fn mac_address(&self, addr: Ipv4Addr) -> Option<String> {
        neighbor::resolve(addr, self.timeouts.neighbor).await
    }

    async fn hostname(&self, addr: Ipv4Addr) -> Option<String> {
        hostname::resolve(addr, self.timeouts.hostname).await
    }
}
