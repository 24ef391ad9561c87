//! Shared fakes for integration tests: canned probe results and a
//! call-counting vendor lookup.

#![allow(dead_code)]

use async_trait::async_trait;
use netsweep::probe::Probes;
use netsweep::vendor::VendorLookup;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Canned probe results for one host
#[derive(Debug, Clone, Default)]
pub struct FakeHost {
    pub alive: bool,
    pub latency_ms: Option<u32>,
    pub ttl: Option<u32>,
    pub open_ports: Vec<u16>,
    pub mac: Option<String>,
    pub hostname: Option<String>,
}

impl FakeHost {
    pub fn alive() -> Self {
        Self {
            alive: true,
            ..Self::default()
        }
    }
}

/// Probe set answering from a fixed table; unknown addresses are dead.
/// Optionally panics for one address to exercise the error-record path.
#[derive(Default)]
pub struct FakeProbes {
    hosts: HashMap<Ipv4Addr, FakeHost>,
    panic_on: Option<Ipv4Addr>,
}

impl FakeProbes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, addr: [u8; 4], host: FakeHost) -> Self {
        self.hosts.insert(Ipv4Addr::from(addr), host);
        self
    }

    pub fn panicking_on(mut self, addr: [u8; 4]) -> Self {
        self.panic_on = Some(Ipv4Addr::from(addr));
        self
    }

    fn host(&self, addr: Ipv4Addr) -> FakeHost {
        if self.panic_on == Some(addr) {
            panic!("probe blew up for {}", addr);
        }
        self.hosts.get(&addr).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Probes for FakeProbes {
    async fn is_alive(&self, addr: Ipv4Addr) -> bool {
        self.host(addr).alive
    }

    async fn latency_ms(&self, addr: Ipv4Addr) -> Option<u32> {
        self.host(addr).latency_ms
    }

    async fn ttl(&self, addr: Ipv4Addr) -> Option<u32> {
        self.host(addr).ttl
    }

    async fn open_ports(&self, addr: Ipv4Addr, ports: &[u16]) -> Vec<u16> {
        let mut open: Vec<u16> = self
            .host(addr)
            .open_ports
            .iter()
            .copied()
            .filter(|port| ports.contains(port))
            .collect();
        open.sort_unstable();
        open
    }

    async fn mac_address(&self, addr: Ipv4Addr) -> Option<String> {
        self.host(addr).mac
    }

    async fn hostname(&self, addr: Ipv4Addr) -> Option<String> {
        self.host(addr).hostname
    }
}

/// Vendor lookup over a fixed map that counts every invocation
#[derive(Default)]
pub struct CountingVendor {
    vendors: HashMap<String, String>,
    calls: AtomicUsize,
}

impl CountingVendor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vendor(mut self, mac: &str, vendor: &str) -> Self {
        self.vendors.insert(mac.to_string(), vendor.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VendorLookup for CountingVendor {
    async fn lookup(&self, mac: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vendors.get(mac).cloned()
    }
}
