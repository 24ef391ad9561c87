//! Configuration module for the netsweep scanner

use crate::fields::HostStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Ports probed when the user gives no port specification
pub const DEFAULT_PORTS: [u16; 15] = [
    443, 80, 8080, 9443, 8123, 8008, 8888, 8088, 5000, 3000, 22, 21, 3306, 5432, 6379,
];

/// How to handle a CIDR expansion that exceeds the configured limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CidrPolicy {
    /// Refuse the whole expansion; the spec is reported as cancelled
    Abort,
    /// Keep the first `max_cidr_hosts` addresses and drop the rest
    Truncate,
}

impl FromStr for CidrPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(CidrPolicy::Abort),
            "truncate" => Ok(CidrPolicy::Truncate),
            _ => Err(format!("Unknown CIDR policy: {}", s)),
        }
    }
}

/// Main configuration for a scan session.
///
/// Everything the orchestrator, probes and field pipeline need is carried
/// here explicitly; there is no module-level mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Concurrent host workers in the outer pool
    pub workers: usize,

    /// Ports probed per alive host
    pub ports: Vec<u16>,

    /// Reachability probe timeout in milliseconds
    pub ping_timeout_ms: u64,

    /// Latency probe timeout in milliseconds
    pub latency_timeout_ms: u64,

    /// Per-port TCP connect timeout in milliseconds
    pub port_timeout_ms: u64,

    /// Neighbor-table query timeout in milliseconds
    pub arp_timeout_ms: u64,

    /// Reverse-DNS lookup timeout in milliseconds
    pub hostname_timeout_ms: u64,

    /// Concurrent connect attempts inside one host's port scan
    pub port_concurrency: usize,

    /// Skip port scanning entirely
    pub skip_ports: bool,

    /// Skip the vendor lookup, showing its disabled placeholder instead
    pub skip_vendor: bool,

    /// Statuses omitted from the console listing (still counted, still exported)
    pub ignore_statuses: HashSet<HostStatus>,

    /// Largest CIDR expansion accepted without applying `cidr_policy`
    pub max_cidr_hosts: u64,

    /// Policy for expansions beyond `max_cidr_hosts`
    pub cidr_policy: CidrPolicy,

    /// Local MAC-prefix vendor database; the online lookup is used when unset
    pub vendor_db: Option<PathBuf>,

    /// Online vendor lookup timeout in milliseconds
    pub vendor_api_timeout_ms: u64,

    /// Port baked into generated wake-link URLs
    pub wol_link_port: u16,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            ports: DEFAULT_PORTS.to_vec(),
            ping_timeout_ms: 1000,
            latency_timeout_ms: 2000,
            port_timeout_ms: 600,
            arp_timeout_ms: 2000,
            hostname_timeout_ms: 1000,
            port_concurrency: 100,
            skip_ports: false,
            skip_vendor: false,
            ignore_statuses: HashSet::new(),
            max_cidr_hosts: 10_000,
            cidr_policy: CidrPolicy::Abort,
            vendor_db: None,
            vendor_api_timeout_ms: 3000,
            wol_link_port: 2,
        }
    }
}

fn default_workers() -> usize {
    std::cmp::min(200, num_cpus::get() * 25)
}

impl ScanConfig {
    /// Set the number of host workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the ports to probe
    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    /// Set the per-port connect timeout
    pub fn with_port_timeout(mut self, ms: u64) -> Self {
        self.port_timeout_ms = ms;
        self
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn latency_timeout(&self) -> Duration {
        Duration::from_millis(self.latency_timeout_ms)
    }

    pub fn port_timeout(&self) -> Duration {
        Duration::from_millis(self.port_timeout_ms)
    }

    pub fn arp_timeout(&self) -> Duration {
        Duration::from_millis(self.arp_timeout_ms)
    }

    pub fn hostname_timeout(&self) -> Duration {
        Duration::from_millis(self.hostname_timeout_ms)
    }

    pub fn vendor_api_timeout(&self) -> Duration {
        Duration::from_millis(self.vendor_api_timeout_ms)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: ScanConfig = toml::from_str(&content)
            .map_err(|e| crate::ScanError::ConfigError(format!("Failed to parse TOML: {}", e)))?;
        Ok(config)
    }

    /// Load `~/.netsweep.toml` if present, falling back to defaults
    pub fn load_default_config() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let config_path = home_dir.join(".netsweep.toml");

        if config_path.exists() {
            match Self::from_toml_file(&config_path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    return config;
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", config_path.display(), e);
                }
            }
        }

        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.workers == 0 {
            return Err(crate::ScanError::ConfigError(
                "Worker count must be greater than 0".to_string(),
            ));
        }

        if self.port_concurrency == 0 {
            return Err(crate::ScanError::ConfigError(
                "Port concurrency must be greater than 0".to_string(),
            ));
        }

        if !self.skip_ports && self.ports.is_empty() {
            return Err(crate::ScanError::ConfigError(
                "No ports specified".to_string(),
            ));
        }

        Ok(())
    }
}
