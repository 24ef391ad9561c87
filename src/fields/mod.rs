//! Per-host field pipeline
//!
//! An ordered table of named fields drives what gets collected for every
//! host. Evaluation is a fixed two-phase affair: independent fields fetch
//! through the probe layer first, then the dependent Vendor and WOL fields
//! read the finalized MAC value out of the same record. Any single field
//! failing degrades to that field's placeholder; a record is classified
//! exactly once, after both passes.

use crate::config::ScanConfig;
use crate::probe::{detect_os_from_ttl, Probes};
use crate::vendor::VendorLookup;
use crate::wol;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;

/// Value shown for anything a probe could not determine
pub const PLACEHOLDER: &str = "[N/D]";

/// Value filling every field of a host whose task failed outright
pub const ERROR_VALUE: &str = "[err]";

/// Value shown when the vendor lookup is switched off
pub const DISABLED_VALUE: &str = "[Disabled]";

/// Hostname value for a target that never was a valid address
pub const INVALID_IP_VALUE: &str = "[invalid ip]";

/// The computation a field performs; dispatched by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Hostname,
    OpenPorts,
    PingMs,
    Mac,
    Vendor,
    Os,
    WakeLink,
}

impl FieldKind {
    /// Dependent fields compute in pass 2 from already-finalized values
    fn is_dependent(self) -> bool {
        matches!(self, FieldKind::Vendor | FieldKind::WakeLink)
    }
}

/// One column of the scan: what it is called, how wide it renders, and
/// when it applies.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub key: &'static str,
    pub width: usize,
    pub kind: FieldKind,
    pub placeholder: &'static str,
    pub requires_alive: bool,
    pub requires_port_scan: bool,
}

/// The fixed, ordered field table
#[derive(Debug, Clone)]
pub struct FieldTable {
    fields: Vec<FieldSpec>,
}

impl Default for FieldTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl FieldTable {
    /// The standard column set, in report order
    pub fn standard() -> Self {
        Self {
            fields: vec![
                FieldSpec {
                    name: "Hostname",
                    key: "hostname",
                    width: 15,
                    kind: FieldKind::Hostname,
                    placeholder: PLACEHOLDER,
                    requires_alive: true,
                    requires_port_scan: false,
                },
                FieldSpec {
                    name: "Open ports",
                    key: "open_ports",
                    width: 12,
                    kind: FieldKind::OpenPorts,
                    placeholder: PLACEHOLDER,
                    requires_alive: true,
                    requires_port_scan: true,
                },
                FieldSpec {
                    name: "Ping",
                    key: "ping_ms",
                    width: 7,
                    kind: FieldKind::PingMs,
                    placeholder: PLACEHOLDER,
                    requires_alive: true,
                    requires_port_scan: false,
                },
                FieldSpec {
                    name: "MAC",
                    key: "mac",
                    width: 17,
                    kind: FieldKind::Mac,
                    placeholder: PLACEHOLDER,
                    requires_alive: true,
                    requires_port_scan: false,
                },
                FieldSpec {
                    name: "Vendor",
                    key: "vendor",
                    width: 20,
                    kind: FieldKind::Vendor,
                    placeholder: PLACEHOLDER,
                    requires_alive: true,
                    requires_port_scan: false,
                },
                FieldSpec {
                    name: "OS",
                    key: "os",
                    width: 16,
                    kind: FieldKind::Os,
                    placeholder: PLACEHOLDER,
                    requires_alive: true,
                    requires_port_scan: false,
                },
                FieldSpec {
                    name: "WOL",
                    key: "wol",
                    width: 38,
                    kind: FieldKind::WakeLink,
                    placeholder: PLACEHOLDER,
                    requires_alive: true,
                    requires_port_scan: false,
                },
            ],
        }
    }

    /// Fields applying to this session, in table order
    pub fn active_fields(&self, skip_ports: bool) -> Vec<&FieldSpec> {
        self.fields
            .iter()
            .filter(|field| !(skip_ports && field.requires_port_scan))
            .collect()
    }

    /// Export header: the base columns plus every active field key
    pub fn csv_header(&self, skip_ports: bool) -> Vec<String> {
        let mut header = vec!["ip".to_string(), "status".to_string()];
        header.extend(
            self.active_fields(skip_ports)
                .iter()
                .map(|field| field.key.to_string()),
        );
        header
    }
}

/// Classification of a scanned target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    /// The target never was a valid address; probed by nothing
    Invalid,
    /// No echo reply
    Dead,
    /// Echo reply, no open port found
    Alive,
    /// Echo reply and at least one open port
    Host,
    /// The host task itself failed; counted as dead
    Error,
}

impl HostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostStatus::Invalid => "invalid",
            HostStatus::Dead => "dead",
            HostStatus::Alive => "alive",
            HostStatus::Host => "host",
            HostStatus::Error => "error",
        }
    }

    /// Status used for console filtering and the summary glyph; error
    /// records present as dead.
    pub fn presentation(&self) -> HostStatus {
        match self {
            HostStatus::Error => HostStatus::Dead,
            other => *other,
        }
    }
}

impl FromStr for HostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "invalid" => Ok(HostStatus::Invalid),
            "dead" => Ok(HostStatus::Dead),
            "alive" => Ok(HostStatus::Alive),
            "host" => Ok(HostStatus::Host),
            "error" => Ok(HostStatus::Error),
            _ => Err(format!("Unknown host status: {}", s)),
        }
    }
}

/// Finalized per-host result: one value per active field key
#[derive(Debug, Clone)]
pub struct HostRecord {
    pub ip: String,
    pub status: HostStatus,
    values: HashMap<&'static str, String>,
}

impl HostRecord {
    fn new(ip: String) -> Self {
        Self {
            ip,
            status: HostStatus::Dead,
            values: HashMap::new(),
        }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn set(&mut self, key: &'static str, value: String) {
        self.values.insert(key, value);
    }
}

/// Everything one host evaluation needs, shared across worker tasks
#[derive(Clone)]
pub struct FieldContext {
    pub probes: Arc<dyn Probes>,
    pub vendor: Arc<dyn VendorLookup>,
    pub config: Arc<ScanConfig>,
    pub ports: Arc<Vec<u16>>,
    pub table: Arc<FieldTable>,
}

impl FieldContext {
    /// Run the full two-pass pipeline for one valid address
    pub async fn evaluate(&self, addr: Ipv4Addr) -> HostRecord {
        let alive = self.probes.is_alive(addr).await;
        let mut record = HostRecord::new(addr.to_string());
        let active = self.table.active_fields(self.config.skip_ports);

        // Pass 1: independent fields, declared order. Dependent fields get
        // their placeholder here and are revisited in pass 2.
        for field in &active {
            let fetched = if field.kind.is_dependent() || (field.requires_alive && !alive) {
                None
            } else {
                self.fetch(field.kind, addr, alive).await
            };

            record.set(
                field.key,
                fetched.unwrap_or_else(|| field.placeholder.to_string()),
            );
        }

        // Pass 2: fields derived from the finalized MAC value
        let mac = record.value("mac").unwrap_or(PLACEHOLDER).to_string();
        let mac_ok = mac.len() == 17 && mac != PLACEHOLDER && mac != ERROR_VALUE;

        for field in &active {
            match field.kind {
                FieldKind::Vendor if alive && mac_ok => {
                    if self.config.skip_vendor {
                        record.set(field.key, DISABLED_VALUE.to_string());
                    } else if let Some(vendor) = self.vendor.lookup(&mac).await {
                        record.set(field.key, vendor);
                    }
                }
                FieldKind::WakeLink if alive && mac_ok => {
                    record.set(
                        field.key,
                        wol::build_wake_link(&mac, None, self.config.wol_link_port),
                    );
                }
                _ => {}
            }
        }

        // Classification runs strictly after both passes
        let has_open_ports = !self.config.skip_ports
            && record
                .value("open_ports")
                .is_some_and(|value| value != PLACEHOLDER);

        record.status = if alive && has_open_ports {
            HostStatus::Host
        } else if alive {
            HostStatus::Alive
        } else {
            HostStatus::Dead
        };

        record
    }

    async fn fetch(&self, kind: FieldKind, addr: Ipv4Addr, alive: bool) -> Option<String> {
        match kind {
            FieldKind::Hostname => self.probes.hostname(addr).await,
            FieldKind::OpenPorts => {
                if self.config.skip_ports || !alive {
                    return None;
                }
                let open = self.probes.open_ports(addr, &self.ports).await;
                if open.is_empty() {
                    None
                } else {
                    Some(
                        open.iter()
                            .map(u16::to_string)
                            .collect::<Vec<_>>()
                            .join(","),
                    )
                }
            }
            FieldKind::PingMs => self
                .probes
                .latency_ms(addr)
                .await
                .map(|ms| ms.to_string()),
            FieldKind::Mac => self.probes.mac_address(addr).await,
            FieldKind::Os => {
                let ttl = self.probes.ttl(addr).await;
                detect_os_from_ttl(ttl).map(str::to_string)
            }
            FieldKind::Vendor | FieldKind::WakeLink => None,
        }
    }

    /// Record for a malformed address: classified before any probing,
    /// every field a placeholder.
    pub fn invalid_record(&self, raw: &str) -> HostRecord {
        let mut record = HostRecord::new(raw.to_string());
        record.status = HostStatus::Invalid;

        for field in self.table.active_fields(self.config.skip_ports) {
            let value = if field.kind == FieldKind::Hostname {
                INVALID_IP_VALUE
            } else {
                field.placeholder
            };
            record.set(field.key, value.to_string());
        }

        record
    }

    /// Record for a host whose task died: every field `[err]`
    pub fn error_record(&self, ip: &str) -> HostRecord {
        let mut record = HostRecord::new(ip.to_string());
        record.status = HostStatus::Error;

        for field in self.table.active_fields(self.config.skip_ports) {
            record.set(field.key, ERROR_VALUE.to_string());
        }

        record
    }
}
