//! Target parsing and expansion
//!
//! Turns range, CIDR, list and file specifications into a canonical,
//! deduplicated target set ordered by the numeric address value. Range and
//! CIDR specs fail atomically: a malformed spec yields an error and no
//! addresses. Malformed single addresses from comma lists are retained as
//! invalid entries so they surface in the report instead of vanishing.

use crate::config::CidrPolicy;
use crate::error::ScanError;
use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;

/// One scan target: a validated address, or the raw text of an address
/// that failed validation and will classify as `invalid` without probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetEntry {
    Addr(Ipv4Addr),
    Invalid(String),
}

impl TargetEntry {
    /// Display form, as it appears in the report and export
    pub fn label(&self) -> String {
        match self {
            TargetEntry::Addr(addr) => addr.to_string(),
            TargetEntry::Invalid(raw) => raw.clone(),
        }
    }
}

/// Canonical target set: sorted by integer address value, deduplicated,
/// with invalid entries ordered after every valid address.
#[derive(Debug, Clone)]
pub struct TargetSet {
    entries: Vec<TargetEntry>,
}

impl TargetSet {
    pub fn from_entries(mut entries: Vec<TargetEntry>) -> Self {
        entries.sort_by_key(|entry| match entry {
            TargetEntry::Addr(addr) => (0u8, u32::from(*addr), String::new()),
            TargetEntry::Invalid(raw) => (1u8, 0, raw.clone()),
        });
        entries.dedup();
        Self { entries }
    }

    pub fn entries(&self) -> &[TargetEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TargetEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Width of the longest target label, used for report alignment
    pub fn max_label_width(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.label().len())
            .max()
            .unwrap_or(0)
    }
}

/// Expands range and CIDR specifications under a configured size limit
#[derive(Debug, Clone, Copy)]
pub struct TargetExpander {
    max_cidr_hosts: u64,
    cidr_policy: CidrPolicy,
}

impl Default for TargetExpander {
    fn default() -> Self {
        Self {
            max_cidr_hosts: 10_000,
            cidr_policy: CidrPolicy::Abort,
        }
    }
}

impl TargetExpander {
    pub fn new(max_cidr_hosts: u64, cidr_policy: CidrPolicy) -> Self {
        Self {
            max_cidr_hosts,
            cidr_policy,
        }
    }

    /// Expand one spec: CIDR, dashed range, or a single address
    pub fn expand_spec(&self, spec: &str) -> crate::Result<Vec<TargetEntry>> {
        let spec = spec.trim();
        if spec.contains('/') {
            self.parse_cidr(spec)
        } else if spec.contains('-') {
            self.expand_range(spec)
        } else {
            let addr: Ipv4Addr = spec
                .parse()
                .map_err(|_| ScanError::InvalidTarget(spec.to_string()))?;
            Ok(vec![TargetEntry::Addr(addr)])
        }
    }

    /// Expand CIDR notation into every address of the network, network and
    /// broadcast addresses included, ascending.
    pub fn parse_cidr(&self, spec: &str) -> crate::Result<Vec<TargetEntry>> {
        let network: Ipv4Network = spec
            .parse()
            .map_err(|e| ScanError::InvalidTarget(format!("{}: {}", spec, e)))?;

        let first = u32::from(network.network());
        let last = u32::from(network.broadcast());
        let requested = (last - first) as u64 + 1;

        let last = if requested > self.max_cidr_hosts {
            match self.cidr_policy {
                CidrPolicy::Abort => {
                    return Err(ScanError::ExpansionCancelled {
                        spec: spec.to_string(),
                        requested,
                        limit: self.max_cidr_hosts,
                    });
                }
                CidrPolicy::Truncate => {
                    log::warn!(
                        "{} expands to {} addresses, truncating to {}",
                        spec,
                        requested,
                        self.max_cidr_hosts
                    );
                    if self.max_cidr_hosts == 0 {
                        return Ok(Vec::new());
                    }
                    first + (self.max_cidr_hosts - 1) as u32
                }
            }
        } else {
            last
        };

        Ok(enumerate(first, last))
    }

    /// Expand a dashed range, either `a.b.c.d-e.f.g.h` or the shorthand
    /// `a.b.c.x-y` sharing the first three octets. Reversed operands are
    /// swapped; the result is always ascending and inclusive.
    pub fn expand_range(&self, spec: &str) -> crate::Result<Vec<TargetEntry>> {
        let (left, right) = spec
            .split_once('-')
            .ok_or_else(|| ScanError::InvalidTarget(spec.to_string()))?;
        let (left, right) = (left.trim(), right.trim());

        if right.contains('.') {
            let start: Ipv4Addr = left
                .parse()
                .map_err(|_| ScanError::InvalidTarget(left.to_string()))?;
            let end: Ipv4Addr = right
                .parse()
                .map_err(|_| ScanError::InvalidTarget(right.to_string()))?;

            let (mut first, mut last) = (u32::from(start), u32::from(end));
            if first > last {
                std::mem::swap(&mut first, &mut last);
            }
            Ok(enumerate(first, last))
        } else {
            let base: Ipv4Addr = left
                .parse()
                .map_err(|_| ScanError::InvalidTarget(left.to_string()))?;
            let end: u8 = right
                .parse()
                .map_err(|_| ScanError::InvalidTarget(right.to_string()))?;

            let octets = base.octets();
            let (mut first, mut last) = (octets[3], end);
            if first > last {
                std::mem::swap(&mut first, &mut last);
            }
            Ok((first..=last)
                .map(|i| TargetEntry::Addr(Ipv4Addr::new(octets[0], octets[1], octets[2], i)))
                .collect())
        }
    }
}

fn enumerate(first: u32, last: u32) -> Vec<TargetEntry> {
    (first..=last)
        .map(|value| TargetEntry::Addr(Ipv4Addr::from(value)))
        .collect()
}

/// Split a comma-separated address list. Malformed entries are kept as
/// invalid targets and warned about; empties are dropped.
pub fn parse_ip_list(spec: &str) -> Vec<TargetEntry> {
    spec.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.parse::<Ipv4Addr>() {
            Ok(addr) => TargetEntry::Addr(addr),
            Err(_) => {
                log::warn!("Invalid address in list: {}", item);
                TargetEntry::Invalid(item.to_string())
            }
        })
        .collect()
}

/// Parse a port specification of comma-separated literals and `low-high`
/// ranges into a sorted, deduplicated port list. Unparseable segments are
/// dropped with a warning.
pub fn parse_port_spec(spec: &str) -> Vec<u16> {
    let mut ports = Vec::new();

    for segment in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Some((low, high)) = segment.split_once('-') {
            match (low.trim().parse::<u16>(), high.trim().parse::<u16>()) {
                (Ok(mut low), Ok(mut high)) => {
                    if low > high {
                        std::mem::swap(&mut low, &mut high);
                    }
                    ports.extend(low..=high);
                }
                _ => log::warn!("Invalid port range segment: {}, skipping", segment),
            }
        } else {
            match segment.parse::<u16>() {
                Ok(port) => ports.push(port),
                Err(_) => log::warn!("Invalid port value: {}, skipping", segment),
            }
        }
    }

    ports.sort_unstable();
    ports.dedup();
    ports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(entries: &[TargetEntry]) -> Vec<String> {
        entries.iter().map(|e| e.label()).collect()
    }

    #[test]
    fn cidr_slash_30_covers_network_to_broadcast() {
        let expander = TargetExpander::default();
        let entries = expander.parse_cidr("192.168.0.0/30").unwrap();
        assert_eq!(
            addrs(&entries),
            vec!["192.168.0.0", "192.168.0.1", "192.168.0.2", "192.168.0.3"]
        );
    }

    #[test]
    fn cidr_host_bits_normalize_to_network() {
        let expander = TargetExpander::default();
        let entries = expander.parse_cidr("10.1.2.3/30").unwrap();
        assert_eq!(entries[0].label(), "10.1.2.0");
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn malformed_cidr_rejected() {
        let expander = TargetExpander::default();
        assert!(expander.parse_cidr("192.168.0.0/33").is_err());
        assert!(expander.parse_cidr("300.168.0.0/24").is_err());
        assert!(expander.parse_cidr("192.168.0.0/abc").is_err());
    }

    #[test]
    fn oversized_cidr_aborts_by_default() {
        let expander = TargetExpander::new(100, CidrPolicy::Abort);
        match expander.parse_cidr("10.0.0.0/16") {
            Err(ScanError::ExpansionCancelled {
                requested, limit, ..
            }) => {
                assert_eq!(requested, 65_536);
                assert_eq!(limit, 100);
            }
            other => panic!("expected cancellation, got {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn oversized_cidr_truncates_when_configured() {
        let expander = TargetExpander::new(4, CidrPolicy::Truncate);
        let entries = expander.parse_cidr("10.0.0.0/24").unwrap();
        assert_eq!(
            addrs(&entries),
            vec!["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3"]
        );
    }

    #[test]
    fn full_range_swaps_reversed_operands() {
        let expander = TargetExpander::default();
        let entries = expander.expand_range("10.0.1.2-10.0.0.254").unwrap();
        assert_eq!(entries.first().unwrap().label(), "10.0.0.254");
        assert_eq!(entries.last().unwrap().label(), "10.0.1.2");
        assert_eq!(entries.len(), 5);
    }

    #[test]
    fn shorthand_range_shares_first_three_octets() {
        let expander = TargetExpander::default();
        let entries = expander.expand_range("192.168.0.250-253").unwrap();
        assert_eq!(
            addrs(&entries),
            vec![
                "192.168.0.250",
                "192.168.0.251",
                "192.168.0.252",
                "192.168.0.253"
            ]
        );
    }

    #[test]
    fn single_address_spec() {
        let expander = TargetExpander::default();
        let entries = expander.expand_spec("172.16.0.9").unwrap();
        assert_eq!(addrs(&entries), vec!["172.16.0.9"]);
        assert!(expander.expand_spec("not-an-ip").is_err());
    }

    #[test]
    fn target_set_sorts_and_dedups_by_numeric_value() {
        let set = TargetSet::from_entries(parse_ip_list("10.0.0.5,10.0.0.1,10.0.0.1"));
        assert_eq!(addrs(set.entries()), vec!["10.0.0.1", "10.0.0.5"]);

        // 10.0.0.10 must sort after 10.0.0.9, not lexically before it
        let set = TargetSet::from_entries(parse_ip_list("10.0.0.10,10.0.0.9"));
        assert_eq!(addrs(set.entries()), vec!["10.0.0.9", "10.0.0.10"]);
    }

    #[test]
    fn invalid_list_entries_kept_and_sorted_last() {
        let set = TargetSet::from_entries(parse_ip_list("10.0.0.300,10.0.0.2"));
        assert_eq!(addrs(set.entries()), vec!["10.0.0.2", "10.0.0.300"]);
        assert!(matches!(set.entries()[1], TargetEntry::Invalid(_)));
    }

    #[test]
    fn port_spec_union_sorted_deduped() {
        assert_eq!(parse_port_spec("80,22,80"), vec![22, 80]);
        assert_eq!(parse_port_spec("3-1,2"), vec![1, 2, 3]);
        assert_eq!(parse_port_spec("1-3,junk,5"), vec![1, 2, 3, 5]);
        assert!(parse_port_spec("junk,99999").is_empty());
    }
}
