//! Target-file loading
//!
//! One entry per line; blank lines and `#` comments are skipped. Each
//! surviving line may be a CIDR, a dashed range, a comma list, or a single
//! address. Per-line failures are warned and skipped so one bad line never
//! discards the rest of the file.

use crate::error::ScanError;
use crate::utils::target_parser::{parse_ip_list, TargetEntry, TargetExpander};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::Ipv4Addr;
use std::path::Path;

/// Read targets from a file
pub fn load_targets<P: AsRef<Path>>(
    path: P,
    expander: &TargetExpander,
) -> crate::Result<Vec<TargetEntry>> {
    let file = File::open(&path)?;
    let reader = BufReader::new(file);
    let mut entries = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.contains('/') || line.contains('-') {
            match expander.expand_spec(line) {
                Ok(expanded) => entries.extend(expanded),
                Err(ScanError::ExpansionCancelled {
                    requested, limit, ..
                }) => {
                    log::warn!(
                        "Skipping {}: expansion of {} addresses cancelled (limit {})",
                        line,
                        requested,
                        limit
                    );
                }
                Err(e) => {
                    log::warn!("Skipping {}: {}", line, e);
                }
            }
        } else if line.contains(',') {
            entries.extend(parse_ip_list(line));
        } else {
            match line.parse::<Ipv4Addr>() {
                Ok(addr) => entries.push(TargetEntry::Addr(addr)),
                Err(_) => {
                    log::warn!("Invalid address in file: {}", line);
                    entries.push(TargetEntry::Invalid(line.to_string()));
                }
            }
        }
    }

    Ok(entries)
}
