//! Reverse-DNS resolution
//!
//! Shells out to `nslookup` so each call carries its own deadline; there
//! is no process-wide resolver timeout to override or race on.

use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Reverse-resolve `addr` to a hostname within the timeout
pub async fn resolve(addr: Ipv4Addr, lookup_timeout: Duration) -> Option<String> {
    let mut command = Command::new("nslookup");
    command
        .arg(addr.to_string())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let output = timeout(lookup_timeout, command.output()).await.ok()?.ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_nslookup(&stdout, addr)
}

fn parse_nslookup(stdout: &str, addr: Ipv4Addr) -> Option<String> {
    for line in stdout.lines() {
        // Unix prints "x.in-addr.arpa  name = host.", Windows "Name:  host"
        let candidate = if let Some(idx) = line.find("name = ") {
            Some(&line[idx + 7..])
        } else {
            line.trim_start().strip_prefix("Name:")
        };

        if let Some(candidate) = candidate {
            let hostname = candidate.trim().trim_end_matches('.');
            if !hostname.is_empty() && hostname != addr.to_string() {
                return Some(hostname.to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_style_answer() {
        let stdout = "17.0.168.192.in-addr.arpa\tname = printer.lan.\n";
        assert_eq!(
            parse_nslookup(stdout, Ipv4Addr::new(192, 168, 0, 17)),
            Some("printer.lan".to_string())
        );
    }

    #[test]
    fn windows_style_answer() {
        let stdout = "Server:  router.lan\nAddress:  192.168.0.1\n\nName:    printer.lan\nAddress:  192.168.0.17\n";
        // The first Name: line wins; the server preamble has no Name: field
        assert_eq!(
            parse_nslookup(stdout, Ipv4Addr::new(192, 168, 0, 17)),
            Some("printer.lan".to_string())
        );
    }

    #[test]
    fn nxdomain_yields_none() {
        let stdout = "** server can't find 17.0.168.192.in-addr.arpa: NXDOMAIN\n";
        assert_eq!(parse_nslookup(stdout, Ipv4Addr::new(192, 168, 0, 17)), None);
    }
}
