//! Hardware-address resolution through the platform neighbor table
//!
//! Scrapes one MAC out of `arp` output and normalizes it to uppercase
//! colon form. Best-effort across platforms and locales: no match, a slow
//! tool, or a spawn failure all yield `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

static MAC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9A-Fa-f]{2}[:-]){5}[0-9A-Fa-f]{2}").unwrap());

/// Query the neighbor table for the MAC address of `addr`
pub async fn resolve(addr: Ipv4Addr, query_timeout: Duration) -> Option<String> {
    let target = addr.to_string();
    let args: [&str; 2] = if cfg!(target_os = "windows") {
        ["-a", &target]
    } else {
        ["-n", &target]
    };

    let mut command = Command::new("arp");
    command
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let output = timeout(query_timeout, command.output()).await.ok()?.ok()?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    extract_mac(&stdout)
}

fn extract_mac(stdout: &str) -> Option<String> {
    MAC_RE
        .find(stdout)
        .map(|m| m.as_str().replace('-', ":").to_uppercase())
}
