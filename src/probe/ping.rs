//! Reachability probing through the platform `ping` tool
//!
//! A host counts as alive iff the probe output contains a `ttl=` field.
//! Keying on the field rather than the exit status keeps the check uniform
//! across platform output variants. Extraction of the latency and TTL
//! numerics is best-effort text matching against localized tool output.

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::Ipv4Addr;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)time[=<](\d+(?:\.\d+)?)").unwrap());
static TTL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ttl[=](\d+)").unwrap());

/// Issue one echo probe. Returns the alive flag and, when alive, the raw
/// tool output for field extraction. A single attempt, never retried.
pub async fn run_ping(addr: Ipv4Addr, probe_timeout: Duration) -> (bool, Option<String>) {
    let target = addr.to_string();
    let wait;
    let args: [&str; 5] = if cfg!(target_os = "windows") {
        wait = probe_timeout.as_millis().to_string();
        ["-n", "1", "-w", &wait, &target]
    } else {
        wait = probe_timeout.as_secs().max(1).to_string();
        ["-c", "1", "-W", &wait, &target]
    };

    let mut command = Command::new("ping");
    command
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    // Grace on top of the tool's own deadline so we reap it, not race it
    let deadline = probe_timeout + Duration::from_millis(500);
    let output = match timeout(deadline, command.output()).await {
        Ok(Ok(output)) => output,
        _ => return (false, None),
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if stdout.to_lowercase().contains("ttl=") {
        (true, Some(stdout))
    } else {
        (false, None)
    }
}

/// Whether the address answers an echo probe
pub async fn is_alive(addr: Ipv4Addr, probe_timeout: Duration) -> bool {
    run_ping(addr, probe_timeout).await.0
}

/// Round-trip latency in milliseconds, if the tool reported one
pub async fn latency_ms(addr: Ipv4Addr, probe_timeout: Duration) -> Option<f64> {
    let (alive, stdout) = run_ping(addr, probe_timeout).await;
    if !alive {
        return None;
    }

    extract_time(&stdout?)
}

/// TTL observed in the probe response, if any
pub async fn ttl(addr: Ipv4Addr, probe_timeout: Duration) -> Option<u32> {
    let (alive, stdout) = run_ping(addr, probe_timeout).await;
    if !alive {
        return None;
    }

    extract_ttl(&stdout?)
}

fn extract_time(stdout: &str) -> Option<f64> {
    TIME_RE
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn extract_ttl(stdout: &str) -> Option<u32> {
    TTL_RE
        .captures(stdout)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Coarse OS-family guess from an observed TTL. A heuristic over common
/// initial TTL values, not authoritative.
pub fn detect_os_from_ttl(ttl: Option<u32>) -> Option<&'static str> {
    match ttl {
        None => None,
        Some(t) if t > 240 => Some("Other"),
        Some(t) if t > 120 => Some("Windows"),
        Some(t) if t > 60 => Some("Linux/Unix/MacOS"),
        Some(t) if t > 30 => Some("Linux/Unix"),
        Some(_) => Some("Unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_guess_boundaries() {
        assert_eq!(detect_os_from_ttl(Some(64)), Some("Linux/Unix/MacOS"));
        assert_eq!(detect_os_from_ttl(Some(128)), Some("Windows"));
        assert_eq!(detect_os_from_ttl(Some(250)), Some("Other"));
        assert_eq!(detect_os_from_ttl(Some(20)), Some("Unknown"));
        assert_eq!(detect_os_from_ttl(Some(55)), Some("Linux/Unix"));
        assert_eq!(detect_os_from_ttl(None), None);

        // Exact boundary values fall into the lower bucket
        assert_eq!(detect_os_from_ttl(Some(240)), Some("Windows"));
        assert_eq!(detect_os_from_ttl(Some(120)), Some("Linux/Unix/MacOS"));
        assert_eq!(detect_os_from_ttl(Some(60)), Some("Linux/Unix"));
        assert_eq!(detect_os_from_ttl(Some(30)), Some("Unknown"));
    }

    #[test]
    fn linux_style_output_extracts() {
        let stdout = "64 bytes from 192.168.0.1: icmp_seq=1 ttl=64 time=3.42 ms";
        assert_eq!(extract_ttl(stdout), Some(64));
        assert_eq!(extract_time(stdout), Some(3.42));
    }

    #[test]
    fn windows_style_output_extracts() {
        let stdout = "Reply from 192.168.0.1: bytes=32 time<1ms TTL=128";
        assert_eq!(extract_ttl(stdout), Some(128));
        assert_eq!(extract_time(stdout), Some(1.0));
    }

    #[test]
    fn absent_fields_yield_none() {
        let stdout = "Request timed out.";
        assert_eq!(extract_ttl(stdout), None);
        assert_eq!(extract_time(stdout), None);
    }
}
