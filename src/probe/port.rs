//! TCP connect probing
//!
//! One connect attempt per port, bounded by a per-call timeout. Refused,
//! filtered and timed-out attempts all read uniformly as "not open"; no
//! attempt is retried.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;

/// Upper bound on the per-host connect pool regardless of configuration
const MAX_PORT_POOL: usize = 200;

/// Whether one TCP connect to `addr:port` completes within the timeout
pub async fn is_open(addr: Ipv4Addr, port: u16, connect_timeout: Duration) -> bool {
    let sockaddr = SocketAddr::from((addr, port));
    matches!(
        timeout(connect_timeout, TcpStream::connect(sockaddr)).await,
        Ok(Ok(_))
    )
}

/// Probe every port on a bounded pool sized
/// `min(max_concurrency, ports.len(), 200)` and return the open ones,
/// ascending. Failures are excluded without error propagation.
pub async fn scan(
    addr: Ipv4Addr,
    ports: &[u16],
    connect_timeout: Duration,
    max_concurrency: usize,
) -> Vec<u16> {
    if ports.is_empty() {
        return Vec::new();
    }

    let pool = max_concurrency.min(ports.len()).min(MAX_PORT_POOL).max(1);
    let semaphore = Arc::new(Semaphore::new(pool));
    let mut tasks = JoinSet::new();

    for &port in ports {
        let semaphore = semaphore.clone();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            is_open(addr, port, connect_timeout).await.then_some(port)
        });
    }

    let mut open = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        if let Ok(Some(port)) = joined {
            open.push(port);
        }
    }

    open.sort_unstable();
    open
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn open_port_detected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        assert!(is_open(Ipv4Addr::LOCALHOST, port, Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn closed_port_reads_not_open() {
        // Bind-then-drop guarantees the port is currently closed
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!is_open(Ipv4Addr::LOCALHOST, port, Duration::from_millis(500)).await);
    }

    #[tokio::test]
    async fn scan_returns_sorted_open_subset() {
        let a = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let b = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_a = a.local_addr().unwrap().port();
        let open_b = b.local_addr().unwrap().port();

        let closed = {
            let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let p = l.local_addr().unwrap().port();
            drop(l);
            p
        };

        let mut expected = vec![open_a, open_b];
        expected.sort_unstable();

        let found = scan(
            Ipv4Addr::LOCALHOST,
            &[open_b, closed, open_a],
            Duration::from_millis(500),
            100,
        )
        .await;
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn empty_port_set_scans_nothing() {
        let found = scan(Ipv4Addr::LOCALHOST, &[], Duration::from_millis(100), 100).await;
        assert!(found.is_empty());
    }
}
