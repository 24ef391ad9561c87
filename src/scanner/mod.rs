//! Scanner module containing the orchestration engine

pub mod engine;

pub use engine::ScanEngine;

use crate::fields::{HostRecord, HostStatus};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Aggregate status counters, incremented exactly once per finalized
/// record by the controlling task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub invalid: usize,
    pub dead: usize,
    pub alive: usize,
    pub host: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: HostStatus) {
        match status {
            HostStatus::Invalid => self.invalid += 1,
            HostStatus::Dead | HostStatus::Error => self.dead += 1,
            HostStatus::Alive => self.alive += 1,
            HostStatus::Host => self.host += 1,
        }
    }

    /// Hosts that answered the reachability probe
    pub fn responding(&self) -> usize {
        self.alive + self.host
    }

    /// Records produced for targets that were valid addresses
    pub fn scanned(&self) -> usize {
        self.dead + self.alive + self.host
    }
}

/// One scan run: the immutable target count plus the counters and
/// timestamps the controlling task maintains.
#[derive(Debug, Clone)]
pub struct ScanSession {
    pub total_targets: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub counts: StatusCounts,
}

impl ScanSession {
    pub fn new(total_targets: usize) -> Self {
        Self {
            total_targets,
            started_at: Utc::now(),
            finished_at: None,
            counts: StatusCounts::default(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

/// Everything a finished (or interrupted) scan produced
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub session: ScanSession,
    /// One finalized record per drained target, in submission order
    pub records: Vec<HostRecord>,
    /// Rendered console lines for records not filtered by the ignore set
    pub lines: Vec<String>,
    pub duration: Duration,
    pub interrupted: bool,
    /// Plain-text width of a report line, for separator rules
    pub separator_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_bucket_statuses() {
        let mut counts = StatusCounts::default();
        for status in [
            HostStatus::Invalid,
            HostStatus::Dead,
            HostStatus::Error,
            HostStatus::Alive,
            HostStatus::Host,
            HostStatus::Host,
        ] {
            counts.record(status);
        }

        assert_eq!(counts.invalid, 1);
        assert_eq!(counts.dead, 2);
        assert_eq!(counts.alive, 1);
        assert_eq!(counts.host, 2);
        assert_eq!(counts.responding(), 3);
        assert_eq!(counts.scanned(), 5);
    }
}
