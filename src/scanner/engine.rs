//! Scan orchestration
//!
//! Two nested bounded pools run here: an outer pool of `workers` host
//! tasks, and inside each alive host the port probe's own pool of up to
//! 100 connects. The worst-case outbound ceiling is therefore
//! `workers x 100` simultaneous connection attempts. That ceiling is the
//! intended throughput/resource trade-off; do not cap it lower silently.
//!
//! The controlling task drains host tasks in submission order, so output
//! order always matches target order no matter which host finished first,
//! and it alone touches the counters and the result buffer. A host task
//! that dies becomes an `error` record; the batch never aborts.

use crate::config::ScanConfig;
use crate::fields::{FieldContext, FieldTable};
use crate::output;
use crate::probe::{Probes, SystemProbes};
use crate::scanner::{ScanReport, ScanSession};
use crate::utils::target_parser::{TargetEntry, TargetSet};
use crate::vendor::{VendorApi, VendorDb, VendorLookup};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// The scan orchestrator
pub struct ScanEngine {
    context: FieldContext,
}

impl ScanEngine {
    /// Build an engine over the platform probes and the configured vendor
    /// backend.
    pub fn new(config: ScanConfig) -> crate::Result<Self> {
        config.validate()?;

        let probes: Arc<dyn Probes> = Arc::new(SystemProbes::from_config(&config));
        let vendor: Arc<dyn VendorLookup> = match &config.vendor_db {
            Some(path) => Arc::new(VendorDb::load(path)?),
            None => Arc::new(VendorApi::new(config.vendor_api_timeout())?),
        };

        Ok(Self::with_parts(config, probes, vendor))
    }

    /// Build an engine over explicit probe and vendor implementations
    pub fn with_parts(
        config: ScanConfig,
        probes: Arc<dyn Probes>,
        vendor: Arc<dyn VendorLookup>,
    ) -> Self {
        let ports = Arc::new(config.ports.clone());
        Self {
            context: FieldContext {
                probes,
                vendor,
                config: Arc::new(config),
                ports,
                table: Arc::new(FieldTable::standard()),
            },
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.context.config
    }

    pub fn table(&self) -> &FieldTable {
        &self.context.table
    }

    /// Scan every target and aggregate the results.
    ///
    /// Cancellation is cooperative and coarse: it stops the drain loop,
    /// leaving already-dispatched probes to finish on their own, and the
    /// partial results gathered so far are still reported.
    pub async fn run(&self, targets: TargetSet, cancel: CancellationToken) -> ScanReport {
        let started = Instant::now();
        let ip_width = targets.max_label_width().max(15);
        let entries = targets.into_entries();
        let mut session = ScanSession::new(entries.len());

        log::info!(
            "Scanning {} target(s) with up to {} workers",
            entries.len(),
            self.context.config.workers
        );

        let semaphore = Arc::new(Semaphore::new(self.context.config.workers));
        let mut handles = Vec::with_capacity(entries.len());

        for entry in &entries {
            let entry = entry.clone();
            let context = self.context.clone();
            let semaphore = semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                match entry {
                    TargetEntry::Addr(addr) => context.evaluate(addr).await,
                    TargetEntry::Invalid(raw) => context.invalid_record(&raw),
                }
            }));
        }

        let progress = ProgressBar::new(entries.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40.white} {percent:>3}% ({pos}/{len} scanned)")
                .unwrap(),
        );

        let skip_ports = self.context.config.skip_ports;
        let mut records = Vec::with_capacity(entries.len());
        let mut lines = Vec::new();
        let mut separator_len = 0;
        let mut interrupted = false;

        for (idx, handle) in handles.into_iter().enumerate() {
            let record = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    interrupted = true;
                    break;
                }
                joined = handle => match joined {
                    Ok(record) => record,
                    Err(e) => {
                        log::error!("Host task for {} failed: {}", entries[idx].label(), e);
                        self.context.error_record(&entries[idx].label())
                    }
                },
            };

            session.counts.record(record.status);

            let (line, plain_len) =
                output::render_record(&record, &self.context.table, skip_ports, ip_width);
            separator_len = plain_len;

            if !self
                .context
                .config
                .ignore_statuses
                .contains(&record.status.presentation())
            {
                lines.push(line);
            }

            records.push(record);
            progress.inc(1);
        }

        progress.finish_and_clear();
        session.finish();

        if interrupted {
            log::warn!(
                "Scan interrupted; reporting {} of {} target(s)",
                records.len(),
                entries.len()
            );
        }

        ScanReport {
            session,
            records,
            lines,
            duration: started.elapsed(),
            interrupted,
            separator_len,
        }
    }
}
