//! Orchestrator aggregation, ordering and resilience

mod common;

use common::{CountingVendor, FakeHost, FakeProbes};
use netsweep::config::ScanConfig;
use netsweep::fields::{HostStatus, ERROR_VALUE};
use netsweep::scanner::{ScanEngine, ScanReport};
use netsweep::utils::target_parser::{parse_ip_list, TargetSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn config() -> ScanConfig {
    ScanConfig::default()
        .with_workers(4)
        .with_ports(vec![22, 80])
}

fn engine(config: ScanConfig, probes: FakeProbes) -> ScanEngine {
    ScanEngine::with_parts(config, Arc::new(probes), Arc::new(CountingVendor::new()))
}

async fn run(engine: &ScanEngine, list: &str) -> ScanReport {
    let targets = TargetSet::from_entries(parse_ip_list(list));
    engine.run(targets, CancellationToken::new()).await
}

#[tokio::test]
async fn one_record_per_target_in_canonical_order() {
    let probes = FakeProbes::new().with_host([10, 0, 0, 9], FakeHost::alive());
    let engine = engine(config(), probes);
    let report = run(&engine, "10.0.0.9,10.0.0.5,10.0.0.1,10.0.0.5").await;

    let ips: Vec<&str> = report.records.iter().map(|r| r.ip.as_str()).collect();
    assert_eq!(ips, vec!["10.0.0.1", "10.0.0.5", "10.0.0.9"]);
    assert_eq!(report.session.total_targets, 3);
}

#[tokio::test]
async fn counters_balance_against_target_count() {
    let probes = FakeProbes::new()
        .with_host(
            [10, 0, 0, 1],
            FakeHost {
                alive: true,
                open_ports: vec![22],
                ..FakeHost::alive()
            },
        )
        .with_host([10, 0, 0, 2], FakeHost::alive());
    let engine = engine(config(), probes);
    let report = run(&engine, "10.0.0.1,10.0.0.2,10.0.0.3,10.0.0.300").await;

    let counts = report.session.counts;
    assert_eq!(report.session.total_targets, 4);
    assert_eq!(counts.invalid, 1);
    assert_eq!(counts.host, 1);
    assert_eq!(counts.alive, 1);
    assert_eq!(counts.dead, 1);
    assert_eq!(
        counts.scanned(),
        report.session.total_targets - counts.invalid
    );
}

#[tokio::test]
async fn panicking_host_task_becomes_an_error_record() {
    let probes = FakeProbes::new()
        .with_host([10, 0, 0, 8], FakeHost::alive())
        .panicking_on([10, 0, 0, 7]);
    let engine = engine(config(), probes);
    let report = run(&engine, "10.0.0.6,10.0.0.7,10.0.0.8").await;

    assert_eq!(report.records.len(), 3);

    let record = &report.records[1];
    assert_eq!(record.ip, "10.0.0.7");
    assert_eq!(record.status, HostStatus::Error);
    for field in engine.table().active_fields(false) {
        assert_eq!(record.value(field.key), Some(ERROR_VALUE));
    }

    // The error record counts as dead; the batch still finished
    assert_eq!(report.session.counts.dead, 2);
    assert_eq!(report.session.counts.alive, 1);
}

#[tokio::test]
async fn ignore_filter_only_hides_console_lines() {
    let mut config = config();
    config.ignore_statuses.insert(HostStatus::Dead);

    let probes = FakeProbes::new().with_host([10, 0, 0, 2], FakeHost::alive());
    let engine = engine(config, probes);
    let report = run(&engine, "10.0.0.1,10.0.0.2,10.0.0.3").await;

    assert_eq!(report.lines.len(), 1);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.session.counts.dead, 2);

    // The export still carries every record
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    netsweep::output::export_csv(&report.records, engine.table(), false, &path).unwrap();

    let exported = std::fs::read_to_string(&path).unwrap();
    assert_eq!(exported.lines().count(), 1 + report.records.len());
}

#[tokio::test]
async fn single_worker_still_preserves_order() {
    let probes = FakeProbes::new().with_host([10, 0, 0, 2], FakeHost::alive());
    let engine = engine(config().with_workers(1), probes);
    let report = run(&engine, "10.0.0.3,10.0.0.1,10.0.0.2").await;

    let ips: Vec<&str> = report.records.iter().map(|r| r.ip.as_str()).collect();
    assert_eq!(ips, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
}

#[tokio::test]
async fn cancellation_reports_partial_results() {
    let engine = engine(config(), FakeProbes::new());
    let targets = TargetSet::from_entries(parse_ip_list("10.0.0.1,10.0.0.2"));

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = engine.run(targets, cancel).await;

    assert!(report.interrupted);
    assert!(report.records.is_empty());
}
