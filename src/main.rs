use clap::{Arg, ArgAction, ArgGroup, Command};
use colored::Colorize;
use netsweep::config::{CidrPolicy, ScanConfig};
use netsweep::error::ScanError;
use netsweep::fields::HostStatus;
use netsweep::output;
use netsweep::scanner::ScanEngine;
use netsweep::utils::file_input::load_targets;
use netsweep::utils::target_parser::{parse_ip_list, parse_port_spec, TargetExpander, TargetSet};
use netsweep::wol;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process;
use tokio_util::sync::CancellationToken;

fn print_banner() {
    println!(
        "{}",
        r"             _                                ".bright_cyan().bold()
    );
    println!(
        "{}",
        r"  _ __   ___| |_ _____      _____  ___ _ __   ".bright_cyan().bold()
    );
    println!(
        "{}",
        r" | '_ \ / _ \ __/ __\ \ /\ / / _ \/ _ \ '_ \  ".bright_cyan().bold()
    );
    println!(
        "{}",
        r" | | | |  __/ |_\__ \\ V  V /  __/  __/ |_) | ".bright_cyan().bold()
    );
    println!(
        "{}",
        r" |_| |_|\___|\__|___/ \_/\_/ \___|\___| .__/  ".bright_cyan().bold()
    );
    println!(
        "{}",
        r"                                      |_|     ".bright_cyan().bold()
    );
    println!();
    println!(
        "{}",
        "netsweep v0.2.1 - LAN discovery and enrichment".bright_blue()
    );
    println!();
}

fn build_cli() -> Command {
    Command::new("netsweep")
        .version("0.2.1")
        .about("Concurrent LAN host discovery and enrichment scanner")
        .arg(
            Arg::new("range")
                .long("range")
                .value_name("RANGE")
                .help("Range (192.168.0.1-192.168.0.255, 192.168.0.1-255) or CIDR (192.168.0.0/24)"),
        )
        .arg(
            Arg::new("ips")
                .long("ips")
                .value_name("LIST")
                .help("Comma separated addresses: 192.168.0.1,192.168.0.3"),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .value_name("PATH")
                .help("File with addresses/ranges/CIDR, one per line, # comments supported"),
        )
        .group(ArgGroup::new("source").args(["range", "ips", "file"]))
        .arg(
            Arg::new("ports")
                .long("ports")
                .value_name("LIST")
                .help("Comma separated ports (default: common service ports)"),
        )
        .arg(
            Arg::new("port-range")
                .long("port-range")
                .value_name("SPEC")
                .help("Ports or ranges like 1-1000 or 1-100,200,300-310"),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Max concurrent host workers"),
        )
        .arg(
            Arg::new("ignore-types")
                .long("ignore-types")
                .value_name("LIST")
                .help("Statuses to hide from the listing: host,alive,dead"),
        )
        .arg(
            Arg::new("export-csv")
                .long("export-csv")
                .value_name("PATH")
                .help("Export results to a CSV file"),
        )
        .arg(
            Arg::new("skip-ports")
                .long("skip-ports")
                .action(ArgAction::SetTrue)
                .help("Skip port scanning"),
        )
        .arg(
            Arg::new("skip-vendor")
                .long("skip-vendor")
                .action(ArgAction::SetTrue)
                .help("Skip the vendor lookup for discovered MAC addresses"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .value_name("MS")
                .value_parser(clap::value_parser!(u64))
                .help("Per-port connect timeout in milliseconds"),
        )
        .arg(
            Arg::new("max-cidr")
                .long("max-cidr")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("Largest CIDR expansion accepted without the cidr-policy applying"),
        )
        .arg(
            Arg::new("cidr-policy")
                .long("cidr-policy")
                .value_name("POLICY")
                .help("Oversized CIDR handling: abort or truncate"),
        )
        .arg(
            Arg::new("vendor-db")
                .long("vendor-db")
                .value_name("PATH")
                .help("Local JSON MAC-prefix vendor database (online lookup otherwise)"),
        )
        .arg(
            Arg::new("wake")
                .long("wake")
                .value_name("MAC")
                .help("Send a Wake-on-LAN magic packet to MAC and exit"),
        )
        .arg(
            Arg::new("broadcast")
                .long("broadcast")
                .value_name("ADDR")
                .help("Broadcast address for --wake (default 255.255.255.255)"),
        )
        .arg(
            Arg::new("wol-port")
                .long("wol-port")
                .value_name("PORT")
                .value_parser(clap::value_parser!(u16))
                .help("UDP port for --wake (default 9)"),
        )
        .arg(
            Arg::new("no-banner")
                .long("no-banner")
                .action(ArgAction::SetTrue)
                .help("Hide the banner"),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = build_cli().get_matches();

    if !matches.get_flag("no-banner") {
        print_banner();
    }

    // One-shot wake action, no scan
    if let Some(mac) = matches.get_one::<String>("wake") {
        let broadcast = match matches.get_one::<String>("broadcast") {
            Some(addr) => match addr.parse::<Ipv4Addr>() {
                Ok(addr) => addr,
                Err(_) => {
                    output::print_error(&format!("Invalid broadcast address: {}", addr));
                    process::exit(1);
                }
            },
            None => wol::DEFAULT_BROADCAST,
        };
        let port = matches
            .get_one::<u16>("wol-port")
            .copied()
            .unwrap_or(wol::DEFAULT_WOL_PORT);

        match wol::send_magic_packet(mac, broadcast, port) {
            Ok(()) => {
                output::print_success(&format!(
                    "Magic packet sent to {} via {}:{}",
                    mac.bright_cyan().bold(),
                    broadcast,
                    port
                ));
                return Ok(());
            }
            Err(e) => {
                output::print_error(&format!("Failed to send magic packet: {}", e));
                process::exit(1);
            }
        }
    }

    let mut config = ScanConfig::load_default_config();

    if let Some(&workers) = matches.get_one::<usize>("workers") {
        config.workers = workers;
    }
    if let Some(&timeout_ms) = matches.get_one::<u64>("timeout-ms") {
        config.port_timeout_ms = timeout_ms;
    }
    if let Some(&max_cidr) = matches.get_one::<u64>("max-cidr") {
        config.max_cidr_hosts = max_cidr;
    }
    if let Some(policy) = matches.get_one::<String>("cidr-policy") {
        match policy.parse::<CidrPolicy>() {
            Ok(policy) => config.cidr_policy = policy,
            Err(e) => {
                output::print_error(&e);
                process::exit(1);
            }
        }
    }
    if let Some(path) = matches.get_one::<String>("vendor-db") {
        config.vendor_db = Some(PathBuf::from(path));
    }
    if matches.get_flag("skip-ports") {
        config.skip_ports = true;
        output::print_info(&format!(
            "Port scanning {} (--skip-ports)",
            "disabled".bold()
        ));
    }
    if matches.get_flag("skip-vendor") {
        config.skip_vendor = true;
        output::print_info(&format!(
            "Vendor lookup {} (--skip-vendor)",
            "disabled".bold()
        ));
    }

    if let Some(spec) = matches.get_one::<String>("port-range") {
        let ports = parse_port_spec(spec);
        if ports.is_empty() {
            output::print_warn("No valid ports parsed from --port-range, using default list.");
        } else {
            config.ports = ports;
        }
    } else if let Some(spec) = matches.get_one::<String>("ports") {
        let ports = parse_port_spec(spec);
        if ports.is_empty() {
            output::print_warn("No valid ports in --ports, using default list.");
        } else {
            config.ports = ports;
        }
    }

    if let Some(spec) = matches.get_one::<String>("ignore-types") {
        let mut rejected = Vec::new();
        for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match name.parse::<HostStatus>() {
                Ok(status @ (HostStatus::Host | HostStatus::Alive | HostStatus::Dead)) => {
                    config.ignore_statuses.insert(status);
                }
                _ => rejected.push(name.to_string()),
            }
        }
        if !rejected.is_empty() {
            output::print_warn(&format!(
                "Ignoring invalid types in --ignore-types: {}",
                rejected.join(", ")
            ));
        }
        if !config.ignore_statuses.is_empty() {
            let mut names: Vec<_> = config
                .ignore_statuses
                .iter()
                .map(|s| s.as_str())
                .collect();
            names.sort_unstable();
            output::print_info(&format!("Ignoring types: {}", names.join(", ")));
        }
    }

    let expander = TargetExpander::new(config.max_cidr_hosts, config.cidr_policy);

    let entries = if let Some(spec) = matches.get_one::<String>("range") {
        match expander.expand_spec(spec) {
            Ok(entries) => entries,
            Err(e @ ScanError::ExpansionCancelled { .. }) => {
                output::print_warn(&e.to_string());
                output::print_error("Scan cancelled.");
                process::exit(1);
            }
            Err(e) => {
                output::print_error(&e.to_string());
                process::exit(1);
            }
        }
    } else if let Some(list) = matches.get_one::<String>("ips") {
        parse_ip_list(list)
    } else if let Some(path) = matches.get_one::<String>("file") {
        match load_targets(path, &expander) {
            Ok(entries) => entries,
            Err(e) => {
                output::print_error(&format!("Failed to read {}: {}", path, e));
                process::exit(1);
            }
        }
    } else {
        output::print_warn("No target source provided, scanning classic range (192.168.0.0/24)");
        expander.expand_spec("192.168.0.0/24")?
    };

    let targets = TargetSet::from_entries(entries);
    if targets.is_empty() {
        output::print_error("No valid targets to scan.");
        process::exit(1);
    }

    let engine = match ScanEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            output::print_error(&e.to_string());
            process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    output::print_info(&format!(
        "Starting scan of {} target(s) with up to {} workers...",
        targets.len(),
        engine.config().workers
    ));

    let report = engine.run(targets, cancel).await;
    if report.interrupted {
        output::print_warn("Interrupted by user, partial results follow.");
    }

    output::print_report(&report);
    output::print_summary(&report);

    if let Some(path) = matches.get_one::<String>("export-csv") {
        output::print_info(&format!("Exporting results to {}...", path));
        match output::export_csv(
            &report.records,
            engine.table(),
            engine.config().skip_ports,
            path,
        ) {
            Ok(()) => output::print_success(&format!(
                "Exported {} record(s) to {}",
                report.records.len(),
                path
            )),
            Err(e) => output::print_error(&format!("Failed to export CSV: {}", e)),
        }
    }

    Ok(())
}
