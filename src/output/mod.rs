//! Report rendering and export
//!
//! Every report line exists in two forms: a decorated one for the console
//! and a plain one that column widths are measured on, so ANSI decoration
//! never distorts alignment. The CSV export writes every record the scan
//! produced, console ignore-filter or not.

use crate::fields::{
    FieldKind, FieldSpec, FieldTable, HostRecord, HostStatus, DISABLED_VALUE, ERROR_VALUE,
};
use crate::scanner::ScanReport;
use colored::Colorize;
use std::path::Path;

/// Colored status square shown in front of each report line
fn status_glyph(status: HostStatus) -> String {
    match status.presentation() {
        HostStatus::Host => "\u{25A0}".bright_green().bold().to_string(),
        HostStatus::Alive => "\u{25A0}".bright_blue().bold().to_string(),
        _ => "\u{25A0}".red().bold().to_string(),
    }
}

/// Shorten `text` to `width`. Cutting more than three characters leaves an
/// ellipsis; smaller cuts (or widths with no room for one) are hard cuts.
pub fn truncate(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        return text.to_string();
    }

    let overflow = len - width;
    if overflow > 3 && width > 3 {
        let cut: String = text.chars().take(width - 3).collect();
        format!("{}...", cut)
    } else {
        text.chars().take(width).collect()
    }
}

/// Human form of a stored field value
fn display_value(field: &FieldSpec, raw: &str) -> String {
    if field.kind == FieldKind::PingMs && raw.parse::<u32>().is_ok() {
        format!("{}ms", raw)
    } else {
        raw.to_string()
    }
}

/// Decorate one padded value in the field's color scheme
fn colorize_value(field: &FieldSpec, value: &str, padded: &str) -> String {
    let missing = value == field.placeholder
        || value == ERROR_VALUE
        || (field.kind == FieldKind::Vendor && value == DISABLED_VALUE);
    if missing {
        return padded.red().bold().to_string();
    }

    match field.kind {
        FieldKind::Hostname | FieldKind::OpenPorts | FieldKind::WakeLink => {
            padded.blue().bold().to_string()
        }
        FieldKind::Mac => padded.cyan().bold().to_string(),
        FieldKind::Vendor => padded.bright_yellow().bold().to_string(),
        FieldKind::Os => padded.magenta().bold().to_string(),
        FieldKind::PingMs => {
            let ms: u32 = value.trim_end_matches("ms").parse().unwrap_or(u32::MAX);
            if ms <= 25 {
                padded.green().bold().to_string()
            } else if ms <= 50 {
                padded.bright_blue().bold().to_string()
            } else if ms <= 75 {
                padded.bright_yellow().bold().to_string()
            } else {
                padded.bright_red().bold().to_string()
            }
        }
    }
}

/// Build the pipe-delimited console line for one record. Returns the
/// decorated line and the plain-text length the separator rule uses.
pub fn render_record(
    record: &HostRecord,
    table: &FieldTable,
    skip_ports: bool,
    ip_width: usize,
) -> (String, usize) {
    let ip_padded = format!("{:<width$}", record.ip, width = ip_width);
    let mut parts = vec![format!("{} {}", status_glyph(record.status), ip_padded)];
    let mut plain_parts = vec![format!("\u{25A0} {}", ip_padded)];

    for field in table.active_fields(skip_ports) {
        let raw = record.value(field.key).unwrap_or(field.placeholder);
        let shown = truncate(&display_value(field, raw), field.width);
        let padded = format!("{:<width$}", shown, width = field.width);

        parts.push(format!("{}: {}", field.name, colorize_value(field, &shown, &padded)));
        plain_parts.push(format!("{}: {}", field.name, padded));
    }

    // Measured in chars, not bytes; the status glyph is multi-byte
    (parts.join(" | "), plain_parts.join(" | ").chars().count())
}

/// Print the report lines with their separators, then the summary
pub fn print_report(report: &ScanReport) {
    println!();
    for line in &report.lines {
        println!("{}", "-".repeat(report.separator_len));
        println!("{}", line);
    }
    if report.separator_len > 0 && !report.lines.is_empty() {
        println!("{}", "-".repeat(report.separator_len));
    }
}

/// Print the aggregate summary for a finished scan
pub fn print_summary(report: &ScanReport) {
    let counts = report.session.counts;
    let total = report.session.total_targets;
    let secs = report.duration.as_secs_f64();

    println!();
    print_success(&format!(
        "Scan of {} target(s) completed in {} seconds",
        total.to_string().bright_white().bold(),
        format!("{:.2}", secs).bright_white().bold()
    ));
    if secs > 0.0 && counts.scanned() > 0 {
        print_success(&format!(
            "About {} addresses/sec",
            format!("{:.1}", report.records.len() as f64 / secs)
                .bright_white()
                .bold()
        ));
    }

    println!();
    print_success(&format!(
        "{} {} ({}/{})",
        "Dead:".red(),
        counts.dead.to_string().bright_red().bold(),
        counts.dead,
        total
    ));
    print_success(&format!(
        "{} {} ({}/{})",
        "Alive:".blue(),
        counts.alive.to_string().bright_blue().bold(),
        counts.alive,
        total
    ));
    print_success(&format!(
        "{} {} ({}/{})",
        "With open port(s):".green(),
        counts.host.to_string().bright_green().bold(),
        counts.host,
        total
    ));
    if counts.invalid > 0 {
        print_success(&format!(
            "{} {} ({}/{})",
            "Invalid:".yellow(),
            counts.invalid.to_string().bright_yellow().bold(),
            counts.invalid,
            total
        ));
    }

    println!();
    print_success(&format!(
        "{} {} ({}/{})",
        "Responding total:".yellow(),
        counts.responding().to_string().bright_yellow().bold(),
        counts.responding(),
        total
    ));
}

/// Export every record as CSV: header plus one row per host, including
/// hosts the console filter hid. All-or-nothing; the first error aborts.
pub fn export_csv<P: AsRef<Path>>(
    records: &[HostRecord],
    table: &FieldTable,
    skip_ports: bool,
    path: P,
) -> crate::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.csv_header(skip_ports))?;

    for record in records {
        let mut row = vec![record.ip.clone(), record.status.as_str().to_string()];
        for field in table.active_fields(skip_ports) {
            row.push(
                record
                    .value(field.key)
                    .unwrap_or(field.placeholder)
                    .to_string(),
            );
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn print_info(msg: &str) {
    println!("{} {}", "[~]".bold(), msg);
}

pub fn print_success(msg: &str) {
    println!("{} {}", "[+]".bright_green().bold(), msg);
}

pub fn print_warn(msg: &str) {
    println!("{} {}", "[!]".bright_yellow().bold(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[!!]".bright_red().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_values_pass_through() {
        assert_eq!(truncate("router.lan", 15), "router.lan");
        assert_eq!(truncate("exact-width-val", 15), "exact-width-val");
    }

    #[test]
    fn deep_cuts_get_an_ellipsis() {
        assert_eq!(truncate("a-very-long-hostname.example.com", 15), "a-very-long-...");
    }

    #[test]
    fn shallow_cuts_are_hard() {
        // Only two characters over: no ellipsis, just the cut
        assert_eq!(truncate("seventeen-chars!!", 15), "seventeen-chars");
    }

    #[test]
    fn tiny_widths_never_gain_an_ellipsis() {
        assert_eq!(truncate("abcdefghij", 3), "abc");
        assert_eq!(truncate("abcdefghij", 0), "");
    }
}
