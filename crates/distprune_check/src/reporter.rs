use std::io::{self, Write};

use colored::Colorize;
use distprune_core::{PrunePlan, ScanOutcome, ScanStats, UnusedByGroup, Warning};
use log::debug;
use serde::Serialize;

use crate::types::Report;

fn sort_unique(values: &[String]) -> Vec<String> {
    let mut sorted = values.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
}

pub fn build_report(outcome: &ScanOutcome, plan: &PrunePlan) -> Report {
    Report {
        used: outcome.used.iter().cloned().collect(),
        unused: UnusedByGroup {
            dependencies: sort_unique(&plan.unused.dependencies),
            dev_dependencies: sort_unique(&plan.unused.dev_dependencies),
            optional_dependencies: sort_unique(&plan.unused.optional_dependencies),
            peer_dependencies: sort_unique(&plan.unused.peer_dependencies),
        },
        kept_by_rule: sort_unique(&plan.kept_by_rule),
        warnings: outcome.warnings.clone(),
        stats: outcome.stats,
    }
}

fn write_list<W: Write>(writer: &mut W, title: &str, values: &[String]) -> io::Result<()> {
    if values.is_empty() {
        return writeln!(writer, "{}: {}", title.bold(), "(none)".dimmed());
    }
    writeln!(writer, "{}:", title.bold())?;
    for value in values {
        writeln!(writer, "  - {}", value)?;
    }
    Ok(())
}

fn format_warning(warning: &Warning) -> String {
    format!("[{}] {}: {}", warning.kind().yellow(), warning.file().blue(), warning.detail())
}

pub fn print_human_report<W: Write>(writer: &mut W, report: &Report) -> io::Result<()> {
    debug!("Printing human report");
    write_list(writer, "USED", &report.used)?;
    write_list(writer, "Unused dependencies", &report.unused.dependencies)?;
    write_list(writer, "Unused devDependencies", &report.unused.dev_dependencies)?;
    write_list(writer, "Unused optionalDependencies", &report.unused.optional_dependencies)?;
    write_list(writer, "Peer dependencies (reported only)", &report.unused.peer_dependencies)?;

    if report.warnings.is_empty() {
        writeln!(writer, "{}: {}", "Warnings".bold(), "(none)".dimmed())?;
    } else {
        writeln!(writer, "{}:", "Warnings".bold())?;
        for warning in &report.warnings {
            writeln!(writer, "  - {}", format_warning(warning))?;
        }
    }

    writeln!(
        writer,
        "{}: filesScanned={}, importsFound={}",
        "Stats".bold(),
        report.stats.files_scanned.to_string().cyan(),
        report.stats.imports_found.to_string().cyan()
    )?;
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonUnused<'a> {
    dependencies: &'a [String],
    dev_dependencies: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    used: &'a [String],
    unused: JsonUnused<'a>,
    kept_by_rule: &'a [String],
    warnings: &'a [Warning],
    stats: ScanStats,
}

pub fn render_json_report(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        used: &report.used,
        unused: JsonUnused {
            dependencies: &report.unused.dependencies,
            dev_dependencies: &report.unused.dev_dependencies,
        },
        kept_by_rule: &report.kept_by_rule,
        warnings: &report.warnings,
        stats: report.stats,
    })
}

pub fn print_json_report<W: Write>(writer: &mut W, report: &Report) -> io::Result<()> {
    debug!("Printing JSON report");
    let payload = render_json_report(report).map_err(io::Error::other)?;
    writeln!(writer, "{}", payload)?;
    writer.flush()?;
    Ok(())
}
