use anyhow::{Context, Result};
use distprune_core::{
    PruneOptions, ScanSettings, build_plan, ensure_no_dev_dependencies_in_dist, node_builtins,
    scan_roots,
};
use log::{debug, info};
use std::{env, io::Write};

use crate::{
    config::{Config, Mode, include_patterns, load_file_config, resolve_config, resolve_roots},
    manifest_io::{read_manifest, write_manifest},
    release::{ensure_backup, restore_manifest, run_command},
    reporter::{build_report, print_human_report, print_json_report},
    types::{Analysis, Report},
};

/// Exit code for `--fail-on-unused` when something unused was found
pub const EXIT_UNUSED: i32 = 2;

/// Reads the manifest, scans the output and plans the prune. Writes nothing.
pub fn run_analysis(cfg: &Config) -> Result<Analysis> {
    info!("Starting analysis of {}", cfg.package.display());
    let manifest = read_manifest(&cfg.package)?;

    let file_config = load_file_config(&cfg.config_path(), cfg.ignore.is_some())?;
    let resolved = resolve_config(cfg, file_config.as_ref());
    debug!("Resolved config: {:?}", resolved);

    let roots = resolve_roots(cfg, &manifest);
    let include = include_patterns(&resolved, &roots);
    debug!("Scanning {:?} with patterns {:?}", roots, include);

    let settings = ScanSettings::new(&include, &resolved.ignore_patterns, cfg.strict, node_builtins())?;
    let outcome = scan_roots(&roots, &settings, cfg.jobs())?;
    info!(
        "Scanned {} files, found {} imports of {} packages",
        outcome.stats.files_scanned,
        outcome.stats.imports_found,
        outcome.used.len()
    );

    ensure_no_dev_dependencies_in_dist(&outcome.used, &manifest)?;

    let plan = build_plan(
        &manifest,
        &PruneOptions {
            used: outcome.used.clone(),
            keep: resolved.keep,
            prune_dev: resolved.prune_dev,
            prune_optional: resolved.prune_optional,
            conservative: cfg.conservative,
            has_uncertainty: outcome.has_uncertainty(),
        },
    );
    let report = build_report(&outcome, &plan);
    Ok(Analysis { report, plan })
}

fn emit<W: Write>(out: &mut W, cfg: &Config, report: &Report) -> Result<()> {
    if cfg.silent {
        return Ok(());
    }
    if cfg.json {
        print_json_report(out, report)?;
    } else {
        print_human_report(out, report)?;
    }
    Ok(())
}

fn release<W: Write>(cfg: &Config, out: &mut W) -> Result<i32> {
    let Analysis { report, plan } = run_analysis(cfg)?;
    let backup = cfg.backup_path();

    if let Some(command) = &cfg.release_command {
        ensure_backup(&cfg.package, &backup)?;
        write_manifest(&cfg.package, &plan.next_manifest)?;
        let cwd = env::current_dir().context("Failed to read current directory");
        let exit_code = cwd.and_then(|cwd| run_command(command, &cwd));
        restore_manifest(&cfg.package, &backup)?;
        let exit_code = exit_code?;
        emit(out, cfg, &report)?;
        return Ok(exit_code);
    }

    ensure_backup(&cfg.package, &backup)?;
    write_manifest(&cfg.package, &plan.next_manifest)?;
    emit(out, cfg, &report)?;
    if !cfg.json && !cfg.silent {
        writeln!(
            out,
            "package.json modified for release. Restore with: dist-deps-prune restore --package {}",
            cfg.package.display()
        )?;
        out.flush()?;
    }
    Ok(0)
}

/// Runs the command selected by `cfg.mode` and returns the process exit code.
pub fn execute<W: Write>(cfg: &Config, out: &mut W) -> Result<i32> {
    debug!("Executing {:?}", cfg.mode);
    match cfg.mode {
        Mode::Scan => {
            let Analysis { report, .. } = run_analysis(cfg)?;
            emit(out, cfg, &report)?;
            Ok(if cfg.fail_on_unused && report.has_unused() { EXIT_UNUSED } else { 0 })
        }
        Mode::Apply => {
            let Analysis { report, plan } = run_analysis(cfg)?;
            if cfg.should_write() {
                write_manifest(&cfg.package, &plan.next_manifest)?;
                info!("Wrote pruned manifest to {}", cfg.package.display());
            }
            emit(out, cfg, &report)?;
            Ok(0)
        }
        Mode::Release => release(cfg, out),
        Mode::Restore => {
            restore_manifest(&cfg.package, &cfg.backup_path())?;
            emit(out, cfg, &Report::default())?;
            Ok(0)
        }
    }
}
