use anyhow::Result;
use clap::{Parser, Subcommand};
use distprune_check::{Config, Mode};
use log::{debug, info};
use std::io::{BufWriter, Write};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "dist-deps-prune")]
#[command(about = "Find and prune dependencies your published output never imports", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    args: Config,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report used and unused dependencies (default)
    Scan(Config),
    /// Report, and with --write save the pruned package.json
    Apply(Config),
    /// Prune package.json for publishing, optionally around --command
    Release(Config),
    /// Restore package.json from the release backup
    Restore(Config),
}

impl Commands {
    fn into_config(self) -> Config {
        match self {
            Commands::Scan(cfg) => cfg.with_mode(Mode::Scan),
            Commands::Apply(cfg) => cfg.with_mode(Mode::Apply),
            Commands::Release(cfg) => cfg.with_mode(Mode::Release),
            Commands::Restore(cfg) => cfg.with_mode(Mode::Restore),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    let cfg = match cli.command {
        Some(command) => command.into_config(),
        None => cli.args.with_mode(Mode::Scan),
    };
    debug!("Parsed CLI arguments: {:?}", cfg);

    let start = Instant::now();
    let exit_code = distprune_check::execute(&cfg, &mut stdout)?;
    stdout.flush()?;
    info!("Finished {:?} in {}ms", cfg.mode, start.elapsed().as_millis());

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
