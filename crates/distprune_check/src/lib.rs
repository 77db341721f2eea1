//! Commands for pruning unused dependencies from a package before release.
//!
//! This crate ties the analysis engine to the filesystem: it resolves
//! configuration, decides which directories to scan, prints reports, and
//! rewrites or restores `package.json`.
//!
//! # Examples
//!
//! ```no_run
//! use distprune_check::{Config, Mode, execute};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config {
//!     package: "package.json".into(),
//!     fail_on_unused: true,
//!     ..Default::default()
//! }
//! .with_mode(Mode::Scan);
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! let exit_code = execute(&cfg, &mut stdout)?;
//! stdout.flush()?;
//! std::process::exit(exit_code);
//! # }
//! ```

mod checker;
mod config;
mod manifest_io;
mod release;
mod reporter;
mod types;

// Re-export public API
pub use checker::{EXIT_UNUSED, execute, run_analysis};
pub use config::{
    BACKUP_FILE_NAME, CONFIG_FILE_NAME, Config, FileConfig, Mode, ResolvedConfig, include_patterns,
    load_file_config, resolve_config, resolve_roots,
};
pub use manifest_io::{read_manifest, write_manifest};
pub use release::{ensure_backup, restore_manifest, run_command, split_command_line};
pub use reporter::{build_report, print_human_report, print_json_report, render_json_report};
pub use types::{Analysis, Report};
