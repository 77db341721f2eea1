//! Analysis engine for pruning unused dependencies from a built package.
//!
//! This crate works out which declared dependencies the published output
//! actually imports:
//! - Extracting import specifiers from built JS and declaration files
//! - Normalizing specifiers to package names
//! - Selecting files with include/exclude globs
//! - Inferring output directories from `package.json`
//! - Computing the prune plan and the rewritten manifest

mod constants;
mod dist_path;
mod error;
mod glob;
mod guard;
mod manifest;
mod normalize;
mod parser;
mod prune;
mod scan;
mod types;

// Re-export public API
pub use constants::{DEFAULT_PATTERN_SUFFIXES, NODE_BUILTINS, node_builtins};
pub use dist_path::{infer_primary_dir, infer_roots, patterns_for_roots};
pub use error::{Error, Result};
pub use glob::{FileFilter, GlobMatcher};
pub use guard::{ensure_no_dev_dependencies_in_dist, list_dev_dependencies_used_in_dist};
pub use manifest::{DependencyKind, DependencyMap, Manifest};
pub use normalize::normalize_specifier;
pub use parser::{ParseFailure, ParsedImports, extract_imports, is_declaration_file};
pub use prune::{PruneOptions, PrunePlan, UnusedByGroup, build_plan};
pub use scan::{ImportCache, ScanSettings, collect_files, scan, scan_file, scan_roots, scan_with_cache};
pub use types::{ScanOutcome, ScanStats, Warning};
