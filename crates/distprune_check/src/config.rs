use anyhow::{Context, Result, bail};
use clap::Args;
use distprune_core::{Manifest, infer_primary_dir, infer_roots, patterns_for_roots};
use log::{debug, trace};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const CONFIG_FILE_NAME: &str = ".dist-deps-prune.json";
pub const BACKUP_FILE_NAME: &str = ".package.json.release.bak";
const DEFAULT_DIST: &str = "dist";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Report only
    #[default]
    Scan,
    /// Report, optionally writing the pruned manifest
    Apply,
    /// Prune the manifest around a publish command
    Release,
    /// Put the backed-up manifest back
    Restore,
}

fn parse_flag_bool(value: &str) -> Result<bool, String> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(format!("Invalid boolean value: {other}")),
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct Config {
    /// Directory of built output to scan (inferred from package.json when omitted)
    #[arg(long)]
    pub dist: Option<PathBuf>,

    /// Path to package.json
    #[arg(long, default_value = "package.json")]
    pub package: PathBuf,

    /// Path to the config file (defaults to .dist-deps-prune.json next to package.json)
    #[arg(long)]
    pub ignore: Option<PathBuf>,

    /// Packages to never report as unused
    #[arg(long, value_delimiter = ',')]
    pub keep: Vec<String>,

    /// Glob patterns selecting the files to scan
    #[arg(long, value_delimiter = ',')]
    pub patterns: Option<Vec<String>>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Print nothing
    #[arg(long)]
    pub silent: bool,

    /// Fail on the first file that cannot be parsed
    #[arg(long)]
    pub strict: bool,

    /// Keep runtime dependencies when dynamic imports or parse errors were found
    #[arg(long)]
    pub conservative: bool,

    /// Exit with code 2 when unused dependencies or devDependencies are found
    #[arg(long)]
    pub fail_on_unused: bool,

    /// Also prune unused devDependencies (default: only for release)
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = parse_flag_bool)]
    pub prune_dev: Option<bool>,

    /// Also prune unused optionalDependencies
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = parse_flag_bool)]
    pub prune_optional: Option<bool>,

    /// Write the pruned package.json (apply)
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = parse_flag_bool)]
    pub write: Option<bool>,

    /// Command to run while package.json is pruned (release)
    #[arg(long = "command")]
    pub release_command: Option<String>,

    /// Maximum number of roots scanned in parallel
    #[arg(long)]
    pub jobs: Option<usize>,

    #[clap(skip)]
    pub mode: Mode,
}

impl Config {
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn package_dir(&self) -> &Path {
        self.package.parent().unwrap_or_else(|| Path::new(""))
    }

    pub fn config_path(&self) -> PathBuf {
        self.ignore.clone().unwrap_or_else(|| self.package_dir().join(CONFIG_FILE_NAME))
    }

    pub fn backup_path(&self) -> PathBuf {
        self.package_dir().join(BACKUP_FILE_NAME)
    }

    pub fn should_write(&self) -> bool {
        self.write.unwrap_or(false)
    }

    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(rayon::current_num_threads).max(1)
    }
}

/// Settings read from `.dist-deps-prune.json`. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub keep: Option<Vec<String>>,
    pub ignore_patterns: Option<Vec<String>>,
    pub prune_dev: Option<bool>,
    pub prune_optional: Option<bool>,
    pub patterns: Option<Vec<String>>,
}

/// Reads the config file. A missing file is only an error when the user
/// named it explicitly.
pub fn load_file_config(path: &Path, explicit: bool) -> Result<Option<FileConfig>> {
    if !path.exists() {
        if explicit {
            bail!("Config file not found: {}", path.display());
        }
        trace!("No config file at {}", path.display());
        return Ok(None);
    }
    debug!("Loading config file: {}", path.display());
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(Some(config))
}

/// Effective settings after merging CLI flags over the config file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// `None` means per-root defaults
    pub patterns: Option<Vec<String>>,
    pub ignore_patterns: Vec<String>,
    pub keep: Vec<String>,
    pub prune_dev: bool,
    pub prune_optional: bool,
}

fn clean_list(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()).map(String::from).collect()
}

fn unique(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}

pub fn resolve_config(cfg: &Config, file: Option<&FileConfig>) -> ResolvedConfig {
    let patterns = cfg
        .patterns
        .as_deref()
        .map(clean_list)
        .or_else(|| file.and_then(|f| f.patterns.clone()));

    let mut keep = file.and_then(|f| f.keep.clone()).unwrap_or_default();
    keep.extend(clean_list(&cfg.keep));

    ResolvedConfig {
        patterns,
        ignore_patterns: file.and_then(|f| f.ignore_patterns.clone()).unwrap_or_default(),
        keep: unique(keep),
        prune_dev: cfg
            .prune_dev
            .or_else(|| file.and_then(|f| f.prune_dev))
            .unwrap_or(cfg.mode == Mode::Release),
        prune_optional: cfg
            .prune_optional
            .or_else(|| file.and_then(|f| f.prune_optional))
            .unwrap_or(false),
    }
}

/// Directories to scan: `--dist` when given, otherwise every directory listed
/// in `files` when there are several, otherwise the single inferred directory.
pub fn resolve_roots(cfg: &Config, manifest: &Manifest) -> Vec<PathBuf> {
    if let Some(dist) = &cfg.dist {
        debug!("Using explicit dist directory: {}", dist.display());
        return vec![dist.clone()];
    }

    let base = cfg.package_dir();
    let roots = infer_roots(manifest);
    if roots.len() > 1 {
        debug!("Inferred {} roots from files: {:?}", roots.len(), roots);
        return roots.iter().map(|root| base.join(root)).collect();
    }

    let dir = infer_primary_dir(manifest)
        .or_else(|| roots.into_iter().next())
        .unwrap_or_else(|| DEFAULT_DIST.to_string());
    debug!("Using dist directory: {}", dir);
    vec![base.join(dir)]
}

/// Configured patterns, or the default script and declaration globs under
/// each root.
pub fn include_patterns(resolved: &ResolvedConfig, roots: &[PathBuf]) -> Vec<String> {
    match &resolved.patterns {
        Some(patterns) => patterns.clone(),
        None => {
            let roots: Vec<String> =
                roots.iter().map(|root| root.to_string_lossy().replace('\\', "/")).collect();
            patterns_for_roots(&roots)
        }
    }
}
