use dashmap::DashMap;
use ignore::WalkBuilder;
use log::{debug, info, trace, warn};
use rayon::prelude::*;
use std::{
    collections::HashSet,
    fs, io,
    path::{Component, Path, PathBuf},
    thread,
};

use crate::{
    error::{Error, Result},
    glob::{FileFilter, normalize_path},
    normalize::normalize_specifier,
    parser::{ParseFailure, ParsedImports, extract_imports},
    types::{ScanOutcome, ScanStats, Warning},
};

/// Parse results keyed by absolute file path, shared between root scans.
pub type ImportCache = DashMap<PathBuf, std::result::Result<ParsedImports, ParseFailure>>;

/// How files under a root are selected and how their imports are judged.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub filter: FileFilter,
    /// Abort on the first file that fails to parse
    pub strict: bool,
    pub builtins: HashSet<String>,
}

impl ScanSettings {
    pub fn new<S: AsRef<str>>(
        include: &[S],
        exclude: &[S],
        strict: bool,
        builtins: HashSet<String>,
    ) -> Result<Self> {
        Ok(Self { filter: FileFilter::new(include, exclude)?, strict, builtins })
    }
}

/// Relative path from `base` to `target`. Both must be absolute and clean.
fn make_relative(target: &Path, base: &Path) -> PathBuf {
    let target_parts: Vec<Component> = target.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = target_parts.iter().zip(&base_parts).take_while(|(t, b)| t == b).count();

    let mut result = PathBuf::new();
    for _ in common..base_parts.len() {
        result.push("..");
    }
    for part in &target_parts[common..] {
        result.push(part.as_os_str());
    }
    if result.as_os_str().is_empty() { PathBuf::from(".") } else { result }
}

fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    path_clean::clean(cwd.join(path))
}

fn slash_string(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}

/// The spellings a glob may match a file by: absolute, relative to the
/// working directory, relative to the scan root.
fn candidates_for(file: &Path, root: &Path, cwd: &Path) -> [String; 3] {
    let absolute = absolutize(file, cwd);
    let root_abs = absolutize(root, cwd);
    let relative_to_root = absolute
        .strip_prefix(&root_abs)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| make_relative(&absolute, &root_abs));
    [
        slash_string(&absolute),
        slash_string(&make_relative(&absolute, cwd)),
        slash_string(&relative_to_root),
    ]
}

/// Files under `root` selected by the filter, in walk order.
pub fn collect_files(root: &Path, filter: &FileFilter, cwd: &Path) -> Result<Vec<PathBuf>> {
    debug!("Walking scan root: {}", root.display());
    // Build output is normally gitignored, so no ignore files are honored.
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        if filter.selects(&candidates_for(path, root, cwd)) {
            trace!("Selected {}", path.display());
            files.push(path.to_path_buf());
        } else {
            trace!("Skipped {}", path.display());
        }
    }
    debug!("Selected {} files under {}", files.len(), root.display());
    Ok(files)
}

fn imports_for(
    file: &Path,
    cwd: &Path,
    cache: &ImportCache,
) -> Result<std::result::Result<ParsedImports, ParseFailure>> {
    let key = absolutize(file, cwd);
    if let Some(hit) = cache.get(&key) {
        trace!("Cache hit for imports: {}", file.display());
        return Ok(hit.clone());
    }
    let bytes = fs::read(file).map_err(|e| Error::io(file, e))?;
    let source = String::from_utf8_lossy(&bytes);
    let parsed = extract_imports(&source, &slash_string(file));
    cache.insert(key, parsed.clone());
    Ok(parsed)
}

/// Scans a single file into an outcome of its own.
pub fn scan_file(
    file: &Path,
    settings: &ScanSettings,
    cwd: &Path,
    cache: &ImportCache,
) -> Result<ScanOutcome> {
    let name = slash_string(file);
    let parsed = match imports_for(file, cwd, cache)? {
        Ok(parsed) => parsed,
        Err(failure) => {
            if settings.strict {
                return Err(Error::Parse { file: name, error: failure.message });
            }
            warn!("Could not parse {}: {}", name, failure.message);
            return Ok(ScanOutcome {
                warnings: vec![Warning::ParseError { file: name, error: failure.message }],
                stats: ScanStats { files_scanned: 1, imports_found: 0 },
                ..ScanOutcome::empty()
            });
        }
    };

    let mut warnings: Vec<Warning> = parsed
        .dynamic_imports
        .iter()
        .map(|expr| Warning::DynamicImport { file: name.clone(), expr: expr.clone() })
        .collect();
    warnings.extend(
        parsed
            .dynamic_requires
            .iter()
            .map(|expr| Warning::DynamicRequire { file: name.clone(), expr: expr.clone() }),
    );

    let used = parsed
        .static_specifiers
        .iter()
        .filter_map(|specifier| normalize_specifier(specifier, &settings.builtins))
        .collect();

    Ok(ScanOutcome {
        used,
        warnings,
        stats: ScanStats { files_scanned: 1, imports_found: parsed.static_specifiers.len() },
    })
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| Error::io(".", e))
}

/// Scans one root, reusing parse results from `cache`.
pub fn scan_with_cache(
    root: &Path,
    settings: &ScanSettings,
    cache: &ImportCache,
) -> Result<ScanOutcome> {
    if !root.exists() {
        return Err(Error::DistNotFound { path: root.to_path_buf() });
    }
    if !root.is_dir() {
        let source = io::Error::new(io::ErrorKind::NotADirectory, "scan root is not a directory");
        return Err(Error::io(root, source));
    }
    let cwd = current_dir()?;
    let files = collect_files(root, &settings.filter, &cwd)?;

    let mut outcome = ScanOutcome::empty();
    for file in &files {
        outcome = outcome.merge(scan_file(file, settings, &cwd, cache)?);
    }
    info!(
        "Scanned {} files under {}: {} packages used, {} warnings",
        outcome.stats.files_scanned,
        root.display(),
        outcome.used.len(),
        outcome.warnings.len()
    );
    Ok(outcome)
}

/// Scans one root for the external packages its files import.
pub fn scan(root: &Path, settings: &ScanSettings) -> Result<ScanOutcome> {
    scan_with_cache(root, settings, &ImportCache::new())
}

/// Scans every root on at most `jobs` worker threads and merges the
/// outcomes in root order. Files reachable from several roots are parsed once.
pub fn scan_roots<P: AsRef<Path> + Sync>(
    roots: &[P],
    settings: &ScanSettings,
    jobs: usize,
) -> Result<ScanOutcome> {
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs.max(1)).build()?;
    let cache = ImportCache::new();
    info!("Scanning {} roots with {} workers", roots.len(), pool.current_num_threads());

    let outcomes = pool.install(|| {
        roots
            .par_iter()
            .map(|root| {
                debug!("Thread {:?} scanning root: {}", thread::current().id(), root.as_ref().display());
                scan_with_cache(root.as_ref(), settings, &cache)
            })
            .collect::<Result<Vec<_>>>()
    })?;
    Ok(outcomes.into_iter().collect())
}
