//! Guessing which directories hold a package's published output.
//!
//! Two independent modes:
//!
//! - [`infer_primary_dir`] picks one top-level directory from the manifest's
//!   entrypoints (`main`, `module`, `types`, `typings`, `bin`, `exports`),
//!   falling back to the `files` list.
//! - [`infer_roots`] lists every directory named by `files`, which is what
//!   actually ends up in the tarball.

use log::debug;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::constants::{DEFAULT_PATTERN_SUFFIXES, SCRIPT_EXTENSIONS};
use crate::glob::normalize_path;
use crate::manifest::Manifest;

const ENTRYPOINT_FIELDS: &[&str] = &["main", "module", "types", "typings"];

fn has_wildcard(value: &str) -> bool {
    value.contains(['*', '?'])
}

fn without_leading_slash(value: &str) -> &str {
    value.strip_prefix('/').unwrap_or(value)
}

fn is_dot_segment(value: &str) -> bool {
    matches!(value, "" | "." | "..")
}

fn is_script(path: &str) -> bool {
    let lower = path.replace('\\', "/").to_lowercase();
    SCRIPT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// First directory segment of an entrypoint path, if the file sits inside one.
fn top_level_from_path(value: &str) -> Option<String> {
    let normalized = normalize_path(value);
    let mut segments = without_leading_slash(&normalized).split('/');
    let first = segments.next()?;
    if is_dot_segment(first) || has_wildcard(first) {
        return None;
    }
    segments.next()?;
    Some(first.to_string())
}

/// First directory segment of a `files` entry. A bare single segment counts
/// as a directory unless it looks like a file name.
fn top_level_from_files_entry(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.starts_with('!') {
        return None;
    }
    let normalized = normalize_path(trimmed);
    let sanitized = without_leading_slash(&normalized);
    if is_dot_segment(sanitized) {
        return None;
    }
    let (first, rest) = match sanitized.split_once('/') {
        Some((first, rest)) => (first, Some(rest)),
        None => (sanitized, None),
    };
    if has_wildcard(first) {
        return None;
    }
    if rest.is_some() || !first.contains('.') {
        return Some(first.to_string());
    }
    None
}

/// Full directory path named by a `files` entry: wildcard suffixes are cut
/// and a trailing file name is dropped.
fn root_from_files_entry(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.starts_with('!') {
        return None;
    }
    let normalized = normalize_path(trimmed);
    let sanitized = without_leading_slash(&normalized);
    if is_dot_segment(sanitized) {
        return None;
    }

    let prefix = match sanitized.find(['*', '?']) {
        Some(index) => &sanitized[..index],
        None => sanitized,
    };
    let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
    if is_dot_segment(prefix) {
        return None;
    }

    match prefix.rsplit_once('/') {
        Some((parent, last)) if last.contains('.') => Some(parent.to_string()),
        Some(_) => Some(prefix.to_string()),
        None if prefix.contains('.') => None,
        None => Some(prefix.to_string()),
    }
}

fn string_field(manifest: &Manifest, key: &str) -> Vec<String> {
    match manifest.field(key) {
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn bin_paths(manifest: &Manifest) -> Vec<String> {
    match manifest.field("bin") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Object(map)) => map.values().filter_map(|v| v.as_str().map(String::from)).collect(),
        _ => Vec::new(),
    }
}

fn collect_export_paths(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|item| collect_export_paths(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_export_paths(item, out)),
        _ => {}
    }
}

fn entrypoint_paths(manifest: &Manifest) -> Vec<String> {
    let mut paths: Vec<String> =
        ENTRYPOINT_FIELDS.iter().flat_map(|key| string_field(manifest, key)).collect();
    paths.extend(bin_paths(manifest));
    if let Some(exports) = manifest.field("exports") {
        collect_export_paths(exports, &mut paths);
    }
    paths
}

fn files_entries(manifest: &Manifest) -> Vec<&str> {
    match manifest.field("files") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Distinct values in first-seen order.
fn unique(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values.iter().filter(|v| seen.insert(v.as_str())).cloned().collect()
}

/// Highest count wins; ties go to the smallest string.
fn most_frequent(values: &[String]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(a, a_count), (b, b_count)| a_count.cmp(b_count).then_with(|| b.cmp(a)))
        .map(|(value, _)| value.to_string())
}

fn choose_candidate(primary: &[String], secondary: &[String]) -> Option<String> {
    if primary.is_empty() {
        return None;
    }
    let distinct = unique(primary);
    if let [only] = distinct.as_slice() {
        return Some(only.clone());
    }
    let narrowed: Vec<&String> = distinct.iter().filter(|d| secondary.contains(d)).collect();
    if let [only] = narrowed.as_slice() {
        return Some((*only).clone());
    }
    most_frequent(primary)
}

/// The single top-level output directory suggested by the manifest.
///
/// Directories of script entrypoints win over directories of any
/// entrypoint, which win over the `files` list.
pub fn infer_primary_dir(manifest: &Manifest) -> Option<String> {
    let entrypoints = entrypoint_paths(manifest);
    let script_dirs: Vec<String> =
        entrypoints.iter().filter(|p| is_script(p)).filter_map(|p| top_level_from_path(p)).collect();
    let entry_dirs: Vec<String> = entrypoints.iter().filter_map(|p| top_level_from_path(p)).collect();
    let files_dirs: Vec<String> =
        files_entries(manifest).into_iter().filter_map(top_level_from_files_entry).collect();

    let chosen = choose_candidate(&script_dirs, &files_dirs)
        .or_else(|| choose_candidate(&entry_dirs, &files_dirs))
        .or_else(|| most_frequent(&files_dirs));
    debug!("Inferred primary dist directory: {:?}", chosen);
    chosen
}

/// Every distinct directory named in `files`, in first-seen order.
/// Negated entries and bare file names contribute nothing.
pub fn infer_roots(manifest: &Manifest) -> Vec<String> {
    let roots: Vec<String> =
        files_entries(manifest).into_iter().filter_map(root_from_files_entry).collect();
    unique(&roots)
}

/// Default scan patterns for each root, deduplicated.
pub fn patterns_for_roots<S: AsRef<str>>(roots: &[S]) -> Vec<String> {
    let patterns: Vec<String> = roots
        .iter()
        .flat_map(|root| {
            let root = root.as_ref().trim_end_matches('/');
            DEFAULT_PATTERN_SUFFIXES.iter().map(move |suffix| format!("{root}/{suffix}"))
        })
        .collect();
    unique(&patterns)
}
