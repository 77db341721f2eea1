use log::debug;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::manifest::{DependencyKind, DependencyMap, Manifest};

/// Package names per dependency group, each in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnusedByGroup {
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
    pub optional_dependencies: Vec<String>,
    pub peer_dependencies: Vec<String>,
}

impl UnusedByGroup {
    pub fn get(&self, kind: DependencyKind) -> &[String] {
        match kind {
            DependencyKind::Dependencies => &self.dependencies,
            DependencyKind::DevDependencies => &self.dev_dependencies,
            DependencyKind::OptionalDependencies => &self.optional_dependencies,
            DependencyKind::PeerDependencies => &self.peer_dependencies,
        }
    }

    fn get_mut(&mut self, kind: DependencyKind) -> &mut Vec<String> {
        match kind {
            DependencyKind::Dependencies => &mut self.dependencies,
            DependencyKind::DevDependencies => &mut self.dev_dependencies,
            DependencyKind::OptionalDependencies => &mut self.optional_dependencies,
            DependencyKind::PeerDependencies => &mut self.peer_dependencies,
        }
    }

    pub fn is_empty(&self) -> bool {
        DependencyKind::ALL.iter().all(|kind| self.get(*kind).is_empty())
    }

    pub fn total(&self) -> usize {
        DependencyKind::ALL.iter().map(|kind| self.get(*kind).len()).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PruneOptions {
    /// Packages imported by the scanned output
    pub used: BTreeSet<String>,
    /// Packages never reported unused, whatever the scan found
    pub keep: Vec<String>,
    pub prune_dev: bool,
    pub prune_optional: bool,
    /// Leave runtime dependencies alone when the scan was uncertain
    pub conservative: bool,
    pub has_uncertainty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrunePlan {
    pub unused: UnusedByGroup,
    pub prunable: UnusedByGroup,
    pub kept_by_rule: Vec<String>,
    pub next_manifest: Manifest,
}

fn unused_by_group(manifest: &Manifest, options: &PruneOptions, keep: &HashSet<&str>) -> UnusedByGroup {
    let mut unused = UnusedByGroup::default();
    for kind in DependencyKind::ALL {
        *unused.get_mut(kind) = manifest
            .group_names(kind)
            .into_iter()
            .filter(|name| !options.used.contains(*name) && !keep.contains(name))
            .map(String::from)
            .collect();
    }
    unused
}

fn prunable_by_group(unused: &UnusedByGroup, options: &PruneOptions) -> UnusedByGroup {
    let guarded = options.conservative && options.has_uncertainty;
    let pick = |enabled: bool, names: &[String]| if enabled && !guarded { names.to_vec() } else { Vec::new() };
    UnusedByGroup {
        dependencies: pick(true, &unused.dependencies),
        dev_dependencies: pick(options.prune_dev, &unused.dev_dependencies),
        optional_dependencies: pick(options.prune_optional, &unused.optional_dependencies),
        peer_dependencies: Vec::new(),
    }
}

fn kept_by_rule(unused: &UnusedByGroup, prunable: &UnusedByGroup, keep: &[&str], options: &PruneOptions) -> Vec<String> {
    let mut kept: Vec<String> =
        keep.iter().filter(|name| !options.used.contains(**name)).map(|name| name.to_string()).collect();
    for kind in DependencyKind::ALL {
        let removable = prunable.get(kind);
        kept.extend(unused.get(kind).iter().filter(|name| !removable.contains(*name)).cloned());
    }
    kept
}

fn next_manifest(manifest: &Manifest, prunable: &UnusedByGroup) -> Manifest {
    let mut groups: Vec<(DependencyKind, DependencyMap)> = Vec::new();
    for kind in DependencyKind::ALL {
        let Some(map) = manifest.group(kind) else { continue };
        if kind == DependencyKind::PeerDependencies {
            groups.push((kind, map.clone()));
            continue;
        }
        let remove: HashSet<&str> = prunable.get(kind).iter().map(String::as_str).collect();
        if let Some(remaining) = map.without(&remove) {
            groups.push((kind, remaining));
        }
    }
    manifest.with_groups(groups)
}

/// Decides what is unused, what may be removed, and what the manifest
/// looks like afterwards. Pure and total over any validated manifest.
pub fn build_plan(manifest: &Manifest, options: &PruneOptions) -> PrunePlan {
    let mut seen = HashSet::new();
    let keep: Vec<&str> = options.keep.iter().map(String::as_str).filter(|name| seen.insert(*name)).collect();
    let keep_set: HashSet<&str> = keep.iter().copied().collect();

    let unused = unused_by_group(manifest, options, &keep_set);
    let prunable = prunable_by_group(&unused, options);
    let kept_by_rule = kept_by_rule(&unused, &prunable, &keep, options);
    let next_manifest = next_manifest(manifest, &prunable);

    debug!(
        "Prune plan: {} unused, {} prunable, {} kept by rule",
        unused.total(),
        prunable.total(),
        kept_by_rule.len()
    );
    PrunePlan { unused, prunable, kept_by_rule, next_manifest }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn manifest(value: Value) -> Manifest {
        Manifest::from_value(value).unwrap()
    }

    fn used(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn keys(value: &Value) -> Vec<&str> {
        value.as_object().unwrap().keys().map(String::as_str).collect()
    }

    #[test]
    fn test_removes_unused_runtime_dependency() {
        let pkg = manifest(json!({
            "name": "fixture",
            "dependencies": { "a": "1.0.0", "b": "1.0.0" }
        }));
        let plan = build_plan(&pkg, &PruneOptions { used: used(&["a"]), ..Default::default() });

        assert_eq!(plan.unused.dependencies, vec!["b"]);
        assert_eq!(plan.prunable.dependencies, vec!["b"]);
        assert!(plan.kept_by_rule.is_empty());
        assert_eq!(
            plan.next_manifest.to_value(),
            json!({ "name": "fixture", "dependencies": { "a": "1.0.0" } })
        );
    }

    #[test]
    fn test_conservative_guard_protects_runtime_dependencies() {
        let pkg = manifest(json!({ "dependencies": { "a": "1.0.0", "b": "1.0.0" } }));
        let options = PruneOptions {
            used: used(&["a"]),
            conservative: true,
            has_uncertainty: true,
            ..Default::default()
        };
        let plan = build_plan(&pkg, &options);

        assert_eq!(plan.unused.dependencies, vec!["b"]);
        assert!(plan.prunable.dependencies.is_empty());
        assert_eq!(plan.kept_by_rule, vec!["b"]);
        assert_eq!(plan.next_manifest, pkg);
    }

    #[test]
    fn test_uncertainty_without_conservative_still_prunes() {
        let pkg = manifest(json!({ "dependencies": { "a": "1.0.0" } }));
        let options = PruneOptions { has_uncertainty: true, ..Default::default() };
        let plan = build_plan(&pkg, &options);
        assert_eq!(plan.prunable.dependencies, vec!["a"]);
        assert_eq!(plan.next_manifest.to_value(), json!({}));
    }

    #[test]
    fn test_keep_list_is_never_unused() {
        let pkg = manifest(json!({ "dependencies": { "a": "1", "tslib": "2" } }));
        let options = PruneOptions {
            keep: vec!["tslib".into(), "tslib".into(), "a".into(), "ghost".into()],
            used: used(&["a"]),
            ..Default::default()
        };
        let plan = build_plan(&pkg, &options);
        assert!(plan.unused.is_empty());
        assert_eq!(plan.kept_by_rule, vec!["tslib", "ghost"]);
    }

    #[test]
    fn test_dev_and_optional_require_flags() {
        let pkg = manifest(json!({
            "devDependencies": { "vitest": "1" },
            "optionalDependencies": { "fsevents": "2" }
        }));
        let plan = build_plan(&pkg, &PruneOptions::default());
        assert_eq!(plan.unused.dev_dependencies, vec!["vitest"]);
        assert!(plan.prunable.dev_dependencies.is_empty());
        assert!(plan.prunable.optional_dependencies.is_empty());
        assert_eq!(plan.kept_by_rule, vec!["vitest", "fsevents"]);

        let options = PruneOptions { prune_dev: true, prune_optional: true, ..Default::default() };
        let plan = build_plan(&pkg, &options);
        assert_eq!(plan.prunable.dev_dependencies, vec!["vitest"]);
        assert_eq!(plan.prunable.optional_dependencies, vec!["fsevents"]);
        assert_eq!(plan.next_manifest.to_value(), json!({}));
    }

    #[test]
    fn test_guard_blocks_dev_pruning_too() {
        let pkg = manifest(json!({ "devDependencies": { "vitest": "1" } }));
        let options = PruneOptions {
            prune_dev: true,
            conservative: true,
            has_uncertainty: true,
            ..Default::default()
        };
        let plan = build_plan(&pkg, &options);
        assert!(plan.prunable.is_empty());
        assert_eq!(plan.kept_by_rule, vec!["vitest"]);
    }

    #[test]
    fn test_peer_dependencies_are_reported_but_never_removed() {
        let pkg = manifest(json!({
            "peerDependencies": { "react": ">=18" },
            "name": "fixture"
        }));
        let options = PruneOptions { prune_dev: true, prune_optional: true, ..Default::default() };
        let plan = build_plan(&pkg, &options);
        assert_eq!(plan.unused.peer_dependencies, vec!["react"]);
        assert!(plan.prunable.peer_dependencies.is_empty());
        assert_eq!(plan.kept_by_rule, vec!["react"]);
        assert_eq!(plan.next_manifest.group(DependencyKind::PeerDependencies), pkg.group(DependencyKind::PeerDependencies));
    }

    #[test]
    fn test_dependency_fields_are_rebuilt_after_other_fields() {
        let pkg = manifest(json!({
            "name": "fixture",
            "peerDependencies": { "react": "18" },
            "dependencies": { "a": "1", "b": "1" },
            "version": "1.0.0",
            "devDependencies": { "c": "1" }
        }));
        let plan = build_plan(&pkg, &PruneOptions { used: used(&["a"]), ..Default::default() });
        let next = plan.next_manifest.to_value();
        assert_eq!(keys(&next), vec!["name", "version", "dependencies", "devDependencies", "peerDependencies"]);
        assert_eq!(next["dependencies"], json!({ "a": "1" }));
        assert_eq!(next["devDependencies"], json!({ "c": "1" }));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let pkg = manifest(json!({ "dependencies": { "x": "1", "y": "1", "z": "1" } }));
        let options = PruneOptions { used: used(&["y"]), keep: vec!["z".into()], ..Default::default() };
        assert_eq!(build_plan(&pkg, &options), build_plan(&pkg, &options));
    }

    #[test]
    fn test_next_manifest_never_gains_dependencies() {
        let pkg = manifest(json!({
            "dependencies": { "a": "1", "b": "1" },
            "devDependencies": { "c": "1" },
            "optionalDependencies": { "d": "1" }
        }));
        let options = PruneOptions { used: used(&["b", "d"]), prune_dev: true, prune_optional: true, ..Default::default() };
        let plan = build_plan(&pkg, &options);
        for kind in DependencyKind::ALL {
            let before: Vec<&str> = pkg.group_names(kind);
            for name in plan.next_manifest.group_names(kind) {
                assert!(before.contains(&name));
            }
            for name in plan.prunable.get(kind) {
                assert!(!plan.next_manifest.group_names(kind).contains(&name.as_str()));
                assert!(!options.used.contains(name));
            }
        }
    }
}
