use std::collections::{BTreeSet, HashSet};

use crate::error::{Error, Result};
use crate::manifest::{DependencyKind, Manifest};

/// devDependencies imported by the output that no runtime group declares,
/// sorted by name.
pub fn list_dev_dependencies_used_in_dist(used: &BTreeSet<String>, manifest: &Manifest) -> Vec<String> {
    let runtime: HashSet<&str> = [
        DependencyKind::Dependencies,
        DependencyKind::PeerDependencies,
        DependencyKind::OptionalDependencies,
    ]
    .into_iter()
    .flat_map(|kind| manifest.group_names(kind))
    .collect();

    let mut hits: Vec<String> = manifest
        .group_names(DependencyKind::DevDependencies)
        .into_iter()
        .filter(|name| used.contains(*name) && !runtime.contains(name))
        .map(String::from)
        .collect();
    hits.sort();
    hits
}

/// Fails when the published output would import a package that consumers
/// never install.
pub fn ensure_no_dev_dependencies_in_dist(used: &BTreeSet<String>, manifest: &Manifest) -> Result<()> {
    let packages = list_dev_dependencies_used_in_dist(used, manifest);
    if packages.is_empty() { Ok(()) } else { Err(Error::DevDependencyInDist { packages }) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn used(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lists_dev_only_hits_sorted() {
        let pkg = Manifest::from_value(json!({
            "dependencies": { "react": "18" },
            "devDependencies": { "zod": "3", "react": "18", "vite": "5", "unused": "1" }
        }))
        .unwrap();
        let hits = list_dev_dependencies_used_in_dist(&used(&["react", "zod", "vite"]), &pkg);
        assert_eq!(hits, vec!["vite", "zod"]);
    }

    #[test]
    fn test_peer_and_optional_count_as_runtime() {
        let pkg = Manifest::from_value(json!({
            "peerDependencies": { "a": "1" },
            "optionalDependencies": { "b": "1" },
            "devDependencies": { "a": "1", "b": "1" }
        }))
        .unwrap();
        assert!(list_dev_dependencies_used_in_dist(&used(&["a", "b"]), &pkg).is_empty());
        assert!(ensure_no_dev_dependencies_in_dist(&used(&["a", "b"]), &pkg).is_ok());
    }

    #[test]
    fn test_guard_error_names_packages() {
        let pkg = Manifest::from_value(json!({ "devDependencies": { "vite": "5" } })).unwrap();
        let err = ensure_no_dev_dependencies_in_dist(&used(&["vite"]), &pkg).unwrap_err();
        assert!(matches!(&err, Error::DevDependencyInDist { packages } if packages == &vec!["vite".to_string()]));
    }

    #[test]
    fn test_no_dev_dependencies() {
        let pkg = Manifest::from_value(json!({ "name": "x" })).unwrap();
        assert!(list_dev_dependencies_used_in_dist(&used(&["a"]), &pkg).is_empty());
    }
}
