use std::collections::HashSet;

use crate::constants::NODE_PROTOCOL;

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

fn is_absolute(specifier: &str) -> bool {
    if specifier.starts_with('/') {
        return true;
    }
    // Windows drive paths: C:\ or C:/
    let bytes = specifier.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'/' | b'\\')
}

fn is_non_package(specifier: &str) -> bool {
    specifier.starts_with('#') || specifier.starts_with("data:") || specifier.starts_with("http:")
}

fn is_builtin(specifier: &str, builtins: &HashSet<String>) -> bool {
    let first_segment = specifier.split('/').next().unwrap_or(specifier);
    builtins.contains(specifier) || builtins.contains(first_segment)
}

/// Maps an import specifier to the package that provides it.
///
/// `lodash/get` → `lodash`, `@scope/pkg/sub` → `@scope/pkg`. Relative and
/// absolute paths, `#` aliases, `data:`/`http:` URIs and Node builtins (with or
/// without the `node:` prefix) are not external and yield `None`.
pub fn normalize_specifier(specifier: &str, builtins: &HashSet<String>) -> Option<String> {
    let specifier = specifier.trim();
    if specifier.is_empty()
        || is_relative(specifier)
        || is_absolute(specifier)
        || is_non_package(specifier)
    {
        return None;
    }

    let bare = specifier.strip_prefix(NODE_PROTOCOL).unwrap_or(specifier);
    if is_builtin(bare, builtins) {
        return None;
    }

    let mut segments = bare.split('/');
    let head = segments.next().filter(|s| !s.is_empty())?;
    if head.starts_with('@') {
        let name = segments.next().filter(|s| !s.is_empty())?;
        if head.len() <= 1 {
            return None;
        }
        return Some(format!("{head}/{name}"));
    }
    Some(head.to_string())
}
