//! Constants shared by scanning and dist inference.
//!
//! ## Scanned output
//!
//! Built packages ship `.js`, `.mjs` (ES module), `.cjs` (CommonJS) and
//! `.d.ts` declaration files. These are the files scanned when no explicit
//! patterns are configured.

use std::collections::HashSet;

/// Glob suffixes appended to every scan root when no patterns are configured
pub const DEFAULT_PATTERN_SUFFIXES: &[&str] = &[
    "**/*.js",   // JavaScript
    "**/*.mjs",  // JavaScript module
    "**/*.cjs",  // JavaScript CommonJS
    "**/*.d.ts", // Type declarations
];

/// Entrypoint extensions that mark a directory as holding runnable output
pub const SCRIPT_EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs", ".node"];

/// Declaration file suffixes, parsed leniently
pub const DECLARATION_SUFFIXES: &[&str] = &[".d.ts", ".d.mts", ".d.cts"];

/// Prefix under which Node exposes its builtin modules
pub const NODE_PROTOCOL: &str = "node:";

/// Node.js builtin module names without the `node:` prefix
pub const NODE_BUILTINS: &[&str] = &[
    "_http_agent",
    "_http_client",
    "_http_common",
    "_http_incoming",
    "_http_outgoing",
    "_http_server",
    "_stream_duplex",
    "_stream_passthrough",
    "_stream_readable",
    "_stream_transform",
    "_stream_wrap",
    "_stream_writable",
    "_tls_common",
    "_tls_wrap",
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "inspector/promises",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "sea",
    "sqlite",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "test",
    "test/reporters",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Owned set of [`NODE_BUILTINS`] for use with the specifier normalizer
pub fn node_builtins() -> HashSet<String> {
    NODE_BUILTINS.iter().map(|name| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_have_no_protocol_prefix() {
        for name in NODE_BUILTINS {
            assert!(!name.starts_with(NODE_PROTOCOL), "builtin '{}' keeps its prefix", name);
        }
    }

    #[test]
    fn test_builtins_include_common_modules() {
        let builtins = node_builtins();
        for name in ["fs", "path", "url", "child_process", "fs/promises"] {
            assert!(builtins.contains(name), "missing builtin '{}'", name);
        }
        assert_eq!(builtins.len(), NODE_BUILTINS.len());
    }

    #[test]
    fn test_default_patterns_cover_declarations() {
        assert_eq!(DEFAULT_PATTERN_SUFFIXES.len(), 4);
        assert!(DEFAULT_PATTERN_SUFFIXES.contains(&"**/*.d.ts"));
    }
}
