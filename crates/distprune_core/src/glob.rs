use log::trace;
use regex::Regex;

use crate::error::{Error, Result};

/// Converts backslash separators to `/` and strips a leading `./`.
pub(crate) fn normalize_path(value: &str) -> String {
    let slashed = value.replace('\\', "/");
    match slashed.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => slashed,
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = normalize_path(pattern).chars().collect();
    let mut regex = String::from("^");
    let mut index = 0;

    while index < chars.len() {
        match chars[index] {
            '*' if chars.get(index + 1) == Some(&'*') => {
                if chars.get(index + 2) == Some(&'/') {
                    // `**/` may match no directory at all
                    regex.push_str("(?:.*/)?");
                    index += 3;
                } else {
                    regex.push_str(".*");
                    index += 2;
                }
            }
            '*' => {
                regex.push_str("[^/]*");
                index += 1;
            }
            '?' => {
                regex.push_str("[^/]");
                index += 1;
            }
            c => {
                let mut buf = [0u8; 4];
                regex.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                index += 1;
            }
        }
    }

    regex.push('$');
    regex
}

/// A compiled set of glob patterns. A path matches when any pattern matches it
/// in full.
#[derive(Debug, Clone, Default)]
pub struct GlobMatcher {
    patterns: Vec<Regex>,
}

impl GlobMatcher {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                let source = glob_to_regex(pattern);
                trace!("Compiled glob '{}' to /{}/", pattern, source);
                Regex::new(&source)
                    .map_err(|source| Error::Glob { pattern: pattern.to_string(), source })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        let normalized = normalize_path(candidate);
        self.patterns.iter().any(|re| re.is_match(&normalized))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Include/exclude pair applied to every file found under a scan root.
#[derive(Debug, Clone)]
pub struct FileFilter {
    include: GlobMatcher,
    exclude: GlobMatcher,
}

impl FileFilter {
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self { include: GlobMatcher::compile(include)?, exclude: GlobMatcher::compile(exclude)? })
    }

    /// `candidates` are alternative spellings of the same file (absolute,
    /// root-relative, cwd-relative). The file is selected when some spelling
    /// is included and no spelling is excluded.
    pub fn selects<S: AsRef<str>>(&self, candidates: &[S]) -> bool {
        let included = candidates.iter().any(|c| self.include.is_match(c.as_ref()));
        included && !candidates.iter().any(|c| self.exclude.is_match(c.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> GlobMatcher {
        GlobMatcher::compile(patterns).unwrap()
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let m = matcher(&["dist/*.js"]);
        assert!(m.is_match("dist/index.js"));
        assert!(!m.is_match("dist/esm/index.js"));
    }

    #[test]
    fn test_double_star_slash_matches_zero_segments() {
        let m = matcher(&["a/**/b"]);
        assert!(m.is_match("a/b"));
        assert!(m.is_match("a/x/b"));
        assert!(m.is_match("a/x/y/b"));
        assert!(!m.is_match("a/xb"));
    }

    #[test]
    fn test_trailing_double_star_crosses_separators() {
        let m = matcher(&["lib/**"]);
        assert!(m.is_match("lib/cjs/index.js"));
        assert!(!m.is_match("src/lib/index.js"));
    }

    #[test]
    fn test_question_mark_matches_one_char() {
        let m = matcher(&["dist/?.js"]);
        assert!(m.is_match("dist/a.js"));
        assert!(!m.is_match("dist/ab.js"));
        assert!(!m.is_match("dist//.js"));
    }

    #[test]
    fn test_literal_characters_are_escaped() {
        let m = matcher(&["dist/**/*.d.ts"]);
        assert!(m.is_match("dist/types/index.d.ts"));
        assert!(!m.is_match("dist/types/indexXdXts"));

        let m = matcher(&["out/(legacy)/[x]+.js"]);
        assert!(m.is_match("out/(legacy)/[x]+.js"));
    }

    #[test]
    fn test_patterns_are_anchored() {
        let m = matcher(&["dist/**/*.js"]);
        assert!(!m.is_match("dist/index.js.map"));
        assert!(!m.is_match("other/dist/index.js"));
    }

    #[test]
    fn test_backslashes_and_dot_slash_are_normalized() {
        let m = matcher(&["./dist/**/*.js"]);
        assert!(m.is_match("dist\\esm\\index.js"));
        assert!(m.is_match("./dist/index.js"));
    }

    #[test]
    fn test_empty_matcher_matches_nothing() {
        let m = GlobMatcher::compile::<&str>(&[]).unwrap();
        assert!(m.is_empty());
        assert!(!m.is_match("dist/index.js"));
    }

    #[test]
    fn test_filter_requires_include_and_no_exclude() {
        let filter = FileFilter::new(&["dist/**/*.js"], &["**/*.test.js"]).unwrap();
        assert!(filter.selects(&["/abs/dist/a.js", "a.js", "dist/a.js"]));
        assert!(!filter.selects(&["/abs/dist/a.test.js", "a.test.js", "dist/a.test.js"]));
        assert!(!filter.selects(&["/abs/dist/a.mjs", "a.mjs", "dist/a.mjs"]));
    }

    #[test]
    fn test_filter_exclude_applies_to_any_candidate_form() {
        let filter = FileFilter::new(&["**/*.js"], &["vendor/**"]).unwrap();
        // excluded through the root-relative spelling only
        assert!(!filter.selects(&["/abs/dist/vendor/x.js", "vendor/x.js", "dist/vendor/x.js"]));
    }
}
