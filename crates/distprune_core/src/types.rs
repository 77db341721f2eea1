use serde::Serialize;
use std::collections::BTreeSet;

/// Something the scan could not resolve statically. Never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Warning {
    DynamicImport { file: String, expr: String },
    DynamicRequire { file: String, expr: String },
    ParseError { file: String, error: String },
}

impl Warning {
    pub fn file(&self) -> &str {
        match self {
            Warning::DynamicImport { file, .. }
            | Warning::DynamicRequire { file, .. }
            | Warning::ParseError { file, .. } => file,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Warning::DynamicImport { .. } => "dynamic-import",
            Warning::DynamicRequire { .. } => "dynamic-require",
            Warning::ParseError { .. } => "parse-error",
        }
    }

    /// The unresolved expression, or the parser's message for parse errors
    pub fn detail(&self) -> &str {
        match self {
            Warning::DynamicImport { expr, .. } | Warning::DynamicRequire { expr, .. } => expr,
            Warning::ParseError { error, .. } => error,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStats {
    pub files_scanned: usize,
    pub imports_found: usize,
}

/// Result of scanning one or more roots.
///
/// Outcomes form a monoid: [`ScanOutcome::empty`] is the identity and
/// [`ScanOutcome::merge`] unions `used`, concatenates `warnings` and adds
/// `stats`, so roots may be scanned in any order and combined afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub used: BTreeSet<String>,
    pub warnings: Vec<Warning>,
    pub stats: ScanStats,
}

impl ScanOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn merge(mut self, other: ScanOutcome) -> Self {
        self.used.extend(other.used);
        self.warnings.extend(other.warnings);
        self.stats.files_scanned += other.stats.files_scanned;
        self.stats.imports_found += other.stats.imports_found;
        self
    }

    pub fn has_uncertainty(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl FromIterator<ScanOutcome> for ScanOutcome {
    fn from_iter<I: IntoIterator<Item = ScanOutcome>>(iter: I) -> Self {
        iter.into_iter().fold(ScanOutcome::empty(), ScanOutcome::merge)
    }
}
