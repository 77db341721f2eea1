use distprune_core::{PrunePlan, ScanStats, UnusedByGroup, Warning};

/// What a run found, ready to print.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Sorted, unique
    pub used: Vec<String>,
    /// Each group sorted, unique
    pub unused: UnusedByGroup,
    pub kept_by_rule: Vec<String>,
    /// In discovery order
    pub warnings: Vec<Warning>,
    pub stats: ScanStats,
}

impl Report {
    /// Runtime or dev dependencies were found unused
    pub fn has_unused(&self) -> bool {
        !self.unused.dependencies.is_empty() || !self.unused.dev_dependencies.is_empty()
    }
}

/// Result of scanning and planning, before anything is written.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: Report,
    pub plan: PrunePlan,
}
