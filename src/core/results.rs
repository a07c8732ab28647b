use std::ops::AddAssign;
use serde::{Serialize, Deserialize};

use crate::core::test::Outcome;

/// Outcome counters for a minor test, a major test or a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultCounts {
    pub passed: u32,
    pub failed: u32,
    pub warning: u32,
    pub skipped: u32,
    pub aborted: u32,
    pub infoonly: u32,
}

impl ResultCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all counters. Display only.
    pub fn total(&self) -> u32 {
        self.passed + self.failed + self.warning + self.skipped + self.aborted + self.infoonly
    }

    /// Count one outcome.
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Passed(_) => self.passed += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Warning(_) => self.warning += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Aborted(_) => self.aborted += 1,
            Outcome::InfoOnly => self.infoonly += 1,
        }
    }

    /// A run with failures or warnings is an error.
    pub fn has_errors(&self) -> bool {
        self.failed > 0 || self.warning > 0
    }
}

impl AddAssign for ResultCounts {
    fn add_assign(&mut self, rhs: Self) {
        accumulate(self, &rhs);
    }
}

/// Elementwise addition of `source` into `target`.
pub fn accumulate(target: &mut ResultCounts, source: &ResultCounts) {
    target.passed += source.passed;
    target.failed += source.failed;
    target.warning += source.warning;
    target.skipped += source.skipped;
    target.aborted += source.aborted;
    target.infoonly += source.infoonly;
}

/// Human readable summary, e.g. `3 passed, 1 failed, 2 skipped`.
///
/// Categories appear in a fixed order; zero counts are left out unless
/// `include_zero` is set.
pub fn summarize(counts: &ResultCounts, include_zero: bool) -> String {
    let fields = [
        (counts.passed, "passed"),
        (counts.failed, "failed"),
        (counts.warning, "warnings"),
        (counts.aborted, "aborted"),
        (counts.skipped, "skipped"),
        (counts.infoonly, "informational"),
    ];

    fields
        .iter()
        .filter(|(n, _)| include_zero || *n > 0)
        .map(|(n, label)| format!("{} {}", n, label))
        .collect::<Vec<_>>()
        .join(", ")
}
