use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::results::ResultCounts;

/// The severity of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Highest first.
    pub const DESCENDING: [Severity; 4] =
        [Severity::Critical, Severity::High, Severity::Medium, Severity::Low];

    fn bit(self) -> u8 {
        match self {
            Severity::Low => 0x1,
            Severity::Medium => 0x2,
            Severity::High => 0x4,
            Severity::Critical => 0x8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every severity observed during one major test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeveritySet(u8);

impl SeveritySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, severity: Severity) {
        self.0 |= severity.bit();
    }

    pub fn contains(self, severity: Severity) -> bool {
        self.0 & severity.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// The worst severity seen, if any.
    pub fn highest(self) -> Option<Severity> {
        Severity::DESCENDING.into_iter().find(|s| self.contains(*s))
    }

    /// All severities seen, lowest first.
    pub fn iter(self) -> impl Iterator<Item = Severity> {
        Severity::DESCENDING.into_iter().rev().filter(move |s| self.contains(*s))
    }
}

/// Final classification of one major test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Passed,
    Warning,
    /// Failed; carries the highest severity logged, `None` for a generic failure.
    Failed(Option<Severity>),
    Skipped,
    Aborted,
}

impl Verdict {
    /// Aborted wins over skipped, skipped over failed, failed over warning.
    pub fn classify(counts: &ResultCounts, severities: SeveritySet) -> Self {
        if counts.aborted > 0 {
            Verdict::Aborted
        } else if counts.skipped > 0 {
            Verdict::Skipped
        } else if counts.failed > 0 {
            Verdict::Failed(severities.highest())
        } else if counts.warning > 0 {
            Verdict::Warning
        } else {
            Verdict::Passed
        }
    }
}

/// Process-wide result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitClassification {
    Success,
    Error,
}

impl ExitClassification {
    /// Only failures and warnings make a run an error; skips and aborts do not.
    pub fn from_totals(totals: &ResultCounts) -> Self {
        if totals.has_errors() {
            ExitClassification::Error
        } else {
            ExitClassification::Success
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            ExitClassification::Success => 0,
            ExitClassification::Error => 1,
        }
    }
}
