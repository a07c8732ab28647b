use std::io::Write;
use std::fs::File;
use serde_json::{json, Value};

use crate::core::error::{FrameworkError, Result};
use crate::core::engine::{ModuleExit, ModuleReport, RunHeading, RunSummary};
use crate::core::results::ResultCounts;
use crate::core::severity::{ExitClassification, Verdict};
use crate::core::test::{Outcome, TestModule};
use crate::reporters::Reporter;

/// JSON reporter for machine-readable output
pub struct JsonReporter {
    output_file: Option<String>,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new(output_file: Option<String>) -> Self {
        Self { output_file }
    }

    fn verdict_to_string(verdict: Verdict) -> String {
        match verdict {
            Verdict::Passed => "PASSED".to_string(),
            Verdict::Warning => "WARNING".to_string(),
            Verdict::Skipped => "SKIPPED".to_string(),
            Verdict::Aborted => "ABORTED".to_string(),
            Verdict::Failed(None) => "FAILED".to_string(),
            Verdict::Failed(Some(severity)) => format!("FAILED_{}", severity),
        }
    }

    fn counts_to_json(counts: &ResultCounts) -> Value {
        json!({
            "passed": counts.passed,
            "failed": counts.failed,
            "warning": counts.warning,
            "skipped": counts.skipped,
            "aborted": counts.aborted,
            "infoonly": counts.infoonly,
        })
    }

    fn module_to_json(report: &ModuleReport) -> Value {
        let exit = match report.exit {
            ModuleExit::Completed => json!({ "state": "completed" }),
            ModuleExit::AbortedAt(n) => json!({ "state": "aborted", "at_minor": n }),
            ModuleExit::SkippedAtInit => json!({ "state": "skipped_at_init" }),
            ModuleExit::AbortedAtInit => json!({ "state": "aborted_at_init" }),
        };

        json!({
            "name": report.name,
            "description": report.description,
            "categories": report.categories.iter().map(|c| format!("{:?}", c)).collect::<Vec<_>>(),
            "result": Self::verdict_to_string(report.verdict),
            "counts": Self::counts_to_json(&report.counts),
            "severities": report.severities.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            "exit": exit,
            "outcomes": report.records,
        })
    }

    /// Build the document for a finished run
    pub fn summary_to_json(summary: &RunSummary) -> Value {
        let heading: &RunHeading = &summary.heading;
        json!({
            "version": heading.version,
            "timestamp": heading.started.to_rfc3339(),
            "system_info": heading.system,
            "tests_run": heading.tests,
            "tests": summary.modules.iter().map(Self::module_to_json).collect::<Vec<_>>(),
            "totals": Self::counts_to_json(&summary.totals),
            "result": match summary.exit {
                ExitClassification::Success => "SUCCESS",
                ExitClassification::Error => "FAILED",
            },
            "duration_ms": summary.duration.as_millis() as u64,
        })
    }

    /// Write JSON to file or stdout
    fn write_json(&self, json_value: &Value) -> Result<()> {
        let json_string = serde_json::to_string_pretty(json_value)
            .map_err(|e| FrameworkError::ReportError(e.to_string()))?;

        match &self.output_file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(json_string.as_bytes())?;
                file.write_all(b"\n")?;
            }
            None => {
                println!("{}", json_string);
            }
        }

        Ok(())
    }
}

impl Reporter for JsonReporter {
    fn report_start(&self, _heading: &RunHeading) {
        // Everything is emitted as one document at the end of the run
    }

    fn report_test_start(&self, _module: &TestModule, _index: usize, _total: usize) {}

    fn report_minor_start(&self, _number: usize, _total: usize, _name: &str) {}

    fn report_outcome(&self, _minor_number: usize, _outcome: &Outcome) {
        // Outcomes are part of each module report
    }

    fn report_minor_result(&self, _name: &str, _counts: &ResultCounts) {}

    fn report_test_summary(&self, _report: &ModuleReport) {}

    fn report_suite_result(&self, summary: &RunSummary) {
        if let Err(e) = self.write_json(&Self::summary_to_json(summary)) {
            eprintln!("Error writing JSON output: {}", e);
        }
    }

    fn report_progress(&self, _percent: f64, _label: &str) {}

    fn report_advice(&self, _message: &str) {}

    fn report_info(&self, _message: &str) {}

    fn report_warning(&self, message: &str) {
        eprintln!("Warning: {}", message);
    }

    fn report_error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::severity::Severity;

    #[test]
    fn test_verdict_strings() {
        assert_eq!(JsonReporter::verdict_to_string(Verdict::Failed(Some(Severity::Critical))), "FAILED_CRITICAL");
        assert_eq!(JsonReporter::verdict_to_string(Verdict::Failed(None)), "FAILED");
        assert_eq!(JsonReporter::verdict_to_string(Verdict::Skipped), "SKIPPED");
    }

    #[test]
    fn test_counts_to_json() {
        let counts = ResultCounts { passed: 2, aborted: 1, ..Default::default() };
        let value = JsonReporter::counts_to_json(&counts);
        assert_eq!(value["passed"], 2);
        assert_eq!(value["aborted"], 1);
        assert_eq!(value["failed"], 0);
    }
}
