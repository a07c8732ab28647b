pub mod text;
pub mod json;
pub mod csv;

use crate::core::engine::{ModuleReport, RunHeading, RunSummary};
use crate::core::results::ResultCounts;
use crate::core::test::{Outcome, TestModule};

/// Reporter trait for outputting test results
pub trait Reporter {
    /// Report the start of the run
    fn report_start(&self, heading: &RunHeading);

    /// Report the start of a major test; `index` is 1-based
    fn report_test_start(&self, module: &TestModule, index: usize, total: usize);

    /// Report the start of a minor test
    fn report_minor_start(&self, number: usize, total: usize, name: &str);

    /// Report one outcome of the current minor test
    fn report_outcome(&self, minor_number: usize, outcome: &Outcome);

    /// Report the counts of a finished minor test
    fn report_minor_result(&self, name: &str, counts: &ResultCounts);

    /// Report the summary of a finished major test
    fn report_test_summary(&self, report: &ModuleReport);

    /// Report the final results of the run
    fn report_suite_result(&self, summary: &RunSummary);

    /// Report overall progress as a percentage
    fn report_progress(&self, percent: f64, label: &str);

    /// Report advice for the user
    fn report_advice(&self, message: &str);

    /// Report an informational message
    fn report_info(&self, message: &str);

    /// Report a warning message
    fn report_warning(&self, message: &str);

    /// Report an error message
    fn report_error(&self, message: &str);
}
