use std::fs::File;
use std::io::{self, Write};
use csv::Writer;

use crate::core::engine::{ModuleReport, RunHeading, RunSummary};
use crate::core::results::ResultCounts;
use crate::core::severity::{ExitClassification, Verdict};
use crate::core::test::{Outcome, OutcomeKind, TestModule};
use crate::reporters::Reporter;

const COLUMNS: usize = 6;

/// CSV reporter for spreadsheet-compatible output
pub struct CsvReporter {
    output_file: Option<String>,
}

impl CsvReporter {
    /// Create a new CSV reporter
    pub fn new(output_file: Option<String>) -> Self {
        Self { output_file }
    }

    fn kind_to_string(kind: OutcomeKind) -> &'static str {
        match kind {
            OutcomeKind::Passed => "PASSED",
            OutcomeKind::Failed => "FAILED",
            OutcomeKind::Warning => "WARNING",
            OutcomeKind::Skipped => "SKIPPED",
            OutcomeKind::Aborted => "ABORTED",
            OutcomeKind::InfoOnly => "INFO",
        }
    }

    fn verdict_to_string(verdict: Verdict) -> String {
        match verdict {
            Verdict::Failed(Some(severity)) => format!("FAILED ({})", severity),
            Verdict::Failed(None) => "FAILED".to_string(),
            Verdict::Passed => "PASSED".to_string(),
            Verdict::Warning => "WARNING".to_string(),
            Verdict::Skipped => "SKIPPED".to_string(),
            Verdict::Aborted => "ABORTED".to_string(),
        }
    }

    /// Create a CSV writer
    fn create_writer(&self) -> io::Result<Writer<Box<dyn Write>>> {
        let out: Box<dyn Write> = match &self.output_file {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(io::stdout()),
        };
        Ok(csv::WriterBuilder::new().flexible(true).from_writer(out))
    }

    fn count_row(label: &str, counts: &ResultCounts) -> Vec<String> {
        vec![
            label.to_string(),
            counts.passed.to_string(),
            counts.failed.to_string(),
            counts.warning.to_string(),
            counts.skipped.to_string(),
            counts.aborted.to_string(),
            counts.infoonly.to_string(),
        ]
    }

    /// Write the whole run: one row per outcome, then per-test totals.
    pub fn write_summary<W: Write>(writer: &mut Writer<W>, summary: &RunSummary) -> csv::Result<()> {
        writer.write_record(["Test", "Minor", "Name", "Result", "Severity", "Message"])?;

        for module in &summary.modules {
            for record in &module.records {
                let number = record.minor_number.to_string();
                writer.write_record([
                    module.name.as_str(),
                    number.as_str(),
                    record.minor_name.as_str(),
                    Self::kind_to_string(record.kind),
                    record.severity.map(|s| s.as_str()).unwrap_or(""),
                    record.message.as_str(),
                ])?;
            }
        }

        writer.write_record([""; COLUMNS])?;
        writer.write_record([
            "Totals", "Passed", "Failed", "Warning", "Skipped", "Aborted", "Info", "Verdict",
        ])?;

        for module in &summary.modules {
            let mut row = Self::count_row(&module.name, &module.counts);
            row.push(Self::verdict_to_string(module.verdict));
            writer.write_record(&row)?;
        }

        let mut row = Self::count_row("All", &summary.totals);
        row.push(
            match summary.exit {
                ExitClassification::Success => "SUCCESS",
                ExitClassification::Error => "FAILED",
            }
            .to_string(),
        );
        writer.write_record(&row)?;

        writer.write_record([""; COLUMNS])?;
        let started = summary.heading.started.format("%Y-%m-%d %H:%M:%S").to_string();
        let duration = summary.duration.as_millis().to_string();
        writer.write_record(["Run started", started.as_str()])?;
        writer.write_record(["Host", summary.heading.system.hostname.as_str()])?;
        writer.write_record(["Duration (ms)", duration.as_str()])?;

        writer.flush()?;
        Ok(())
    }
}

impl Reporter for CsvReporter {
    fn report_start(&self, _heading: &RunHeading) {
        // CSV reporter doesn't output anything at start
    }

    fn report_test_start(&self, _module: &TestModule, _index: usize, _total: usize) {}

    fn report_minor_start(&self, _number: usize, _total: usize, _name: &str) {}

    fn report_outcome(&self, _minor_number: usize, _outcome: &Outcome) {
        // Individual outcomes are only written in the final output
    }

    fn report_minor_result(&self, _name: &str, _counts: &ResultCounts) {}

    fn report_test_summary(&self, _report: &ModuleReport) {}

    fn report_suite_result(&self, summary: &RunSummary) {
        let mut writer = match self.create_writer() {
            Ok(w) => w,
            Err(e) => {
                eprintln!("Error creating CSV writer: {}", e);
                return;
            }
        };

        if let Err(e) = Self::write_summary(&mut writer, summary) {
            eprintln!("Error writing CSV output: {}", e);
        }
    }

    fn report_progress(&self, _percent: f64, _label: &str) {}

    fn report_advice(&self, _message: &str) {}

    fn report_info(&self, _message: &str) {
        // CSV reporter doesn't output info messages
    }

    fn report_warning(&self, _message: &str) {
        // CSV reporter doesn't output warnings
    }

    fn report_error(&self, message: &str) {
        eprintln!("Error: {}", message);
    }
}
