use std::cell::{Cell, RefCell};
use std::fs::OpenOptions;
use std::io::{self, Write};
use colored::*;
use log::warn;

use crate::core::category::CategorySet;
use crate::core::config::{ResultsTarget, SummaryLabels, TestConfig};
use crate::core::engine::{ModuleReport, RunHeading, RunSummary};
use crate::core::error::Result;
use crate::core::progress::ProgressMeter;
use crate::core::results::{summarize, ResultCounts};
use crate::core::severity::{Severity, Verdict};
use crate::core::test::{Outcome, OutcomeKind, TestModule};
use crate::reporters::Reporter;

/// Text reporter writing the results log, with optional progress on stderr
pub struct TextReporter {
    out: RefCell<Box<dyn Write>>,
    colorize: bool,
    meter: ProgressMeter,
    show_progress: bool,
    interactive: Cell<bool>,
    echo_errors: bool,
    quiet: bool,
    stdout_summary: bool,
    width: usize,
    labels: SummaryLabels,
}

impl TextReporter {
    /// Open the configured results target. Files are appended to unless
    /// `force_clean` is set.
    pub fn new(config: &TestConfig, labels: SummaryLabels) -> Result<Self> {
        let target = config.results_target();
        let colorize = !matches!(target, ResultsTarget::File(_));
        let echo_errors = !matches!(target, ResultsTarget::Stderr);
        let out: Box<dyn Write> = match target {
            ResultsTarget::Stdout => Box::new(io::stdout()),
            ResultsTarget::Stderr => Box::new(io::stderr()),
            ResultsTarget::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .append(!config.force_clean)
                    .truncate(config.force_clean)
                    .open(path)?;
                Box::new(file)
            }
        };
        let mut reporter = Self::with_writer(out, colorize, config, labels);
        reporter.echo_errors = echo_errors;
        Ok(reporter)
    }

    /// Write results to any writer.
    pub fn with_writer(out: Box<dyn Write>, colorize: bool, config: &TestConfig, labels: SummaryLabels) -> Self {
        Self {
            out: RefCell::new(out),
            colorize,
            meter: ProgressMeter::new(config.show_progress && !config.quiet),
            show_progress: config.show_progress && !config.quiet,
            interactive: Cell::new(false),
            echo_errors: true,
            quiet: config.quiet,
            stdout_summary: config.stdout_summary,
            width: config.log_width.max(20),
            labels,
        }
    }

    fn line(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        if let Err(e) = writeln!(out, "{}", text) {
            warn!("Failed to write results: {}", e);
        }
    }

    /// Progress is drawn only for non-interactive modules.
    fn progress_enabled(&self) -> bool {
        self.show_progress && !self.interactive.get()
    }

    /// The line echoed to stderr for an error, unless the results log
    /// already goes there.
    fn error_echo(&self, message: &str) -> Option<String> {
        if !self.echo_errors {
            return None;
        }
        Some(format!("{}: {}", self.paint(&self.labels.error, OutcomeKind::Failed), message))
    }

    fn underline(&self, ch: char) {
        self.line(&ch.to_string().repeat(self.width));
    }

    fn paint(&self, text: &str, kind: OutcomeKind) -> String {
        if !self.colorize {
            return text.to_string();
        }
        match kind {
            OutcomeKind::Passed => text.green().bold().to_string(),
            OutcomeKind::Failed => text.red().bold().to_string(),
            OutcomeKind::Warning => text.yellow().bold().to_string(),
            OutcomeKind::Skipped => text.blue().bold().to_string(),
            OutcomeKind::Aborted => text.magenta().bold().to_string(),
            OutcomeKind::InfoOnly => text.to_string(),
        }
    }

    /// Format one result line, e.g. `FAILED [HIGH]: Test 2, bad value`
    pub fn format_outcome(&self, minor_number: usize, outcome: &Outcome) -> Option<String> {
        let kind = outcome.kind();
        if kind == OutcomeKind::InfoOnly {
            return None;
        }
        let label = match outcome.severity() {
            Some(severity) => format!("{} [{}]", self.labels.outcome(kind), severity),
            None => self.labels.outcome(kind).to_string(),
        };
        Some(format!("{}: Test {}, {}", self.paint(&label, kind), minor_number, outcome.message()))
    }

    fn verdict_kind(verdict: Verdict) -> OutcomeKind {
        match verdict {
            Verdict::Passed => OutcomeKind::Passed,
            Verdict::Warning => OutcomeKind::Warning,
            Verdict::Failed(_) => OutcomeKind::Failed,
            Verdict::Skipped => OutcomeKind::Skipped,
            Verdict::Aborted => OutcomeKind::Aborted,
        }
    }

    fn flush(&self) {
        if let Err(e) = self.out.borrow_mut().flush() {
            warn!("Failed to flush results: {}", e);
        }
    }
}

impl Reporter for TextReporter {
    fn report_start(&self, heading: &RunHeading) {
        if !self.quiet {
            println!(
                "Running {} tests, results appended to {}",
                heading.tests.len(),
                heading.results_output
            );
        }

        self.line(&format!("Results generated by fwcheck: Version {}.", heading.version));
        self.line("");
        let sys = &heading.system;
        self.line(&format!(
            "This test run on {} on host {} {} {} {}.",
            heading.started.format("%d/%m/%y at %H:%M:%S"),
            sys.os_name,
            sys.hostname,
            sys.kernel_version,
            sys.os_version
        ));
        self.line("");
        self.line(&format!("Running tests: {}.", heading.test_list()));
        self.line("");
    }

    fn report_test_start(&self, module: &TestModule, index: usize, total: usize) {
        let headline = if module.description().is_empty() {
            module.name()
        } else {
            module.description()
        };
        self.line(&format!("{} ({}/{})", headline, index, total));
        self.underline('-');

        let interactive = CategorySet::from_bits(module.flags()).is_some_and(CategorySet::is_interactive);
        self.interactive.set(interactive);
        if self.progress_enabled() {
            self.meter.println(&format!("Test: {:<70.70}", headline));
        }
    }

    fn report_minor_start(&self, number: usize, total: usize, name: &str) {
        self.line(&format!("Test {} of {}: {}", number, total, name));
    }

    fn report_outcome(&self, minor_number: usize, outcome: &Outcome) {
        if let Some(text) = self.format_outcome(minor_number, outcome) {
            self.line(&text);
        }
    }

    fn report_minor_result(&self, name: &str, counts: &ResultCounts) {
        self.line("");
        if self.progress_enabled() {
            self.meter.println(&format!("  {:<55.55} {}", name, summarize(counts, false)));
        }
    }

    fn report_test_summary(&self, report: &ModuleReport) {
        self.underline('=');
        self.line(&format!("{}.", summarize(&report.counts, true)));
        self.underline('=');
        self.line("");

        match report.verdict {
            Verdict::Skipped if self.progress_enabled() => self.meter.println(" Test skipped."),
            Verdict::Aborted if self.progress_enabled() => self.meter.println(" Test aborted."),
            _ => {}
        }

        if self.stdout_summary {
            println!("{}", self.paint(self.labels.verdict(report.verdict), Self::verdict_kind(report.verdict)));
        }
        self.flush();
    }

    fn report_suite_result(&self, summary: &RunSummary) {
        self.meter.finish();

        if summary.print_summary {
            self.line("Summary:");
            self.line(&format!("{}.", summarize(&summary.totals, true)));
            self.line("");

            for severity in Severity::DESCENDING {
                let failures: Vec<(&str, &str)> = summary
                    .modules
                    .iter()
                    .flat_map(|m| {
                        m.records
                            .iter()
                            .filter(move |r| r.severity == Some(severity))
                            .map(move |r| (m.name.as_str(), r.message.as_str()))
                    })
                    .collect();

                if failures.is_empty() {
                    continue;
                }
                self.line(&format!(
                    "{} failures: {}",
                    self.paint(severity.as_str(), OutcomeKind::Failed),
                    failures.len()
                ));
                for (module, message) in failures {
                    self.line(&format!(" {}: {}", module, message));
                }
                self.line("");
            }
        }

        self.line(&format!(
            "Run took {}.",
            humantime::format_duration(std::time::Duration::from_millis(summary.duration.as_millis() as u64))
        ));
        self.line("");
        self.flush();

        if !self.quiet {
            let verdict = if summary.totals.has_errors() {
                self.paint("FAILED", OutcomeKind::Failed)
            } else {
                self.paint("PASSED", OutcomeKind::Passed)
            };
            println!("{}: {}.", verdict, summarize(&summary.totals, true));
        }
    }

    fn report_progress(&self, percent: f64, label: &str) {
        if self.progress_enabled() {
            self.meter.set(percent, label);
        }
    }

    fn report_advice(&self, message: &str) {
        self.line("");
        self.line(&format!("{}: {}", self.labels.advice, message));
        self.line("");
    }

    fn report_info(&self, message: &str) {
        self.line(message);
    }

    fn report_warning(&self, message: &str) {
        self.line(&format!("Warning: {}", message));
    }

    fn report_error(&self, message: &str) {
        self.line(&format!("{}: {}", self.labels.error, message));
        if let Some(echo) = self.error_echo(message) {
            eprintln!("{}", echo);
        }
    }
}
