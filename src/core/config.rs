use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

use crate::core::error::{FrameworkError, Result};
use crate::core::severity::{Severity, Verdict};
use crate::core::test::OutcomeKind;

/// Default results log, appended to on every run.
pub const RESULTS_LOG: &str = "results.log";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// File name, or `stdout` / `stderr`.
    pub results_output: String,
    pub force_clean: bool,
    pub show_progress: bool,
    pub quiet: bool,
    pub stdout_summary: bool,
    pub output_format: OutputFormat,
    pub verbose: bool,
    pub log_width: usize,

    pub thermal_warning_threshold: f32,
    pub memory_pattern_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Where results are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsTarget {
    Stdout,
    Stderr,
    File(PathBuf),
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            results_output: RESULTS_LOG.to_string(),
            force_clean: false,
            show_progress: true,
            quiet: false,
            stdout_summary: false,
            output_format: OutputFormat::Text,
            verbose: false,
            log_width: 80,

            thermal_warning_threshold: 80.0,
            memory_pattern_bytes: 1024 * 1024,
        }
    }
}

impl TestConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FrameworkError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| FrameworkError::ConfigError(format!("Failed to read config file: {}", e)))?;

        if path.extension().and_then(|ext| ext.to_str()) == Some("toml") {
            toml::from_str::<Self>(&contents)
                .map_err(|e| FrameworkError::ConfigError(format!("Failed to parse TOML config: {}", e)))
        } else {
            serde_json::from_str::<Self>(&contents)
                .map_err(|e| FrameworkError::ConfigError(format!("Failed to parse JSON config: {}", e)))
        }
    }

    pub fn results_target(&self) -> ResultsTarget {
        match self.results_output.as_str() {
            "stdout" | "-" => ResultsTarget::Stdout,
            "stderr" => ResultsTarget::Stderr,
            path => ResultsTarget::File(PathBuf::from(path)),
        }
    }

    /// Send results to stdout and silence progress feedback.
    pub fn route_results_to_stdout(&mut self) {
        self.results_output = "stdout".to_string();
        self.show_progress = false;
        self.quiet = true;
    }
}

/// Texts printed for per-test classifications and result lines.
/// Each one can be overridden by an environment variable of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLabels {
    pub passed: String,
    pub failed: String,
    pub failed_low: String,
    pub failed_medium: String,
    pub failed_high: String,
    pub failed_critical: String,
    pub warning: String,
    pub error: String,
    pub advice: String,
    pub skipped: String,
    pub aborted: String,
}

impl Default for SummaryLabels {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl SummaryLabels {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).unwrap_or_else(|| name.to_string());
        Self {
            passed: get("PASSED"),
            failed: get("FAILED"),
            failed_low: get("FAILED_LOW"),
            failed_medium: get("FAILED_MEDIUM"),
            failed_high: get("FAILED_HIGH"),
            failed_critical: get("FAILED_CRITICAL"),
            warning: get("WARNING"),
            error: get("ERROR"),
            advice: get("ADVICE"),
            skipped: get("SKIPPED"),
            aborted: get("ABORTED"),
        }
    }

    pub fn verdict(&self, verdict: Verdict) -> &str {
        match verdict {
            Verdict::Passed => &self.passed,
            Verdict::Warning => &self.warning,
            Verdict::Skipped => &self.skipped,
            Verdict::Aborted => &self.aborted,
            Verdict::Failed(None) => &self.failed,
            Verdict::Failed(Some(Severity::Low)) => &self.failed_low,
            Verdict::Failed(Some(Severity::Medium)) => &self.failed_medium,
            Verdict::Failed(Some(Severity::High)) => &self.failed_high,
            Verdict::Failed(Some(Severity::Critical)) => &self.failed_critical,
        }
    }

    pub fn outcome(&self, kind: OutcomeKind) -> &str {
        match kind {
            OutcomeKind::Passed => &self.passed,
            OutcomeKind::Failed => &self.failed,
            OutcomeKind::Warning => &self.warning,
            OutcomeKind::Skipped => &self.skipped,
            OutcomeKind::Aborted => &self.aborted,
            OutcomeKind::InfoOnly => "INFO",
        }
    }
}
