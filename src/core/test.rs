use std::any::Any;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::config::TestConfig;
use crate::core::engine::RunContext;
use crate::core::environment::RunEnvironment;
use crate::core::hardware::HardwareInfo;
use crate::core::severity::Severity;
use crate::reporters::Reporter;

/// Run order priorities. Lower runs earlier.
pub mod priority {
    pub const FIRST: i32 = 0;
    pub const EARLY: i32 = 10;
    pub const ANYTIME: i32 = 50;
    pub const LATE: i32 = 90;
    pub const LAST: i32 = 100;
}

/// What a check reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed(String),
    Failed { severity: Severity, message: String },
    Warning(String),
    Skipped(String),
    /// Stops the module: this and every remaining minor test count as aborted.
    Aborted(String),
    InfoOnly,
}

impl Outcome {
    pub fn passed(message: impl Into<String>) -> Self {
        Outcome::Passed(message.into())
    }

    pub fn failed(severity: Severity, message: impl Into<String>) -> Self {
        Outcome::Failed { severity, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Outcome::Warning(message.into())
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Outcome::Skipped(message.into())
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Outcome::Aborted(message.into())
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Passed(_) => OutcomeKind::Passed,
            Outcome::Failed { .. } => OutcomeKind::Failed,
            Outcome::Warning(_) => OutcomeKind::Warning,
            Outcome::Skipped(_) => OutcomeKind::Skipped,
            Outcome::Aborted(_) => OutcomeKind::Aborted,
            Outcome::InfoOnly => OutcomeKind::InfoOnly,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            Outcome::Failed { severity, .. } => Some(*severity),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Passed(m)
            | Outcome::Warning(m)
            | Outcome::Skipped(m)
            | Outcome::Aborted(m) => m,
            Outcome::Failed { message, .. } => message,
            Outcome::InfoOnly => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeKind {
    Passed,
    Failed,
    Warning,
    Skipped,
    Aborted,
    InfoOnly,
}

/// One reported outcome, kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// 1-based minor test number; 0 when reported from init or deinit.
    pub minor_number: usize,
    pub minor_name: String,
    pub kind: OutcomeKind,
    pub severity: Option<Severity>,
    pub message: String,
}

impl OutcomeRecord {
    pub fn new(minor_number: usize, minor_name: &str, outcome: &Outcome) -> Self {
        Self {
            minor_number,
            minor_name: minor_name.to_string(),
            kind: outcome.kind(),
            severity: outcome.severity(),
            message: outcome.message().to_string(),
        }
    }
}

/// Result of a module's init hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    Ok,
    Skip,
    Fail,
}

pub type InitFn = Box<dyn Fn(&mut TestContext<'_>) -> InitStatus + Send + Sync>;
pub type DeinitFn = Box<dyn Fn(&mut TestContext<'_>) + Send + Sync>;
pub type CheckFn = Box<dyn Fn(&mut TestContext<'_>) -> Outcome + Send + Sync>;

/// One check within a module.
pub struct MinorTest {
    name: String,
    run: CheckFn,
}

impl MinorTest {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn run(&self, ctx: &mut TestContext<'_>) -> Outcome {
        (self.run)(ctx)
    }
}

/// A diagnostic test module: named group of minor tests sharing an
/// init/deinit lifecycle.
pub struct TestModule {
    name: String,
    flags: u32,
    priority: i32,
    description: String,
    init: Option<InitFn>,
    deinit: Option<DeinitFn>,
    minor_tests: Vec<MinorTest>,
}

impl TestModule {
    /// `flags` is a raw category word; it is validated on registration.
    pub fn new(name: impl Into<String>, flags: u32) -> Self {
        Self {
            name: name.into(),
            flags,
            priority: priority::ANYTIME,
            description: String::new(),
            init: None,
            deinit: None,
            minor_tests: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_init<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut TestContext<'_>) -> InitStatus + Send + Sync + 'static,
    {
        self.init = Some(Box::new(init));
        self
    }

    pub fn with_deinit<F>(mut self, deinit: F) -> Self
    where
        F: Fn(&mut TestContext<'_>) + Send + Sync + 'static,
    {
        self.deinit = Some(Box::new(deinit));
        self
    }

    /// Append a minor test. Minor tests run in the order they are added.
    pub fn with_minor<F>(mut self, name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&mut TestContext<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.minor_tests.push(MinorTest { name: name.into(), run: Box::new(run) });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn minor_tests(&self) -> &[MinorTest] {
        &self.minor_tests
    }

    pub fn minor_count(&self) -> usize {
        self.minor_tests.len()
    }

    pub(crate) fn init_hook(&self) -> Option<&InitFn> {
        self.init.as_ref()
    }

    pub(crate) fn deinit_hook(&self) -> Option<&DeinitFn> {
        self.deinit.as_ref()
    }
}

impl fmt::Debug for TestModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestModule")
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("priority", &self.priority)
            .field("minor_tests", &self.minor_tests.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field("has_init", &self.init.is_some())
            .field("has_deinit", &self.deinit.is_some())
            .finish()
    }
}

/// Handle given to init, deinit and check functions.
pub struct TestContext<'a> {
    env: &'a RunEnvironment,
    reporter: &'a dyn Reporter,
    run: &'a mut RunContext,
}

impl<'a> TestContext<'a> {
    pub(crate) fn new(env: &'a RunEnvironment, reporter: &'a dyn Reporter, run: &'a mut RunContext) -> Self {
        Self { env, reporter, run }
    }

    pub fn env(&self) -> &RunEnvironment {
        self.env
    }

    pub fn config(&self) -> &TestConfig {
        &self.env.config
    }

    pub fn hardware(&self) -> &HardwareInfo {
        &self.env.hardware
    }

    pub fn module_name(&self) -> &str {
        &self.run.module_name
    }

    pub fn minor_number(&self) -> usize {
        self.run.minor_index
    }

    /// Record an intermediate outcome. It is counted for the current minor
    /// test; a recorded `Aborted` does not stop the module.
    pub fn report(&mut self, outcome: Outcome) {
        self.run.fold(outcome, self.reporter);
    }

    pub fn passed(&mut self, message: impl Into<String>) {
        self.report(Outcome::passed(message));
    }

    pub fn failed(&mut self, severity: Severity, message: impl Into<String>) {
        self.report(Outcome::failed(severity, message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.report(Outcome::warning(message));
    }

    pub fn skipped(&mut self, message: impl Into<String>) {
        self.report(Outcome::skipped(message));
    }

    pub fn infoonly(&mut self) {
        self.report(Outcome::InfoOnly);
    }

    /// Reported, never counted.
    pub fn advice(&self, message: &str) {
        self.reporter.report_advice(message);
    }

    pub fn info(&self, message: &str) {
        self.reporter.report_info(message);
    }

    /// Percent done within the current minor test; clamped to 0..=100.
    pub fn progress(&mut self, percent: u32, message: &str) {
        self.run.report_progress(percent, message, self.reporter);
    }

    /// Per-module scratch state, usually set by init and dropped after deinit.
    pub fn set_state<T: Any>(&mut self, state: T) {
        self.run.state = Some(Box::new(state));
    }

    pub fn state<T: Any>(&self) -> Option<&T> {
        self.run.state.as_ref().and_then(|s| s.downcast_ref::<T>())
    }

    pub fn state_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.run.state.as_mut().and_then(|s| s.downcast_mut::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let outcome = Outcome::failed(Severity::High, "bad base address");
        assert_eq!(outcome.kind(), OutcomeKind::Failed);
        assert_eq!(outcome.severity(), Some(Severity::High));
        assert_eq!(outcome.message(), "bad base address");

        assert_eq!(Outcome::InfoOnly.message(), "");
        assert_eq!(Outcome::passed("ok").severity(), None);
    }

    #[test]
    fn test_outcome_record() {
        let record = OutcomeRecord::new(2, "clock period", &Outcome::warning("slow"));
        assert_eq!(record.minor_number, 2);
        assert_eq!(record.minor_name, "clock period");
        assert_eq!(record.kind, OutcomeKind::Warning);
        assert_eq!(record.severity, None);
    }

    #[test]
    fn test_module_builder() {
        let module = TestModule::new("hpet", 0x01)
            .with_priority(priority::EARLY)
            .with_description("HPET configuration test")
            .with_init(|_| InitStatus::Ok)
            .with_minor("base", |_| Outcome::passed("ok"))
            .with_minor("period", |_| Outcome::InfoOnly);

        assert_eq!(module.name(), "hpet");
        assert_eq!(module.priority(), priority::EARLY);
        assert_eq!(module.minor_count(), 2);
        assert_eq!(module.minor_tests()[1].name(), "period");
        assert!(module.init_hook().is_some());
        assert!(module.deinit_hook().is_none());
    }

    #[test]
    fn test_default_priority() {
        let module = TestModule::new("x", 0x01);
        assert_eq!(module.priority(), priority::ANYTIME);
        assert!(format!("{:?}", module).contains("\"x\""));
    }
}
