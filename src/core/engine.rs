use std::any::Any;
use std::fmt;
use std::time::{Duration, Instant};
use chrono::{DateTime, Local};
use log::{debug, error, info, warn};

use crate::core::category::CategorySet;
use crate::core::environment::RunEnvironment;
use crate::core::error::{FrameworkError, Result};
use crate::core::hardware::SystemInfo;
use crate::core::progress::compute_progress;
use crate::core::registry::{RegisteredTest, TestRegistry};
use crate::core::results::{accumulate, ResultCounts};
use crate::core::selector::{self, Selection};
use crate::core::severity::{ExitClassification, SeveritySet, Verdict};
use crate::core::test::{InitStatus, Outcome, OutcomeRecord, TestContext, TestModule};
use crate::reporters::Reporter;

/// Lifecycle of one major test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    NotStarted,
    Initializing,
    /// 1-based minor test number.
    RunningMinor(usize),
    Deinitializing,
    SkippedAtInit,
    AbortedAtInit,
    Done,
}

/// How a major test left its minor-test loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ModuleExit {
    Completed,
    /// A minor test returned `Aborted`; carries its 1-based number.
    AbortedAt(usize),
    SkippedAtInit,
    AbortedAtInit,
}

/// Everything recorded about one major test.
#[derive(Debug, Clone)]
pub struct ModuleReport {
    pub name: String,
    pub description: String,
    pub categories: CategorySet,
    pub counts: ResultCounts,
    pub severities: SeveritySet,
    pub verdict: Verdict,
    pub exit: ModuleExit,
    pub records: Vec<OutcomeRecord>,
}

/// Information reported before the first test runs.
#[derive(Debug, Clone)]
pub struct RunHeading {
    pub version: &'static str,
    pub started: DateTime<Local>,
    pub system: SystemInfo,
    pub tests: Vec<String>,
    pub results_output: String,
}

impl RunHeading {
    fn new(env: &RunEnvironment, run_list: &[&RegisteredTest]) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            started: Local::now(),
            system: env.hardware.system_info.clone(),
            tests: run_list.iter().map(|t| t.name().to_string()).collect(),
            results_output: env.config.results_output.clone(),
        }
    }

    /// Space separated test names, or `None`.
    pub fn test_list(&self) -> String {
        if self.tests.is_empty() {
            "None".to_string()
        } else {
            self.tests.join(" ")
        }
    }
}

/// Result of one engine invocation.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub heading: RunHeading,
    pub modules: Vec<ModuleReport>,
    pub totals: ResultCounts,
    pub exit: ExitClassification,
    /// Set once any non-utility test has run.
    pub print_summary: bool,
    pub duration: Duration,
}

impl RunSummary {
    pub fn module(&self, name: &str) -> Option<&ModuleReport> {
        self.modules.iter().find(|m| m.name == name)
    }
}

/// Mutable state of one run, owned by the engine.
pub struct RunContext {
    pub(crate) major_index: usize,
    pub(crate) major_total: usize,
    pub(crate) minor_index: usize,
    pub(crate) minor_total: usize,
    pub(crate) module_name: String,
    pub(crate) minor_name: String,
    pub(crate) scratch: ResultCounts,
    pub(crate) major: ResultCounts,
    pub(crate) grand: ResultCounts,
    pub(crate) severities: SeveritySet,
    pub(crate) records: Vec<OutcomeRecord>,
    pub(crate) state: Option<Box<dyn Any>>,
}

impl RunContext {
    fn new(major_total: usize) -> Self {
        Self {
            major_index: 0,
            major_total,
            minor_index: 0,
            minor_total: 0,
            module_name: String::new(),
            minor_name: String::new(),
            scratch: ResultCounts::default(),
            major: ResultCounts::default(),
            grand: ResultCounts::default(),
            severities: SeveritySet::new(),
            records: Vec::new(),
            state: None,
        }
    }

    fn begin_module(&mut self, module: &TestModule) {
        self.module_name = module.name().to_string();
        self.minor_name.clear();
        self.minor_index = 0;
        self.minor_total = module.minor_count();
        self.scratch = ResultCounts::default();
        self.major = ResultCounts::default();
        self.severities.clear();
        self.records.clear();
        self.state = None;
    }

    fn begin_minor(&mut self, number: usize, name: &str) {
        self.minor_index = number;
        self.minor_name = name.to_string();
        self.scratch = ResultCounts::default();
    }

    pub(crate) fn fold(&mut self, outcome: Outcome, reporter: &dyn Reporter) {
        reporter.report_outcome(self.minor_index, &outcome);
        if let Some(severity) = outcome.severity() {
            self.severities.record(severity);
        }
        self.scratch.record(&outcome);
        self.records.push(OutcomeRecord::new(self.minor_index, &self.minor_name, &outcome));
    }

    pub(crate) fn report_progress(&mut self, percent: u32, message: &str, reporter: &dyn Reporter) {
        let progress = compute_progress(
            self.major_index,
            self.major_total,
            self.minor_index.max(1),
            self.minor_total,
            percent,
        );
        let label = if message.is_empty() {
            self.minor_name.clone()
        } else {
            format!("{} {}", self.minor_name, message)
        };
        reporter.report_progress(progress, label.trim());
    }
}

impl fmt::Debug for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunContext")
            .field("major", &format_args!("{}/{}", self.major_index, self.major_total))
            .field("minor", &format_args!("{}/{}", self.minor_index, self.minor_total))
            .field("module", &self.module_name)
            .field("counts", &self.major)
            .field("totals", &self.grand)
            .finish()
    }
}

/// Drives the selected major tests one after another.
pub struct ExecutionEngine<'a> {
    registry: &'a TestRegistry,
    env: &'a RunEnvironment,
    reporter: &'a dyn Reporter,
}

impl<'a> ExecutionEngine<'a> {
    pub fn new(registry: &'a TestRegistry, env: &'a RunEnvironment, reporter: &'a dyn Reporter) -> Self {
        Self { registry, env, reporter }
    }

    /// Resolve the selection and run it. Selection errors run nothing and
    /// classify as `Error`.
    pub fn resolve_and_run(&self, selection: &Selection) -> ExitClassification {
        match self.try_resolve_and_run(selection) {
            Ok(summary) => summary.exit,
            Err(e) => {
                error!("Test selection failed: {}", e);
                self.reporter.report_error(&self.selection_error_text(&e));
                ExitClassification::Error
            }
        }
    }

    pub fn try_resolve_and_run(&self, selection: &Selection) -> Result<RunSummary> {
        let run_list = selector::resolve(self.registry, selection)?;
        Ok(self.execute(&run_list))
    }

    fn selection_error_text(&self, err: &FrameworkError) -> String {
        match err {
            FrameworkError::UnknownTest(name) => format!(
                "No such test '{}', available tests:\n{}\n\nuse: fwcheck --show-tests or fwcheck --show-tests-full for more information.",
                name,
                self.registry.names().join(" ")
            ),
            other => other.to_string(),
        }
    }

    /// Run every test of `run_list` in order.
    pub fn execute(&self, run_list: &[&RegisteredTest]) -> RunSummary {
        let started = Instant::now();
        let heading = RunHeading::new(self.env, run_list);
        info!("Running {} tests: {}", run_list.len(), heading.test_list());
        self.reporter.report_start(&heading);

        let mut ctx = RunContext::new(run_list.len());
        let mut modules = Vec::with_capacity(run_list.len());
        let mut print_summary = false;

        for (index, test) in run_list.iter().enumerate() {
            ctx.major_index = index + 1;
            if !test.categories().is_utility() {
                print_summary = true;
            }
            modules.push(self.run_test(&mut ctx, test));
        }

        let summary = RunSummary {
            heading,
            modules,
            totals: ctx.grand,
            exit: ExitClassification::from_totals(&ctx.grand),
            print_summary,
            duration: started.elapsed(),
        };

        self.reporter.report_suite_result(&summary);
        summary
    }

    fn transition(&self, state: &mut ModuleState, next: ModuleState, name: &str) {
        debug!("{}: {:?} -> {:?}", name, state, next);
        *state = next;
    }

    fn run_test(&self, ctx: &mut RunContext, test: &RegisteredTest) -> ModuleReport {
        let module = test.module();
        let name = module.name();
        let minor_count = module.minor_count() as u32;
        let mut state = ModuleState::NotStarted;

        ctx.begin_module(module);
        self.reporter.report_test_start(module, ctx.major_index, ctx.major_total);
        ctx.report_progress(0, "", self.reporter);

        self.transition(&mut state, ModuleState::Initializing, name);
        let init = match module.init_hook() {
            Some(init) => init(&mut TestContext::new(self.env, self.reporter, ctx)),
            None => InitStatus::Ok,
        };

        let exit = match init {
            InitStatus::Skip => {
                ctx.major.skipped += minor_count;
                self.reporter.report_info("Test skipped.");
                self.transition(&mut state, ModuleState::SkippedAtInit, name);
                ModuleExit::SkippedAtInit
            }
            InitStatus::Fail => {
                ctx.major.aborted += minor_count;
                error!("Test {} aborted, initialisation failed", name);
                self.reporter.report_error("Aborted test, initialisation failed.");
                self.transition(&mut state, ModuleState::AbortedAtInit, name);
                ModuleExit::AbortedAtInit
            }
            InitStatus::Ok => {
                let exit = self.run_minor_tests(ctx, module, &mut state);
                self.transition(&mut state, ModuleState::Deinitializing, name);
                if let Some(deinit) = module.deinit_hook() {
                    deinit(&mut TestContext::new(self.env, self.reporter, ctx));
                }
                exit
            }
        };
        self.transition(&mut state, ModuleState::Done, name);

        accumulate(&mut ctx.grand, &ctx.major);
        ctx.state = None;

        let report = ModuleReport {
            name: name.to_string(),
            description: module.description().to_string(),
            categories: test.categories(),
            counts: ctx.major,
            severities: ctx.severities,
            verdict: Verdict::classify(&ctx.major, ctx.severities),
            exit,
            records: std::mem::take(&mut ctx.records),
        };

        if !report.categories.is_utility() {
            self.reporter.report_test_summary(&report);
        }
        report
    }

    fn run_minor_tests(&self, ctx: &mut RunContext, module: &TestModule, state: &mut ModuleState) -> ModuleExit {
        let total = module.minor_count();

        for (index, minor) in module.minor_tests().iter().enumerate() {
            let number = index + 1;
            self.transition(state, ModuleState::RunningMinor(number), module.name());

            ctx.begin_minor(number, minor.name());
            self.reporter.report_minor_start(number, total, minor.name());
            ctx.report_progress(0, "", self.reporter);

            let outcome = minor.run(&mut TestContext::new(self.env, self.reporter, ctx));

            if let Outcome::Aborted(message) = &outcome {
                let remaining = (total - index) as u32;
                warn!(
                    "{}: test {} aborted ({}), marking {} remaining tests aborted",
                    module.name(),
                    number,
                    message,
                    remaining
                );
                ctx.fold(outcome, self.reporter);
                ctx.major.aborted += remaining;
                return ModuleExit::AbortedAt(number);
            }

            ctx.fold(outcome, self.reporter);
            ctx.report_progress(100, "", self.reporter);
            accumulate(&mut ctx.major, &ctx.scratch);
            self.reporter.report_minor_result(minor.name(), &ctx.scratch);
        }

        ModuleExit::Completed
    }
}
