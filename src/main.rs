use std::path::PathBuf;
use std::process;
use clap::{Parser, ValueEnum};
use anyhow::{Context, Result};
use log::debug;
use simple_logger::SimpleLogger;

use fwcheck::core::category::{Category, CategorySet};
use fwcheck::core::config::{self, TestConfig};
use fwcheck::core::engine::ExecutionEngine;
use fwcheck::core::environment::RunEnvironment;
use fwcheck::core::listing;
use fwcheck::core::registry::TestRegistry;
use fwcheck::core::selector::Selection;
use fwcheck::reporters::{csv::CsvReporter, json::JsonReporter, text::TextReporter, Reporter};


#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Tests to run; `-` sends results to stdout
    tests: Vec<String>,

    /// Run batch tests
    #[arg(short, long)]
    batch: bool,

    /// Run interactive tests
    #[arg(short, long)]
    interactive: bool,

    /// Run experimental batch tests
    #[arg(long)]
    batch_experimental: bool,

    /// Run experimental interactive tests
    #[arg(long)]
    interactive_experimental: bool,

    /// Run power state tests
    #[arg(short = 'P', long)]
    power_states: bool,

    /// Run utilities
    #[arg(short, long)]
    utils: bool,

    /// Run every category
    #[arg(short, long)]
    all: bool,

    /// Comma separated tests to skip
    #[arg(short = 'S', long, value_delimiter = ',')]
    skip_test: Vec<String>,

    /// List available tests
    #[arg(short, long)]
    show_tests: bool,

    /// List available tests and their minor tests
    #[arg(long)]
    show_tests_full: bool,

    /// Results log, `stdout` or `stderr`
    #[arg(short, long)]
    results_output: Option<String>,

    /// Truncate the results log instead of appending
    #[arg(short, long)]
    force_clean: bool,

    /// Show progress while running
    #[arg(short = 'p', long)]
    show_progress: bool,

    #[arg(short, long)]
    quiet: bool,

    /// Print each test's verdict to stdout
    #[arg(long)]
    stdout_summary: bool,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Write JSON or CSV output here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}


#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl From<OutputFormat> for config::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => config::OutputFormat::Text,
            OutputFormat::Json => config::OutputFormat::Json,
            OutputFormat::Csv => config::OutputFormat::Csv,
        }
    }
}

impl Cli {
    /// Categories named on the command line, `None` when none were.
    fn categories(&self) -> Option<CategorySet> {
        if self.all {
            return Some(CategorySet::ALL);
        }
        let picked: CategorySet = [
            (self.batch, Category::Batch),
            (self.interactive, Category::Interactive),
            (self.batch_experimental, Category::BatchExperimental),
            (self.interactive_experimental, Category::InteractiveExperimental),
            (self.power_states, Category::PowerStates),
            (self.utils, Category::Utils),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .map(|(_, category)| category)
        .collect();
        (!picked.is_empty()).then_some(picked)
    }

    fn apply(&self, config: &mut TestConfig) {
        if let Some(results) = &self.results_output {
            config.results_output = results.clone();
        }
        if let Some(format) = self.format {
            config.output_format = format.into();
        }
        config.force_clean |= self.force_clean;
        config.show_progress |= self.show_progress;
        config.quiet |= self.quiet;
        config.stdout_summary |= self.stdout_summary;
        config.verbose |= self.verbose;

        if self.tests.iter().any(|t| t == "-") {
            config.route_results_to_stdout();
        }
        if config.quiet {
            config.show_progress = false;
        }
    }
}


fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TestConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TestConfig::default(),
    };
    cli.apply(&mut config);

    let log_level = if config.verbose {
        log::LevelFilter::Debug
    } else if config.quiet {
        log::LevelFilter::Warn
    } else {
        log::LevelFilter::Info
    };

    SimpleLogger::new()
        .with_level(log_level)
        .init()
        .context("Failed to initialize logger")?;

    debug!("fwcheck v{}", env!("CARGO_PKG_VERSION"));

    let mut registry = TestRegistry::new();
    fwcheck::tests::register_all(&mut registry).context("Failed to register built-in tests")?;

    if cli.show_tests || cli.show_tests_full {
        print!("{}", listing::list_tests(&registry, cli.show_tests_full, cli.categories()));
        return Ok(());
    }

    let mut selection = Selection::new()
        .tests(cli.tests.iter().filter(|t| t.as_str() != "-"))
        .skip(cli.skip_test.iter().filter(|t| !t.is_empty()));
    if let Some(categories) = cli.categories() {
        selection = selection.categories(categories);
    }

    let format = config.output_format;
    let env = RunEnvironment::detect(config);

    let reporter: Box<dyn Reporter> = match format {
        config::OutputFormat::Text => Box::new(
            TextReporter::new(&env.config, env.labels.clone())
                .with_context(|| format!("Cannot open results output {}", env.config.results_output))?,
        ),
        config::OutputFormat::Json => Box::new(JsonReporter::new(cli.output.clone())),
        config::OutputFormat::Csv => Box::new(CsvReporter::new(cli.output.clone())),
    };

    let engine = ExecutionEngine::new(&registry, &env, reporter.as_ref());
    let exit = engine.resolve_and_run(&selection);
    debug!("Run finished: {:?}", exit);

    process::exit(exit.exit_code());
}
