//! Command line definitions and handlers

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use enforcer_core::logging::init_logging;
use enforcer_core::{
    ConfigLoader, EnforcementReport, Enforcer, EnforcerConfig, EnforcerOptions, ExecutionOutcome,
    PropertyEvaluator, ResultCache, RuleContext, RuleRegistry,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

/// Command line interface for the build rule enforcer
#[derive(Parser, Debug)]
#[command(name = "enforcer")]
#[command(about = "Build Rule Enforcer - run configured build rules and fail on violations")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the configured rules
    Check(CheckArgs),
    /// List registered rules
    List,
}

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Module directory to check; repeat for several modules
    #[arg(short, long = "module", value_name = "DIR")]
    pub modules: Vec<PathBuf>,

    /// Check modules concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Stop at the first ERROR-level failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Only log ERROR-level failures
    #[arg(long)]
    pub no_fail: bool,

    /// Execute equivalent rules again even if they already ran
    #[arg(long)]
    pub ignore_cache: bool,

    /// Do nothing
    #[arg(long)]
    pub skip: bool,

    /// Leave a rule out of the run; repeatable
    #[arg(long = "skip-rule", value_name = "NAME")]
    pub skip_rules: Vec<String>,

    /// Build property, overriding the configuration file
    #[arg(short = 'D', long = "property", value_name = "KEY=VALUE", value_parser = parse_property)]
    pub properties: Vec<(String, String)>,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    /// Fold command line overrides into the loaded configuration
    fn apply(&self, config: &mut EnforcerConfig) {
        config.skip |= self.skip;
        config.fail_fast |= self.fail_fast;
        config.ignore_cache |= self.ignore_cache;
        if self.no_fail {
            config.fail_build = false;
        }
        config.skip_rules.extend(self.skip_rules.iter().cloned());
        config.properties.extend(self.properties.iter().cloned());
    }
}

/// Parse `KEY=VALUE`
fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load().context("Failed to load configuration")?;

    match cli.command {
        Commands::List => {
            list();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check(args) => {
            args.apply(&mut config);
            init_logging(&config.logging).context("Failed to initialize logging")?;
            check(&config, &args)
        }
    }
}

fn list() {
    let registry = RuleRegistry::discover();
    for (name, implementation, description) in registry.list() {
        println!("{name:<28} {implementation:<44} {description}");
    }
}

fn check(config: &EnforcerConfig, args: &CheckArgs) -> anyhow::Result<ExitCode> {
    let registry = Arc::new(RuleRegistry::discover());
    // One cache per invocation, shared by every module pass
    let cache = Arc::new(ResultCache::new());
    let enforcer = Enforcer::new(registry, cache)
        .with_options(EnforcerOptions::from(config))
        .with_evaluator(Arc::new(PropertyEvaluator::new(config.properties.clone())));

    let modules = if args.modules.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.modules.clone()
    };
    debug!(modules = modules.len(), parallel = args.parallel, "Starting enforcement");

    let pass = |module: &PathBuf| {
        let ctx = RuleContext::new(module).with_properties(config.properties.clone());
        enforcer.run(&config.rules, &ctx)
    };

    let outcomes: Vec<_> = if args.parallel {
        modules.par_iter().map(|m| (m, pass(m))).collect()
    } else {
        // Sequential passes stop at the first module that breaks the build
        let mut outcomes = Vec::with_capacity(modules.len());
        for module in &modules {
            let outcome = pass(module);
            let failed = outcome.is_err();
            outcomes.push((module, outcome));
            if failed {
                break;
            }
        }
        outcomes
    };

    // A concurrent pass may have skipped a rule whose first run later failed
    let flag_cached = args.parallel && outcomes.iter().any(|(_, outcome)| outcome.is_err());

    let mut failed = false;
    for (module, outcome) in outcomes {
        match outcome {
            Ok(report) => {
                print_report(module, &report, args.json)?;
                if flag_cached {
                    for note in cached_notes(module, &report) {
                        eprintln!("{note}");
                    }
                }
            }
            Err(e) if e.is_policy_failure() => {
                failed = true;
                eprintln!("[{}] Some rules have failed:\n{e}", module.display());
            }
            Err(e) => {
                failed = true;
                eprintln!("[{}] {e}", module.display());
            }
        }
    }

    if failed {
        Ok(ExitCode::FAILURE)
    } else {
        info!("Rule enforcement finished");
        Ok(ExitCode::SUCCESS)
    }
}

fn print_report(module: &Path, report: &EnforcementReport, json: bool) -> anyhow::Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{rendered}");
    } else if report.skipped {
        println!("[{}] skipped", module.display());
    } else {
        println!(
            "[{}] {} passed, {} cached, {} failed without breaking the build",
            module.display(),
            report.passed_count(),
            report.cached_count(),
            report.failed_count()
        );
    }
    Ok(())
}

/// One line per rule of `report` that was skipped as already run elsewhere
fn cached_notes(module: &Path, report: &EnforcementReport) -> Vec<String> {
    report
        .results
        .iter()
        .filter(|r| r.outcome == ExecutionOutcome::SkippedCached)
        .map(|r| {
            format!(
                "[{}] Rule {}: {} was not checked here, an equivalent rule ran in another module; \
                 rerun with --ignore-cache to check it",
                module.display(),
                r.index,
                r.implementation
            )
        })
        .collect()
}
