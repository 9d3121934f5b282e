//! FleetDispatch - concurrent delivery dispatcher
//!
//! A CLI tool that sends delivery tasks to ground, air and sea transport
//! agents concurrently and reports one outcome per task.
//!
//! Exit codes:
//!   0 - Success (or failures present without --fail-on-failure)
//!   1 - Runtime error (invalid arguments, unreadable or invalid fleet file)
//!   2 - At least one delivery failed and --fail-on-failure was set

mod agent;
mod analysis;
mod cli;
mod config;
mod dispatch;
mod error;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, OutputFormat, DEFAULT_CONFIG_FILE};
use dispatch::{DispatchOptions, Dispatcher};
use models::{AgentStatus, Report};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(mut config) => {
            config.merge_with_args(&args);
            config
        }
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(config.log_level(&args));

    info!("FleetDispatch v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_dispatch(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dispatch failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .fleetdispatch.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with the demo fleet.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to declare your own agents, tasks and transit times.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the fleet, dispatch every task and render the outcomes.
/// Returns the process exit code (0 or 2).
async fn run_dispatch(args: Args, config: Config) -> Result<i32> {
    match args.config {
        Some(ref path) => info!("Loaded fleet from: {}", path.display()),
        None => debug!("Using {} or the demo fleet", DEFAULT_CONFIG_FILE),
    }

    let fleet = config.build_fleet().context("Invalid fleet configuration")?;
    if fleet.tasks.is_empty() {
        warn!("Fleet declares no tasks; nothing will be dispatched");
    }
    info!(
        "Fleet ready: {} agents, {} tasks",
        fleet.agents.len(),
        fleet.tasks.len()
    );

    let statuses: Vec<AgentStatus> = fleet
        .agents
        .iter()
        .map(|agent| AgentStatus {
            agent_id: agent.id().to_string(),
            agent_kind: agent.kind(),
            status: agent.status(),
        })
        .collect();

    if args.dry_run {
        return handle_dry_run(&statuses, &fleet.tasks);
    }

    let dispatcher = Dispatcher::new(DispatchOptions {
        show_progress: args.show_progress(),
    });
    let dispatched_at = Utc::now();
    let batch = dispatcher.dispatch_batch(fleet.tasks).await;
    let has_failures = batch.has_failures();

    let report = Report::new(dispatched_at, statuses, batch);
    if has_failures {
        warn!(
            "{} of {} deliveries failed",
            report.summary.failed, report.summary.total
        );
    }

    let output = match config.general.format {
        OutputFormat::Text => report::generate_text_report(&report),
        OutputFormat::Markdown => report::generate_markdown_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    if args.fail_on_failure && has_failures {
        eprintln!(
            "\n⛔ {} deliveries failed. Failing (exit code 2).",
            report.summary.failed
        );
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: print the fleet and planned tasks, exit.
fn handle_dry_run(statuses: &[AgentStatus], tasks: &[dispatch::Task]) -> Result<i32> {
    println!("\n🔍 Dry run: no deliveries will be attempted.\n");

    println!("   Fleet:");
    for status in statuses {
        println!("     🚚 [{}] {}", status.agent_kind, status.status);
    }

    println!("\n   {} planned tasks:", tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        println!(
            "     {}. {} {} -> {} (up to {:.1}s)",
            i,
            task.agent.kind().vehicle(),
            task.agent.id(),
            task.destination,
            task.agent.transit().upper_bound().as_secs_f64()
        );
    }

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, since the fleet file can turn on
/// verbose output.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    Ok(Config::load_default()?.unwrap_or_default())
}
