//! Gatherer CLI - runs the jewel-gathering agent.
//!
//! Single binary that provides:
//! - `gatherer run` - drive the agent in the sandbox world
//! - `gatherer status` - recent kernel events
//! - `gatherer rules` - the standard rule bank
//! - `gatherer init` - write a default config

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use gatherer_kernel::observability::EventEmitter;
use gatherer_kernel::{CognitiveCycleScheduler, KernelConfig, SandboxWorld, WorldServer};
use gatherer_rules::RuleBank;

#[derive(Parser)]
#[command(name = "gatherer")]
#[command(about = "Rule-based jewel gathering agent", version)]
struct Cli {
    /// Project root directory
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent against the built-in sandbox world
    Run {
        /// Stop after this many cycles
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Pause between cycles, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Arbitration seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent kernel events
    Status {
        /// Number of events to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// List the standard rule bank
    Rules,

    /// Initialize a new project
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    fmt().with_env_filter(filter).with_target(false).init();

    let project_root = match cli.project {
        Some(p) => p,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Run {
            max_cycles,
            delay_ms,
            seed,
            json,
        } => run_agent(&project_root, max_cycles, delay_ms, seed, json).await,
        Commands::Status { limit } => show_status(&project_root, limit),
        Commands::Rules => list_rules(),
        Commands::Init => init_project(&project_root),
    }
}

async fn run_agent(
    project_root: &Path,
    max_cycles: Option<u64>,
    delay_ms: Option<u64>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let mut config = KernelConfig::load_from_project(project_root)?;
    config.resolve_paths(project_root);
    if max_cycles.is_some() {
        config.max_cycles = max_cycles;
    }
    if let Some(ms) = delay_ms {
        config.cycle_delay_ms = ms;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }

    tracing::info!(
        project = %project_root.display(),
        seed = config.seed,
        max_cycles = ?config.max_cycles,
        "Starting agent"
    );

    let events = EventEmitter::new(&config.events_path);
    let world = Arc::new(SandboxWorld::demo_arena());
    let mut scheduler = CognitiveCycleScheduler::new(Arc::clone(&world), config, RuleBank::standard())
        .with_events(events);

    scheduler.start();

    let report = tokio::select! {
        report = scheduler.join() => report,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping agent");
            scheduler.abort(true);
            scheduler.join().await
        }
    };
    let report = report.context("Agent worker did not report")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Run {}", report.run_id);
    println!("  cycles:    {}", report.cycles);
    println!("  stopped:   {:?}", report.reason);
    println!("  delivered: {:?}", report.delivered);
    println!("  commands:  {} sent, {} refused", world.commands().len(), world.rejected().len());
    println!("  connected: {}", world.is_connected());

    Ok(())
}

fn show_status(project_root: &Path, limit: usize) -> Result<()> {
    let mut config = KernelConfig::load_from_project(project_root)?;
    config.resolve_paths(project_root);

    let events = EventEmitter::new(&config.events_path);
    let recent = events.read_recent(limit);

    println!("Gatherer Status");
    println!("===============");
    println!();
    println!("Project: {}", project_root.display());
    println!("Events:  {}", events.path().display());
    println!();

    if recent.is_empty() {
        println!("No events recorded yet. Run: gatherer run --max-cycles 200");
        return Ok(());
    }

    println!("Recent events:");
    for event in &recent {
        let cycle = event
            .cycle
            .map(|c| format!(" cycle {c}"))
            .unwrap_or_default();
        println!(
            "  {} [{}]{} {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.event_type,
            cycle,
            event.message
        );
    }

    Ok(())
}

fn list_rules() -> Result<()> {
    let bank = RuleBank::standard();

    println!("{:<16} {:<20} {:>6}  partial", "rule", "action", "weight");
    for rule in bank.rules() {
        println!(
            "{:<16} {:<20} {:>6.2}  {}",
            rule.id,
            rule.action.label(),
            rule.weight,
            rule.partial_match
        );
    }

    Ok(())
}

fn init_project(project_root: &Path) -> Result<()> {
    let gatherer_dir = project_root.join(".gatherer");
    std::fs::create_dir_all(&gatherer_dir)?;

    let config_path = gatherer_dir.join("config.yaml");
    if !config_path.exists() {
        std::fs::write(&config_path, KernelConfig::default_yaml())?;
    }

    println!("Initialized gatherer project at {}", project_root.display());
    println!();
    println!("Created:");
    println!("  .gatherer/config.yaml - kernel configuration");
    println!();
    println!("Next steps:");
    println!("  1. Adjust thresholds or the seed in .gatherer/config.yaml");
    println!("  2. Run: gatherer run --max-cycles 200");

    Ok(())
}
