//! lswitchd - Learning Switch Controller Daemon
//!
//! Entry point for the lswitchd daemon. Reads controller events from a
//! file or stdin and runs the FDB aging timer until the feed ends or the
//! process is interrupted.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lswitchd::{
    run_event_feed, AgingScheduler, LearningSwitch, LoggingActuator, LswitchConfig,
    MonotonicClock,
};

/// OpenFlow learning-switch controller
#[derive(Parser, Debug)]
#[command(name = "lswitchd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file [default: /etc/lswitch/lswitchd.conf]
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error or a RUST_LOG directive)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    /// Event feed to replay instead of stdin
    #[arg(short = 'e', long)]
    events: Option<PathBuf>,
}

/// Initializes tracing/logging subsystem
fn init_logging(filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {}", e))
}

async fn open_feed(path: Option<&PathBuf>) -> anyhow::Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open event feed {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    info!("--- Starting lswitchd ---");

    let config = match &args.config {
        Some(path) => LswitchConfig::load_or_default(path)?,
        None => LswitchConfig::load()?,
    };
    config.validate()?;
    info!(
        sweep_interval_secs = config.aging.sweep_interval_secs,
        ttl_secs = config.aging.ttl_secs,
        diagnostics = config.diagnostics.enabled,
        "Configuration loaded"
    );

    let controller = Arc::new(LearningSwitch::new(LoggingActuator, &config));
    let clock = MonotonicClock::new();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let aging = AgingScheduler::new(config.aging.sweep_interval()).spawn(
        Arc::clone(&controller),
        clock,
        shutdown_rx,
    );

    let feed = open_feed(args.events.as_ref()).await?;
    tokio::select! {
        result = run_event_feed(feed, controller.as_ref(), &clock) => {
            let summary = result?;
            info!(
                events = summary.events,
                packets = summary.packets,
                malformed = summary.malformed,
                "Event feed finished"
            );
        }
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down");
        }
    }

    if shutdown_tx.send(true).is_err() {
        warn!("Aging timer already stopped");
    }
    aging.await.context("aging timer panicked")?;

    for dpid in controller.switch_ids() {
        if let Some(engine) = controller.engine(dpid) {
            let stats = engine.stats();
            info!(
                %dpid,
                entries = engine.len(),
                ttl_secs = engine.aging_config().ttl_secs,
                learned = stats.learned,
                moved = stats.moved,
                forwarded = stats.forwarded,
                flooded = stats.flooded,
                aged_out = stats.aged_out,
                "Final FDB statistics"
            );
        }
    }

    info!("lswitchd shutdown complete");
    Ok(())
}
