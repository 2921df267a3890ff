//! Demo driver: monitors two simulated agent actions, then slows them down to
//! trigger drift alerts, and exports the recorded events.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use agentops::config::{MonitorConfig, loader};
use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const INPUTS: [&str; 5] = [
    "Hello world",
    "This is a test message",
    "AgentOps monitoring example",
    "Simulate data processing",
    "Another test input",
];

#[derive(Debug, Parser)]
#[command(about = "Simulated agent workload instrumented with agentops")]
struct Args {
    /// Project label for the session.
    #[arg(long, default_value = "demo_agent")]
    project: String,

    /// Optional API key recorded in the monitor configuration.
    #[arg(long)]
    api_key: Option<String>,

    /// JSON configuration file; overrides --project and --api-key.
    #[arg(long)]
    config: Option<PathBuf>,

    /// How long to wait before capturing the baseline, in milliseconds.
    #[arg(long, default_value_t = 500)]
    baseline_wait_ms: u64,

    /// Latency multiplier applied after the baseline is captured.
    #[arg(long, default_value_t = 2)]
    slowdown: u64,

    /// Destination of the exported events.
    #[arg(long, default_value = "agent_events.json")]
    export: PathBuf,
}

#[derive(Debug)]
struct ProcessingError(String);

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ProcessingError {}

async fn process_data((text, delay_ms): (String, u64)) -> Result<String, ProcessingError> {
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    if delay_ms % 5 == 4 {
        return Err(ProcessingError(format!("processing failed for {text:?}")));
    }
    Ok(format!("Processed: {}", text.to_uppercase()))
}

async fn analyze_text(
    (text, delay_ms): (String, u64),
) -> Result<serde_json::Value, ProcessingError> {
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    Ok(json!({
        "word_count": text.split_whitespace().count(),
        "char_count": text.chars().count(),
    }))
}

async fn run_round(slowdown: u64) -> Result<()> {
    let process = agentops::record_action("process_data")?.wrap(process_data);
    let analyze = agentops::record_action("analyze_text")?.wrap(analyze_text);

    for (i, text) in (0_u64..).zip(INPUTS) {
        let base = 100 + (i * 37) % 120;
        match process.call_async((text.to_owned(), base * slowdown)).await {
            Ok(result) => info!(input = text, %result, "processed"),
            Err(err) => warn!(input = text, %err, "processing error"),
        }
        match analyze.call_async((text.to_owned(), (base / 2) * slowdown)).await {
            Ok(analysis) => info!(input = text, %analysis, "analyzed"),
            Err(err) => warn!(input = text, %err, "analysis error"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => loader::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => {
            let config = MonitorConfig::new(args.project.clone());
            match &args.api_key {
                Some(key) => config.with_api_key(key.clone()),
                None => config,
            }
        }
    };

    let monitor = agentops::init(config)?;
    info!(session_id = %monitor.session_id(), "=== agentops demo: basic monitoring ===");

    run_round(1).await?;
    info!(stats = %serde_json::to_string(&agentops::get_stats()?)?, "initial stats");

    match agentops::establish_baseline(Duration::from_millis(args.baseline_wait_ms)).await? {
        Some(baseline) => info!(
            avg_latency_ms = baseline.avg_latency_ms(),
            events = baseline.event_count(),
            "baseline ready"
        ),
        None => warn!("no events recorded; drift detection disabled"),
    }

    info!(slowdown = args.slowdown, "running degraded workload");
    run_round(args.slowdown).await?;

    for action in monitor.stats_by_action_type() {
        info!(
            action_type = %action.action_type,
            events = action.total_events,
            success_rate = action.success_rate,
            avg_latency_ms = action.avg_latency_ms,
            "per-action stats"
        );
    }
    info!(stats = %serde_json::to_string(&agentops::get_stats()?)?, "final stats");

    let exported = agentops::export_events(&args.export).await?;
    info!(path = %args.export.display(), events = exported, "export complete");

    agentops::shutdown();
    Ok(())
}
