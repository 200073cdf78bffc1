use anyhow::Context;
use clap::Parser;
use generator::profile::build_run;
use gui_bridge::bridge::GuiBridge;
use pacecore::fix_interface::parse_fix_batch;
use pacecore::{Fix, PassiveSource, Tracker};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::{Runner, WorkflowResult};

mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Driver for the live pace tracking core")]
struct Args {
    /// Generate a synthetic run, replay it and emit a summary
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Replay a recorded JSON array of fixes
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    #[arg(long, default_value_t = 600)]
    fix_count: usize,
    #[arg(long, default_value_t = 3.0)]
    speed_mps: f64,
    /// Use the inverted speed check (accept only negative reported speed)
    #[arg(long, default_value_t = false)]
    legacy_speed: bool,
    /// Keep the HTTP bridge alive for a live fix source
    #[arg(long, default_value_t = false)]
    serve: bool,
    #[arg(long, default_value = "127.0.0.1:9000")]
    bind: SocketAddr,
    /// Write the per-delivery pace trace of the offline or replay run as JSON
    #[arg(long)]
    trace: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.fix_count, args.speed_mps, args.legacy_speed)
    };
    let runner = Runner::new(workflow_config.clone());

    if args.offline {
        let fixes = build_run(&workflow_config.generator).context("generating synthetic run")?;
        let result = runner.execute(&fixes)?;
        let label = workflow_config
            .generator
            .scenario
            .clone()
            .unwrap_or_else(|| "synthetic".to_string());
        let report = summarize(&label, &fixes, &result);
        println!("Offline run -> {}", report.trim_end());

        let report_path = PathBuf::from("tools/data/offline_run.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening report {}", report_path.display()))?;
        file.write_all(report.as_bytes())?;

        if let Some(path) = &args.trace {
            write_trace(path, &result)?;
        }
    }

    if let Some(path) = &args.replay {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading replay {}", path.display()))?;
        let fixes = parse_fix_batch(&contents)
            .with_context(|| format!("parsing replay {}", path.display()))?;
        let result = runner.execute(&fixes)?;
        let label = path.display().to_string();
        println!("Replay -> {}", summarize(&label, &fixes, &result).trim_end());

        if let Some(path) = &args.trace {
            write_trace(path, &result)?;
        }
    }

    if args.serve {
        let mut tracker = Tracker::new(PassiveSource, workflow_config.tracker.clone())
            .context("building live tracker")?;
        tracker.start();
        let bridge = GuiBridge::new(tracker);
        bridge.serve(args.bind);
        bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");

        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
        bridge.with_tracker(|tracker| tracker.stop());
    }

    Ok(())
}

fn write_trace(path: &Path, result: &WorkflowResult) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating trace {}", path.display()))?;
    serde_json::to_writer_pretty(file, &result.pace_trace)
        .with_context(|| format!("writing trace {}", path.display()))?;
    Ok(())
}

fn summarize(label: &str, fixes: &[Fix], result: &WorkflowResult) -> String {
    let snapshot = &result.snapshot;
    let valid_paces = result
        .pace_trace
        .iter()
        .filter(|point| point.pace_min_per_km.is_some())
        .count();
    format!(
        "run={} fixes={} accepted={} rejected={} track={} debug={} pace=\"{}\" distance=\"{}\" paced_deliveries={}/{}\n",
        label,
        fixes.len(),
        snapshot.counters.accepted,
        snapshot.counters.rejected(),
        snapshot.track_count,
        result.debug_export.len(),
        snapshot.pace,
        snapshot.distance,
        valid_paces,
        result.pace_trace.len()
    )
}
