//! The `load` command.
//!
//! Runs a whole load session against a manifest: the world snapshot is
//! published from a blocking task, as a host's background decoder would,
//! while the load task is resumed on the foreground and yields to the
//! runtime between steps.

use std::path::PathBuf;
use std::sync::Arc;

use assetloader::config::LoaderSettings;
use assetloader::loader::{LoadSummary, LoadTask, Session, Step};
use assetloader::pool::DlcMask;
use assetloader::usage::{SimulationSnapshot, SnapshotGate};
use clap::Args;
use tracing::{debug, warn};

use crate::error::CliError;
use crate::manifest::Manifest;
use crate::progress::BarProgress;

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Manifest describing the content pool and the saved world
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Session name used in the report file name
    #[arg(short, long)]
    pub session: Option<String>,

    /// Do not write the assets report
    #[arg(long)]
    pub no_report: bool,

    /// Load only enabled items, ignoring the saved world
    #[arg(long)]
    pub enabled_only: bool,

    /// Owned DLC bitmask (default: all)
    #[arg(long)]
    pub dlc: Option<u32>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Settings file (default: the user settings file)
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

/// Run the load command.
pub fn run(args: LoadArgs) -> Result<(), CliError> {
    let mut settings = match &args.settings {
        Some(path) => LoaderSettings::load_from(path)?,
        None => LoaderSettings::load_or_default(),
    };
    if args.no_report {
        settings.report_assets = false;
    }
    if args.enabled_only {
        settings.load_used = false;
    }

    let manifest = Manifest::from_file(&args.manifest)?;
    let pool = manifest.pool()?;
    let snapshot = match manifest.world {
        Some(world) => world,
        None => {
            if settings.load_used {
                warn!("Manifest has no world; no used assets will be loaded");
            }
            SimulationSnapshot::default()
        }
    };

    let session_name = args.session.clone().unwrap_or_else(|| {
        args.manifest
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Session".to_string())
    });

    let progress = Arc::new(if args.json {
        BarProgress::hidden()
    } else {
        BarProgress::new()
    });

    let report_dir = settings.report_dir.clone();
    let session = Session::builder(settings, Arc::new(pool))
        .with_progress(progress.clone())
        .with_owned_dlc(args.dlc.map(DlcMask).unwrap_or(DlcMask::ALL))
        .with_session_name(session_name)
        .build();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    let summary = runtime.block_on(drive(session.task(), session.snapshot_gate(), snapshot))?;
    progress.finish();

    let stats = session.teardown();

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::Runtime(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    println!("Loaded:     {}", summary.counts);
    println!(
        "Registered: {} buildings, {} props, {} trees, {} vehicles",
        summary.registered.buildings,
        summary.registered.props,
        summary.registered.trees,
        summary.registered.vehicles
    );
    println!("Sharing:    {}", stats);
    println!(
        "Problems:   {} failed, {} not found ({} used but missing)",
        summary.failed, summary.not_found, summary.missing_used
    );
    for style in &summary.styles {
        println!("Style:      {} ({} buildings)", style.name, style.buildings.len());
    }
    if let Some(file) = &summary.report_file {
        println!("Report:     {}", report_dir.join(file).display());
    }

    Ok(())
}

async fn drive(
    mut task: LoadTask,
    gate: Arc<SnapshotGate>,
    snapshot: SimulationSnapshot,
) -> Result<LoadSummary, CliError> {
    let publisher = tokio::task::spawn_blocking(move || {
        let published = gate.publish(Arc::new(snapshot));
        debug!(published, "World snapshot published");
    });

    let summary = loop {
        match task.resume() {
            Step::Yield => tokio::task::yield_now().await,
            Step::Done(summary) => break summary,
        }
    };

    publisher
        .await
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    Ok(summary)
}
