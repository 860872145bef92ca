//! Dry run: computes a cycle's decisions without touching the database.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use hedgebot_core::HedgeRow;
use hedgebot_hedge_engine::{HedgeEngine, InMemoryHedgeStore, RecordingPublisher, StaticLedger};

use super::{load_config, read_request};

/// Arguments for the plan command.
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Path to a JSON hedge request (must carry its own exposures)
    #[arg(short, long)]
    pub request: PathBuf,

    /// JSON array of hedge rows to treat as the current registry
    #[arg(long)]
    pub active: Option<PathBuf>,
}

fn read_active(path: &Path) -> Result<Vec<HedgeRow>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read active hedges {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse active hedges {}", path.display()))
}

/// # Errors
/// Returns an error if an input file is unreadable or the request is invalid.
pub async fn run_plan(args: PlanArgs, profile: Option<&str>) -> Result<()> {
    let config = load_config(profile)?;
    let request = read_request(&args.request)?;
    let active = args.active.as_deref().map(read_active).transpose()?.unwrap_or_default();

    let engine = HedgeEngine::new(
        Arc::new(InMemoryHedgeStore::with_rows(active)),
        Arc::new(StaticLedger::default()),
        Arc::new(RecordingPublisher::new()),
        config.hedge,
    );

    let plan = engine.plan(request).await?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
