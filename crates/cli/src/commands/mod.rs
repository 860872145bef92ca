//! CLI commands for the hedge engine.

pub mod evaluate;
pub mod open_hedges;
pub mod plan;
pub mod serve;

pub use evaluate::{run_evaluate, EvaluateArgs};
pub use open_hedges::{run_open_hedges, OpenHedgesArgs};
pub use plan::{run_plan, PlanArgs};
pub use serve::{run_serve, ServeArgs};

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use hedgebot_core::{AppConfig, ConfigLoader};
use hedgebot_data::{DatabaseClient, Repositories};
use hedgebot_hedge_engine::{HedgeEngine, HedgeRequest};

/// Loads layered config, applying `profile` when given.
pub fn load_config(profile: Option<&str>) -> Result<AppConfig> {
    match profile {
        Some(profile) => ConfigLoader::load_with_profile(profile),
        None => ConfigLoader::load(),
    }
}

/// Reads a JSON hedge request from disk.
pub fn read_request(path: &Path) -> Result<HedgeRequest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse request file {}", path.display()))
}

/// Builds an engine over the Postgres adapters.
pub async fn connect_engine(config: &AppConfig, db_url: Option<String>) -> Result<HedgeEngine> {
    let url = db_url.unwrap_or_else(|| config.database.url.clone());
    let db = DatabaseClient::connect(&url, config.database.max_connections).await?;
    let repos = Repositories::new(db.pool().clone());

    Ok(HedgeEngine::new(
        Arc::new(repos.hedges),
        Arc::new(repos.ledger),
        Arc::new(repos.signals),
        config.hedge.clone(),
    ))
}
