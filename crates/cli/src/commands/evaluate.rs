//! Runs one full hedge cycle against Postgres and prints the response.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::{connect_engine, load_config, read_request};

/// Arguments for the evaluate command.
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Path to a JSON hedge request
    #[arg(short, long)]
    pub request: PathBuf,

    /// Database connection URL (overrides `[database].url`)
    #[arg(long, env = "DATABASE_URL")]
    pub db_url: Option<String>,
}

/// # Errors
/// Returns an error if the request is unreadable or invalid, or a collaborator read fails.
pub async fn run_evaluate(args: EvaluateArgs, profile: Option<&str>) -> Result<()> {
    let config = load_config(profile)?;
    let request = read_request(&args.request)?;
    let engine = connect_engine(&config, args.db_url).await?;

    let response = engine.evaluate(request).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
