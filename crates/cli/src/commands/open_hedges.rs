use anyhow::Result;
use clap::Args;
use hedgebot_core::{HedgeStatus, HedgeStore};
use hedgebot_data::{DatabaseClient, PgHedgeRepository};

use super::load_config;

/// Arguments for the open-hedges command.
#[derive(Args, Debug, Clone)]
pub struct OpenHedgesArgs {
    /// Status filter (OPEN, CLOSED, CANCELLED); omit to list open hedges
    #[arg(long, default_value = "OPEN")]
    pub status: HedgeStatus,

    /// Database connection URL (overrides `[database].url`)
    #[arg(long, env = "DATABASE_URL")]
    pub db_url: Option<String>,
}

/// Prints registry rows as a table.
///
/// # Errors
/// Returns an error if the database cannot be reached.
pub async fn run_open_hedges(args: OpenHedgesArgs, profile: Option<&str>) -> Result<()> {
    let config = load_config(profile)?;
    let url = args.db_url.unwrap_or(config.database.url);
    let db = DatabaseClient::connect(&url, config.database.max_connections).await?;
    let hedges = PgHedgeRepository::new(db.pool().clone())
        .list_hedges(Some(args.status))
        .await?;

    if hedges.is_empty() {
        println!("No {} hedges", args.status);
        return Ok(());
    }

    println!(
        "{:>6}  {:<10} {:<10} {:<12} {:>14}  {:<10} {}",
        "ID", "SYMBOL", "HEDGE", "SIDE", "QTY", "REASON", "OPENED"
    );
    for h in &hedges {
        println!(
            "{:>6}  {:<10} {:<10} {:<12} {:>14}  {:<10} {}",
            h.id,
            h.symbol,
            h.hedge_symbol,
            h.side.as_str(),
            h.qty.to_string(),
            h.reason.as_str(),
            h.opened_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}
