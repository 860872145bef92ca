//! `PostgreSQL` adapters for the hedge engine.
//!
//! - Hedge registry (`hedges` table) with open/close transitions
//! - Read-only view of open trades in the ledger
//! - Signal channel (`signals` table) consumed by execution

pub mod database;
pub mod repositories;

pub use database::DatabaseClient;
pub use repositories::{PgHedgeRepository, PgSignalChannel, PgTradeLedger, Repositories};
