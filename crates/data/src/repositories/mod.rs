//! Database repositories for the hedge engine's collaborators.

pub mod hedge_repo;
pub mod signal_repo;
pub mod trade_ledger_repo;

pub use hedge_repo::PgHedgeRepository;
pub use signal_repo::PgSignalChannel;
pub use trade_ledger_repo::PgTradeLedger;

use sqlx::PgPool;

/// Creates all repositories from a single database pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub hedges: PgHedgeRepository,
    pub ledger: PgTradeLedger,
    pub signals: PgSignalChannel,
}

impl Repositories {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            hedges: PgHedgeRepository::new(pool.clone()),
            ledger: PgTradeLedger::new(pool.clone()),
            signals: PgSignalChannel::new(pool),
        }
    }
}
