use crate::hedge::{ExposureInput, HedgeClose, HedgeRow, HedgeSignal, HedgeStatus, NewHedge};
use anyhow::Result;
use async_trait::async_trait;

/// Persisted hedge registry. The engine's only write target.
#[async_trait]
pub trait HedgeStore: Send + Sync {
    /// All rows with status `OPEN`.
    async fn active_hedges(&self) -> Result<Vec<HedgeRow>>;

    /// Rows filtered by status, or every row when `status` is `None`.
    async fn list_hedges(&self, status: Option<HedgeStatus>) -> Result<Vec<HedgeRow>>;

    async fn insert_hedge(&self, hedge: &NewHedge) -> Result<HedgeRow>;

    /// Moves an `OPEN` row to `CLOSED`. Fails if the row is missing or no longer open.
    async fn close_hedge(&self, id: i64, close: &HedgeClose) -> Result<HedgeRow>;
}

/// Read-only view of the trade ledger.
#[async_trait]
pub trait TradeLedger: Send + Sync {
    /// Exposures for trades without a close timestamp.
    async fn open_exposures(&self) -> Result<Vec<ExposureInput>>;
}

/// Outbound channel consumed by execution infrastructure.
#[async_trait]
pub trait SignalPublisher: Send + Sync {
    async fn publish(&self, signal: &HedgeSignal) -> Result<()>;
}
