//! In-memory collaborators for dry runs and tests.

use std::collections::HashSet;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use hedgebot_core::{
    ExposureInput, HedgeClose, HedgeRow, HedgeSignal, HedgeStatus, HedgeStore, NewHedge,
    SignalPublisher, TradeLedger,
};
use parking_lot::Mutex;
use serde_json::Value as JsonValue;

/// Shallow-merges `patch` into `base` when both are objects; otherwise replaces.
pub fn merge_metadata(base: &mut JsonValue, patch: &JsonValue) {
    match (base.as_object_mut(), patch.as_object()) {
        (Some(target), Some(source)) => {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }
        _ => *base = patch.clone(),
    }
}

#[derive(Default)]
struct StoreState {
    rows: Vec<HedgeRow>,
    next_id: i64,
    fail_reads: bool,
    fail_inserts: HashSet<String>,
    fail_closes: HashSet<i64>,
}

/// Hedge registry held in memory, with switchable failures.
#[derive(Default)]
pub struct InMemoryHedgeStore {
    state: Mutex<StoreState>,
}

impl InMemoryHedgeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing rows. Ids continue after the highest seeded id.
    #[must_use]
    pub fn with_rows(rows: Vec<HedgeRow>) -> Self {
        let next_id = rows.iter().map(|r| r.id).max().unwrap_or(0);
        Self {
            state: Mutex::new(StoreState {
                rows,
                next_id,
                ..Default::default()
            }),
        }
    }

    /// Snapshot of every row.
    #[must_use]
    pub fn rows(&self) -> Vec<HedgeRow> {
        self.state.lock().rows.clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// Inserts for `symbol` fail until cleared.
    pub fn fail_inserts_for(&self, symbol: &str) {
        self.state.lock().fail_inserts.insert(symbol.to_string());
    }

    /// Closing `id` fails until cleared.
    pub fn fail_close_for(&self, id: i64) {
        self.state.lock().fail_closes.insert(id);
    }
}

#[async_trait]
impl HedgeStore for InMemoryHedgeStore {
    async fn active_hedges(&self) -> Result<Vec<HedgeRow>> {
        self.list_hedges(Some(HedgeStatus::Open)).await
    }

    async fn list_hedges(&self, status: Option<HedgeStatus>) -> Result<Vec<HedgeRow>> {
        let state = self.state.lock();
        if state.fail_reads {
            bail!("hedge registry unavailable");
        }
        let mut rows: Vec<HedgeRow> = state
            .rows
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }

    async fn insert_hedge(&self, hedge: &NewHedge) -> Result<HedgeRow> {
        let mut state = self.state.lock();
        if state.fail_inserts.contains(&hedge.symbol) {
            bail!("insert rejected for {}", hedge.symbol);
        }
        let duplicate = state.rows.iter().any(|r| {
            r.is_open() && r.symbol == hedge.symbol && r.reason == hedge.reason
        });
        if duplicate {
            bail!("open hedge already exists for {} {}", hedge.symbol, hedge.reason);
        }

        state.next_id += 1;
        let row = HedgeRow {
            id: state.next_id,
            symbol: hedge.symbol.clone(),
            hedge_symbol: hedge.hedge_symbol.clone(),
            side: hedge.side,
            qty: hedge.qty,
            reason: hedge.reason,
            status: HedgeStatus::Open,
            score: Some(hedge.score),
            metadata: hedge.metadata.clone(),
            close_price: None,
            opened_at: Utc::now(),
            closed_at: None,
        };
        state.rows.push(row.clone());
        Ok(row)
    }

    async fn close_hedge(&self, id: i64, close: &HedgeClose) -> Result<HedgeRow> {
        let mut state = self.state.lock();
        if state.fail_closes.contains(&id) {
            bail!("close rejected for hedge {id}");
        }
        let row = state
            .rows
            .iter_mut()
            .find(|r| r.id == id && r.is_open())
            .ok_or_else(|| anyhow!("hedge {id} not found or not open"))?;

        row.status = HedgeStatus::Closed;
        row.close_price = close.close_price;
        row.closed_at = Some(Utc::now());
        merge_metadata(&mut row.metadata, &close.metadata);
        Ok(row.clone())
    }
}

/// Ledger that returns a fixed set of exposures.
#[derive(Default)]
pub struct StaticLedger {
    exposures: Mutex<Vec<ExposureInput>>,
    fail: Mutex<bool>,
}

impl StaticLedger {
    #[must_use]
    pub fn new(exposures: Vec<ExposureInput>) -> Self {
        Self {
            exposures: Mutex::new(exposures),
            fail: Mutex::new(false),
        }
    }

    pub fn set_exposures(&self, exposures: Vec<ExposureInput>) {
        *self.exposures.lock() = exposures;
    }

    pub fn fail_reads(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

#[async_trait]
impl TradeLedger for StaticLedger {
    async fn open_exposures(&self) -> Result<Vec<ExposureInput>> {
        if *self.fail.lock() {
            bail!("trade ledger unavailable");
        }
        Ok(self.exposures.lock().clone())
    }
}

/// Publisher that keeps every signal it is handed.
#[derive(Default)]
pub struct RecordingPublisher {
    signals: Mutex<Vec<HedgeSignal>>,
    fail: Mutex<bool>,
}

impl RecordingPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signals(&self) -> Vec<HedgeSignal> {
        self.signals.lock().clone()
    }

    pub fn fail_publishes(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

#[async_trait]
impl SignalPublisher for RecordingPublisher {
    async fn publish(&self, signal: &HedgeSignal) -> Result<()> {
        if *self.fail.lock() {
            bail!("signal channel unavailable");
        }
        self.signals.lock().push(signal.clone());
        Ok(())
    }
}
