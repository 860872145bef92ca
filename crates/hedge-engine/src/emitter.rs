//! Persists planned decisions and publishes the matching signals.

use anyhow::{Context, Result};
use hedgebot_core::{HedgeClose, HedgeRow, HedgeSignal, HedgeStore, NewHedge, SignalPublisher};
use serde_json::json;
use tracing::{info, warn};

use crate::types::{HedgeDecision, HedgePlan, HedgeResponse, HedgeSummary};

/// Applies a plan against the hedge registry and signal channel.
///
/// Decisions are handled one at a time. A failed write skips that decision.
/// `opened` and `closed` list every persisted row, including rows whose signal
/// failed to publish. Write and publish failures are both counted in
/// `summary.failed` and never abort the cycle.
pub struct DecisionEmitter<'a> {
    store: &'a dyn HedgeStore,
    publisher: &'a dyn SignalPublisher,
}

impl<'a> DecisionEmitter<'a> {
    pub fn new(store: &'a dyn HedgeStore, publisher: &'a dyn SignalPublisher) -> Self {
        Self { store, publisher }
    }

    pub async fn emit(&self, plan: &HedgePlan) -> HedgeResponse {
        let mut response = HedgeResponse {
            summary: HedgeSummary {
                requested_opens: plan.opens.len(),
                requested_closes: plan.closes.len(),
                failed: 0,
            },
            ..Default::default()
        };

        for decision in &plan.opens {
            let row = match self.open(decision).await {
                Ok(row) => row,
                Err(e) => {
                    warn!(symbol = decision.symbol, reason = %decision.reason, error = %e, "Failed to open hedge");
                    response.summary.failed += 1;
                    continue;
                }
            };

            info!(
                hedge_id = row.id,
                symbol = row.symbol,
                hedge_symbol = row.hedge_symbol,
                side = %row.side,
                qty = %row.qty,
                reason = %row.reason,
                "Hedge opened"
            );
            if let Err(e) = self.publisher.publish(&HedgeSignal::open(&row, decision.score)).await {
                warn!(hedge_id = row.id, error = %e, "Failed to publish open signal");
                response.summary.failed += 1;
            }
            response.opened.push(row);
        }

        for decision in &plan.closes {
            let row = match self.close(decision).await {
                Ok(row) => row,
                Err(e) => {
                    warn!(hedge_id = ?decision.hedge_id, error = %e, "Failed to close hedge");
                    response.summary.failed += 1;
                    continue;
                }
            };

            info!(hedge_id = row.id, symbol = row.symbol, reason = %row.reason, "Hedge closed");
            if let Err(e) = self.publisher.publish(&HedgeSignal::close(&row)).await {
                warn!(hedge_id = row.id, error = %e, "Failed to publish close signal");
                response.summary.failed += 1;
            }
            response.closed.push(row);
        }

        response
    }

    async fn open(&self, decision: &HedgeDecision) -> Result<HedgeRow> {
        let hedge = NewHedge {
            symbol: decision.symbol.clone(),
            hedge_symbol: decision.hedge_symbol.clone(),
            side: decision.side,
            qty: decision.quantity,
            reason: decision.reason,
            score: decision.score,
            metadata: json!({
                "score": decision.score,
                "notes": decision.notes,
            }),
        };
        self.store.insert_hedge(&hedge).await
    }

    async fn close(&self, decision: &HedgeDecision) -> Result<HedgeRow> {
        let id = decision
            .hedge_id
            .context("close decision without hedge id")?;
        let close = HedgeClose {
            close_price: decision.close_price,
            metadata: json!({ "closeReason": decision.notes }),
        };
        self.store.close_hedge(id, &close).await
    }
}
