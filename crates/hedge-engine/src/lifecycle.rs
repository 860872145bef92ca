//! Hedge lifecycle: open gating and hysteresis-based close rules.
//!
//! Close thresholds are looser than open thresholds (recovery buffer below the
//! spike multiplier, half the drawdown trigger) so a hedge does not flap
//! between open and closed on small moves.

use std::collections::{BTreeMap, HashSet};

use hedgebot_core::{HedgeReason, HedgeRow};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::triggers::relevant_news_score;
use crate::types::{AggregatedExposure, CycleContext, HedgeAction, HedgeDecision};

/// Tracks which (symbol, reason) pairs already have an open hedge.
///
/// Seeded from the start-of-cycle snapshot of active hedges. Each admitted
/// open is recorded so the same pair cannot be opened twice in one cycle.
#[derive(Debug, Default)]
pub struct OpenGate {
    active: HashSet<(String, HedgeReason)>,
}

impl OpenGate {
    #[must_use]
    pub fn from_active(active: &[HedgeRow]) -> Self {
        Self {
            active: active
                .iter()
                .filter(|row| row.is_open())
                .map(|row| (row.symbol.clone(), row.reason))
                .collect(),
        }
    }

    #[must_use]
    pub fn is_blocked(&self, symbol: &str, reason: HedgeReason) -> bool {
        self.active.contains(&(symbol.to_string(), reason))
    }

    /// Returns `true` and records the pair if no open hedge exists for it.
    pub fn admit(&mut self, symbol: &str, reason: HedgeReason) -> bool {
        let admitted = self.active.insert((symbol.to_string(), reason));
        if !admitted {
            debug!(symbol, reason = %reason, "Open suppressed, hedge already active");
        }
        admitted
    }
}

/// Whether an open hedge's originating condition has cleared.
#[must_use]
pub fn should_close(row: &HedgeRow, ctx: &CycleContext) -> bool {
    match row.reason {
        HedgeReason::AtrSpike => match ctx.snapshot(&row.symbol) {
            Some(snapshot) if snapshot.has_baseline() => {
                snapshot.ratio() <= ctx.config.volatility_recovery_buffer * snapshot.median_ratio
            }
            // No usable reading: keep the hedge on.
            _ => false,
        },
        HedgeReason::DdLimit => {
            let release = (ctx.config.drawdown_trigger_r * 0.5).max(1.0);
            ctx.drawdown_r.abs() < release
        }
        HedgeReason::News => {
            relevant_news_score(&ctx.news, &row.symbol, ctx.config.news_lead_minutes).is_none()
        }
    }
}

/// Price recorded when closing: hedge symbol snapshot, then exposed symbol
/// snapshot, then the aggregated exposure's last price.
#[must_use]
pub fn close_price(
    row: &HedgeRow,
    ctx: &CycleContext,
    exposures: &BTreeMap<String, AggregatedExposure>,
) -> Option<Decimal> {
    ctx.snapshot(&row.hedge_symbol)
        .or_else(|| ctx.snapshot(&row.symbol))
        .map(|s| s.price)
        .or_else(|| exposures.get(&row.symbol).and_then(|e| e.price))
        .and_then(Decimal::from_f64)
        .map(|p| p.round_dp(6))
}

/// Close decisions for every open hedge whose condition has cleared, ordered by id.
#[must_use]
pub fn close_decisions(
    active: &[HedgeRow],
    ctx: &CycleContext,
    exposures: &BTreeMap<String, AggregatedExposure>,
) -> Vec<HedgeDecision> {
    let mut rows: Vec<&HedgeRow> = active.iter().filter(|row| row.is_open()).collect();
    rows.sort_by_key(|row| row.id);

    rows.into_iter()
        .filter(|row| should_close(row, ctx))
        .map(|row| {
            info!(
                hedge_id = row.id,
                symbol = row.symbol,
                reason = %row.reason,
                "Close condition met"
            );
            HedgeDecision {
                action: HedgeAction::Close,
                symbol: row.symbol.clone(),
                hedge_symbol: row.hedge_symbol.clone(),
                side: row.side,
                quantity: row.qty,
                reason: row.reason,
                score: 1.0,
                hedge_id: Some(row.id),
                close_price: close_price(row, ctx, exposures),
                notes: Some(format!("{} condition cleared", row.reason)),
            }
        })
        .collect()
}
