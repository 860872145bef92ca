//! Pure cycle planning: aggregated exposures and active hedges in, decisions out.
//!
//! Nothing here touches a collaborator, so the same inputs always produce the
//! same plan.

use std::collections::BTreeMap;

use hedgebot_core::{HedgeRow, HedgeSide};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::lifecycle::{close_decisions, OpenGate};
use crate::selector::select_hedge_symbol;
use crate::sizing::size_hedge;
use crate::triggers::TriggerEvaluator;
use crate::types::{AggregatedExposure, CycleContext, HedgeAction, HedgeDecision, HedgePlan};

/// Decimal places persisted for hedge quantities and prices.
pub const QUANTITY_DP: u32 = 6;

/// Converts a sized quantity to its persisted form.
///
/// Returns `None` for values that round to zero or cannot be represented.
#[must_use]
pub fn to_quantity(quantity: f64) -> Option<Decimal> {
    Decimal::from_f64(quantity)
        .map(|q| q.round_dp(QUANTITY_DP))
        .filter(|q| *q > Decimal::ZERO)
}

/// Plans one cycle.
///
/// Opens follow symbol order and closes follow hedge id, so identical
/// inputs always yield an identical plan.
#[must_use]
pub fn plan_cycle(
    exposures: &BTreeMap<String, AggregatedExposure>,
    active: &[HedgeRow],
    ctx: &CycleContext,
    evaluator: &TriggerEvaluator,
) -> HedgePlan {
    let mut gate = OpenGate::from_active(active);
    let mut opens = Vec::new();

    for exposure in exposures.values() {
        let Some(trigger) = evaluator.evaluate(exposure, ctx) else {
            continue;
        };
        if gate.is_blocked(&exposure.symbol, trigger.reason) {
            debug!(symbol = exposure.symbol, reason = %trigger.reason, "Hedge already open");
            continue;
        }

        let sized = size_hedge(exposure, &trigger, ctx);
        let Some(quantity) = to_quantity(sized) else {
            warn!(
                symbol = exposure.symbol,
                reason = %trigger.reason,
                sized,
                "Suppressing open with zero quantity"
            );
            continue;
        };

        if !gate.admit(&exposure.symbol, trigger.reason) {
            continue;
        }

        let hedge_symbol = select_hedge_symbol(&exposure.symbol, ctx.mode, &ctx.correlations);
        let notes = (hedge_symbol != exposure.symbol).then(|| {
            format!("netting {} via {hedge_symbol}", exposure.symbol)
        });

        opens.push(HedgeDecision {
            action: HedgeAction::Open,
            symbol: exposure.symbol.clone(),
            hedge_symbol,
            side: HedgeSide::against(exposure.net),
            quantity,
            reason: trigger.reason,
            score: trigger.score,
            hedge_id: None,
            close_price: None,
            notes,
        });
    }

    let closes = close_decisions(active, ctx, exposures);

    HedgePlan { opens, closes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate_exposures;
    use crate::types::VolatilitySnapshot;
    use chrono::Utc;
    use hedgebot_core::ExposureDirection::{Long, Short};
    use hedgebot_core::{ExposureInput, HedgeMode, HedgeReason, HedgeStatus};
    use rust_decimal_macros::dec;

    fn snapshot(symbol: &str, atr: f64, price: f64, median: f64) -> VolatilitySnapshot {
        VolatilitySnapshot {
            symbol: symbol.to_string(),
            atr,
            price,
            median_ratio: median,
            pip_value: None,
        }
    }

    fn spike_ctx() -> CycleContext {
        let mut ctx = CycleContext::default();
        ctx.volatility.insert(
            "EURUSD".to_string(),
            snapshot("EURUSD", 0.0131, 1.0, 0.01),
        );
        ctx
    }

    fn open_row(id: i64, symbol: &str, reason: HedgeReason) -> HedgeRow {
        HedgeRow {
            id,
            symbol: symbol.to_string(),
            hedge_symbol: symbol.to_string(),
            side: HedgeSide::ShortHedge,
            qty: dec!(131000),
            reason,
            status: HedgeStatus::Open,
            score: Some(1.31),
            metadata: serde_json::json!({}),
            close_price: None,
            opened_at: Utc::now(),
            closed_at: None,
        }
    }

    #[test]
    fn atr_spike_opens_short_hedge_on_long_exposure() {
        let exposures = aggregate_exposures(&[ExposureInput::new("EURUSD", Long, 100_000.0)]);
        let plan = plan_cycle(&exposures, &[], &spike_ctx(), &TriggerEvaluator::default());

        assert!(plan.closes.is_empty());
        assert_eq!(plan.opens.len(), 1);
        let open = &plan.opens[0];
        assert_eq!(open.action, HedgeAction::Open);
        assert_eq!(open.symbol, "EURUSD");
        assert_eq!(open.hedge_symbol, "EURUSD");
        assert_eq!(open.side, HedgeSide::ShortHedge);
        assert_eq!(open.reason, HedgeReason::AtrSpike);
        assert_eq!(open.quantity, dec!(131000));
        assert!((open.score - 1.31).abs() < 1e-9);
        assert!(open.hedge_id.is_none());
    }

    #[test]
    fn existing_open_hedge_blocks_duplicate() {
        let exposures = aggregate_exposures(&[ExposureInput::new("EURUSD", Long, 100_000.0)]);
        let active = vec![open_row(7, "EURUSD", HedgeReason::AtrSpike)];
        let plan = plan_cycle(&exposures, &active, &spike_ctx(), &TriggerEvaluator::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn gate_is_per_reason() {
        let exposures = aggregate_exposures(&[ExposureInput::new("EURUSD", Short, 10.0)]);
        let ctx = CycleContext {
            drawdown_r: -3.0,
            drawdown_risk_capital: Some(1.0),
            ..Default::default()
        };
        let active = vec![open_row(1, "EURUSD", HedgeReason::AtrSpike)];
        let plan = plan_cycle(&exposures, &active, &ctx, &TriggerEvaluator::default());

        assert_eq!(plan.opens.len(), 1);
        assert_eq!(plan.opens[0].reason, HedgeReason::DdLimit);
        assert_eq!(plan.opens[0].side, HedgeSide::LongHedge);
        // 1 / 1e-6 capped at 10 * 1.5
        assert_eq!(plan.opens[0].quantity, dec!(15));
        // The ATR hedge has no snapshot so it stays open.
        assert!(plan.closes.is_empty());
    }

    #[test]
    fn planning_is_deterministic() {
        let exposures = aggregate_exposures(&[
            ExposureInput::new("XAUUSD", Long, 2.0),
            ExposureInput::new("EURUSD", Long, 100_000.0),
            ExposureInput::new("BTCUSD", Short, 1.5),
        ]);
        let ctx = CycleContext {
            drawdown_r: 2.5,
            drawdown_risk_capital: Some(1.0),
            ..spike_ctx()
        };
        let evaluator = TriggerEvaluator::default();

        let first = plan_cycle(&exposures, &[], &ctx, &evaluator);
        let second = plan_cycle(&exposures, &[], &ctx, &evaluator);
        assert_eq!(first, second);

        let symbols: Vec<_> = first.opens.iter().map(|d| d.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTCUSD", "EURUSD", "XAUUSD"]);
    }

    #[test]
    fn netting_routes_through_correlated_substitute() {
        let exposures = aggregate_exposures(&[ExposureInput::new("EURUSD", Long, 100_000.0)]);
        let mut ctx = spike_ctx();
        ctx.mode = HedgeMode::Netting;
        ctx.correlations = BTreeMap::from([(
            "EURUSD".to_string(),
            BTreeMap::from([("USDCHF".to_string(), -0.92)]),
        )]);

        let plan = plan_cycle(&exposures, &[], &ctx, &TriggerEvaluator::default());
        let open = &plan.opens[0];
        assert_eq!(open.symbol, "EURUSD");
        assert_eq!(open.hedge_symbol, "USDCHF");
        assert!(open.notes.as_deref().is_some_and(|n| n.contains("USDCHF")));
    }

    #[test]
    fn zero_quantity_opens_are_suppressed() {
        // Drawdown with no capital, price or snapshot sizes to zero.
        let exposures = aggregate_exposures(&[ExposureInput::new("EURUSD", Long, 5.0)]);
        let ctx = CycleContext {
            drawdown_r: 3.0,
            ..Default::default()
        };
        let plan = plan_cycle(&exposures, &[], &ctx, &TriggerEvaluator::default());
        assert!(plan.opens.is_empty());
    }

    #[test]
    fn closes_sorted_by_id_with_opens_in_same_cycle() {
        let exposures = aggregate_exposures(&[ExposureInput::new("EURUSD", Long, 100_000.0)]);
        let active = vec![
            open_row(12, "GBPUSD", HedgeReason::News),
            open_row(4, "USDJPY", HedgeReason::DdLimit),
        ];
        let plan = plan_cycle(&exposures, &active, &spike_ctx(), &TriggerEvaluator::default());

        assert_eq!(plan.opens.len(), 1);
        let ids: Vec<_> = plan.closes.iter().map(|d| d.hedge_id).collect();
        assert_eq!(ids, vec![Some(4), Some(12)]);
    }

    #[test]
    fn quantity_rounding() {
        assert_eq!(to_quantity(1.234_567_89), Some(dec!(1.234568)));
        assert_eq!(to_quantity(0.000_000_4), None);
        assert_eq!(to_quantity(0.0), None);
        assert_eq!(to_quantity(f64::NAN), None);
    }
}
