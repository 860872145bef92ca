//! Hedge position sizing.
//!
//! Quantities are computed at full `f64` precision; rounding to 6 decimal
//! places happens where decisions are built, not here.

use hedgebot_core::HedgeReason;

use crate::triggers::Trigger;
use crate::types::{AggregatedExposure, CycleContext};

/// Floor on `atr × pipValue` in the drawdown sizing denominator.
pub const MIN_RISK_PER_UNIT: f64 = 1e-6;

/// Raw hedge quantity for a trigger, before the basket cap.
///
/// - ATR spike: `base × beta × max(1, score)`
/// - Drawdown: `risk budget / max(atr × pipValue, 1e-6)` where the budget is
///   the supplied risk capital, else `price × base`
/// - News: `base × max(score, 1)`
#[must_use]
pub fn raw_quantity(exposure: &AggregatedExposure, trigger: &Trigger, ctx: &CycleContext) -> f64 {
    let base = exposure.base_exposure();
    match trigger.reason {
        HedgeReason::AtrSpike => base * exposure.beta * trigger.score.max(1.0),
        HedgeReason::DdLimit => {
            let snapshot = ctx.snapshot(&exposure.symbol);
            let atr = snapshot.map_or(0.0, |s| s.atr);
            // Defaults to 1 when neither the snapshot nor the exposure carries a pip value.
            let pip_value = snapshot
                .and_then(|s| s.pip_value)
                .or(exposure.pip_value)
                .unwrap_or(1.0);
            let price = exposure
                .price
                .or_else(|| snapshot.map(|s| s.price))
                .unwrap_or(0.0);
            let risk_budget = ctx.drawdown_risk_capital.unwrap_or(price * base);
            risk_budget / (atr * pip_value).max(MIN_RISK_PER_UNIT)
        }
        HedgeReason::News => base * trigger.score.max(1.0),
    }
}

/// Caps a quantity at `base × max_multiple` when the multiple is positive.
#[must_use]
pub fn cap_quantity(quantity: f64, base_exposure: f64, max_multiple: f64) -> f64 {
    if max_multiple > 0.0 {
        quantity.min(base_exposure * max_multiple)
    } else {
        quantity
    }
}

/// Final hedge quantity for a trigger: raw size capped by the basket risk multiple.
#[must_use]
pub fn size_hedge(exposure: &AggregatedExposure, trigger: &Trigger, ctx: &CycleContext) -> f64 {
    let quantity = raw_quantity(exposure, trigger, ctx);
    cap_quantity(
        quantity,
        exposure.base_exposure(),
        ctx.config.max_basket_risk_multiple,
    )
    .max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VolatilitySnapshot;

    fn exposure(net: f64, beta: f64) -> AggregatedExposure {
        AggregatedExposure {
            symbol: "EURUSD".to_string(),
            net,
            gross: net.abs(),
            beta,
            price: None,
            pip_value: None,
        }
    }

    fn snapshot(atr: f64, price: f64, pip_value: Option<f64>) -> VolatilitySnapshot {
        VolatilitySnapshot {
            symbol: "EURUSD".to_string(),
            atr,
            price,
            median_ratio: 0.01,
            pip_value,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn atr_sizing_scales_by_beta_and_score() {
        let ctx = CycleContext::default();
        let trigger = Trigger::new(HedgeReason::AtrSpike, 1.31);
        assert!(approx(size_hedge(&exposure(100_000.0, 1.0), &trigger, &ctx), 131_000.0));
        // beta 0.5 keeps it well under the cap
        assert!(approx(size_hedge(&exposure(-10.0, 0.5), &trigger, &ctx), 6.55));
    }

    #[test]
    fn cap_holds_regardless_of_score() {
        let ctx = CycleContext::default();
        for score in [1.0, 1.4, 2.0, 10.0, 1e9] {
            for reason in [HedgeReason::AtrSpike, HedgeReason::News, HedgeReason::DdLimit] {
                let q = size_hedge(&exposure(10.0, 3.0), &Trigger::new(reason, score), &ctx);
                assert!(q <= 15.0 + 1e-12, "{reason} score {score} sized {q}");
            }
        }
    }

    #[test]
    fn news_sizing_uses_unit_floor_on_score() {
        let ctx = CycleContext::default();
        let q = size_hedge(&exposure(10.0, 2.0), &Trigger::new(HedgeReason::News, 0.5), &ctx);
        assert!(approx(q, 10.0));
        let q = size_hedge(&exposure(10.0, 2.0), &Trigger::new(HedgeReason::News, 1.2), &ctx);
        assert!(approx(q, 12.0));
    }

    #[test]
    fn drawdown_sizing_prefers_risk_capital() {
        let mut ctx = CycleContext {
            drawdown_risk_capital: Some(50.0),
            ..Default::default()
        };
        ctx.volatility
            .insert("EURUSD".to_string(), snapshot(0.5, 1.0, Some(10.0)));
        let trigger = Trigger::new(HedgeReason::DdLimit, 2.5);

        // 50 / (0.5 * 10) = 10, under the cap of 1000 * 1.5
        let q = raw_quantity(&exposure(1000.0, 1.0), &trigger, &ctx);
        assert!(approx(q, 10.0));
    }

    #[test]
    fn drawdown_sizing_falls_back_to_notional_and_unit_pip() {
        let mut ctx = CycleContext::default();
        ctx.volatility
            .insert("EURUSD".to_string(), snapshot(4.0, 2.0, None));
        let mut exp = exposure(100.0, 1.0);
        exp.price = Some(2.0);
        let trigger = Trigger::new(HedgeReason::DdLimit, 2.0);

        // budget 2 * 100 = 200, pip value 1: 200 / 4 = 50
        assert!(approx(raw_quantity(&exp, &trigger, &ctx), 50.0));

        // exposure pip value used when the snapshot has none
        exp.pip_value = Some(2.0);
        assert!(approx(raw_quantity(&exp, &trigger, &ctx), 25.0));
    }

    #[test]
    fn drawdown_sizing_without_snapshot_hits_cap() {
        let ctx = CycleContext {
            drawdown_risk_capital: Some(1.0),
            ..Default::default()
        };
        let trigger = Trigger::new(HedgeReason::DdLimit, 2.0);
        // 1 / 1e-6 = 1e6 raw, capped at 10 * 1.5
        assert!(approx(size_hedge(&exposure(10.0, 1.0), &trigger, &ctx), 15.0));
    }

    #[test]
    fn cap_is_skipped_for_non_positive_multiple() {
        assert!(approx(cap_quantity(100.0, 10.0, 0.0), 100.0));
        assert!(approx(cap_quantity(100.0, 10.0, 1.5), 15.0));
    }
}
