//! Trigger rules that decide whether an exposure needs a new hedge.
//!
//! Rules are held in an explicit ordered list and the first rule that fires
//! wins, so an exposure is never hedged for two causes in the same cycle.
//! The default order is ATR spike, then drawdown, then news.

use hedgebot_core::HedgeReason;
use tracing::debug;

use crate::types::{AggregatedExposure, CycleContext, NewsEvent};

/// Net exposures at or below this are treated as flat.
pub const FLAT_EPSILON: f64 = 1e-6;

/// A fired trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trigger {
    pub reason: HedgeReason,
    pub score: f64,
}

impl Trigger {
    #[must_use]
    pub const fn new(reason: HedgeReason, score: f64) -> Self {
        Self { reason, score }
    }
}

/// One cause that can justify a hedge.
pub trait TriggerRule: Send + Sync {
    /// Reason recorded on hedges this rule opens.
    fn reason(&self) -> HedgeReason;

    /// Returns a trigger when the rule fires for `exposure`.
    fn evaluate(&self, exposure: &AggregatedExposure, ctx: &CycleContext) -> Option<Trigger>;
}

/// Volatility ratio `atr/price` strictly above `spike multiplier × median ratio`.
#[derive(Debug, Default, Clone, Copy)]
pub struct AtrSpikeRule;

impl TriggerRule for AtrSpikeRule {
    fn reason(&self) -> HedgeReason {
        HedgeReason::AtrSpike
    }

    fn evaluate(&self, exposure: &AggregatedExposure, ctx: &CycleContext) -> Option<Trigger> {
        let snapshot = ctx.snapshot(&exposure.symbol)?;
        if !snapshot.has_baseline() {
            return None;
        }

        let ratio = snapshot.ratio();
        let threshold = ctx.config.volatility_spike_multiplier * snapshot.median_ratio;
        if ratio > threshold {
            let score = (ratio / snapshot.median_ratio).max(1.0);
            return Some(Trigger::new(HedgeReason::AtrSpike, score));
        }
        None
    }
}

/// Absolute drawdown (in R) at or beyond the configured trigger.
#[derive(Debug, Default, Clone, Copy)]
pub struct DrawdownRule;

impl TriggerRule for DrawdownRule {
    fn reason(&self) -> HedgeReason {
        HedgeReason::DdLimit
    }

    fn evaluate(&self, _exposure: &AggregatedExposure, ctx: &CycleContext) -> Option<Trigger> {
        let drawdown = ctx.drawdown_r.abs();
        (drawdown >= ctx.config.drawdown_trigger_r)
            .then(|| Trigger::new(HedgeReason::DdLimit, drawdown))
    }
}

/// A relevant news event inside the lead window.
#[derive(Debug, Default, Clone, Copy)]
pub struct NewsRule;

impl TriggerRule for NewsRule {
    fn reason(&self) -> HedgeReason {
        HedgeReason::News
    }

    fn evaluate(&self, exposure: &AggregatedExposure, ctx: &CycleContext) -> Option<Trigger> {
        relevant_news_score(&ctx.news, &exposure.symbol, ctx.config.news_lead_minutes)
            .map(|score| Trigger::new(HedgeReason::News, score))
    }
}

/// Score of a single event: severity weight scaled by proximity, floored at 0.5.
#[must_use]
pub fn news_score(event: &NewsEvent, horizon_minutes: f64) -> f64 {
    let time_factor = ((horizon_minutes - event.minutes_until) / horizon_minutes).max(0.5);
    (event.severity.weight() * time_factor).max(0.5)
}

/// Highest score among events relevant to `symbol`, or `None` when nothing is relevant.
#[must_use]
pub fn relevant_news_score(news: &[NewsEvent], symbol: &str, horizon_minutes: f64) -> Option<f64> {
    news.iter()
        .filter(|event| event.is_relevant(symbol, horizon_minutes))
        .map(|event| news_score(event, horizon_minutes))
        .reduce(f64::max)
}

/// Ordered trigger rules; the first rule that fires wins.
pub struct TriggerEvaluator {
    rules: Vec<Box<dyn TriggerRule>>,
}

impl Default for TriggerEvaluator {
    fn default() -> Self {
        Self::empty()
            .with_rule(Box::new(AtrSpikeRule))
            .with_rule(Box::new(DrawdownRule))
            .with_rule(Box::new(NewsRule))
    }
}

impl TriggerEvaluator {
    /// Creates an evaluator with no rules.
    #[must_use]
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Builder method appending a rule at the lowest precedence.
    #[must_use]
    pub fn with_rule(mut self, rule: Box<dyn TriggerRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Inserts a rule at `index` (0 = highest precedence), clamped to the end.
    pub fn insert_rule(&mut self, index: usize, rule: Box<dyn TriggerRule>) {
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
    }

    /// Reasons in precedence order.
    #[must_use]
    pub fn precedence(&self) -> Vec<HedgeReason> {
        self.rules.iter().map(|rule| rule.reason()).collect()
    }

    /// Evaluates rules in order for one exposure. Flat exposures never trigger.
    #[must_use]
    pub fn evaluate(&self, exposure: &AggregatedExposure, ctx: &CycleContext) -> Option<Trigger> {
        if exposure.net.abs() <= FLAT_EPSILON {
            return None;
        }

        let trigger = self.rules.iter().find_map(|rule| rule.evaluate(exposure, ctx));
        if let Some(t) = trigger {
            debug!(symbol = exposure.symbol, reason = %t.reason, score = t.score, "Trigger fired");
        }
        trigger
    }
}
