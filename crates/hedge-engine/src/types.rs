//! Types for hedge evaluation requests, per-cycle context, and decisions.

use std::collections::{BTreeMap, HashMap};

use hedgebot_core::{
    ExposureInput, HedgeConfig, HedgeConfigOverride, HedgeMode, HedgeReason, HedgeRow, HedgeSide,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Symbol values on a news event that apply to every exposure.
pub const GLOBAL_NEWS_SYMBOLS: [&str; 2] = ["GLOBAL", "ALL"];

/// Volatility reading for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilitySnapshot {
    pub symbol: String,
    pub atr: f64,
    pub price: f64,
    /// Typical `atr/price` for the symbol.
    pub median_ratio: f64,
    #[serde(default)]
    pub pip_value: Option<f64>,
}

impl VolatilitySnapshot {
    /// Current volatility ratio `atr/price`.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.atr / self.price
    }

    /// A snapshot with a non-positive median cannot be compared against.
    #[must_use]
    pub fn has_baseline(&self) -> bool {
        self.median_ratio > 0.0 && self.price > 0.0
    }
}

/// Impact class of a scheduled news event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsSeverity {
    Low,
    Medium,
    High,
}

impl NewsSeverity {
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::High => 1.3,
            Self::Medium => 1.0,
            Self::Low => 0.6,
        }
    }
}

/// Scheduled news event from the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsEvent {
    /// `None`, `"GLOBAL"` or `"ALL"` apply to every symbol.
    #[serde(default)]
    pub symbol: Option<String>,
    pub minutes_until: f64,
    pub severity: NewsSeverity,
}

impl NewsEvent {
    #[must_use]
    pub fn applies_to(&self, symbol: &str) -> bool {
        match self.symbol.as_deref() {
            None => true,
            Some(s) => {
                s == symbol || GLOBAL_NEWS_SYMBOLS.iter().any(|g| s.eq_ignore_ascii_case(g))
            }
        }
    }

    /// Inside the lead window `[0, horizon]` and relevant to `symbol`.
    #[must_use]
    pub fn is_relevant(&self, symbol: &str, horizon_minutes: f64) -> bool {
        self.minutes_until >= 0.0 && self.minutes_until <= horizon_minutes && self.applies_to(symbol)
    }
}

/// Symbol → (candidate → correlation). Ordered so netting picks are deterministic.
pub type CorrelationMatrix = BTreeMap<String, BTreeMap<String, f64>>;

/// One evaluation request, as received from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgeRequest {
    /// When absent, exposures are read from the trade ledger.
    #[serde(default)]
    pub exposures: Option<Vec<ExposureInput>>,
    #[serde(default)]
    pub volatility: Vec<VolatilitySnapshot>,
    #[serde(default, rename = "drawdownR")]
    pub drawdown_r: Option<f64>,
    #[serde(default)]
    pub drawdown_risk_capital: Option<f64>,
    #[serde(default)]
    pub correlations: CorrelationMatrix,
    #[serde(default)]
    pub news: Vec<NewsEvent>,
    #[serde(default)]
    pub mode: HedgeMode,
    #[serde(default)]
    pub config: Option<HedgeConfigOverride>,
}

/// Net/gross/beta view of every exposure on one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedExposure {
    pub symbol: String,
    /// Signed quantity, long positive.
    pub net: f64,
    pub gross: f64,
    /// Quantity-weighted mean beta.
    pub beta: f64,
    pub price: Option<f64>,
    pub pip_value: Option<f64>,
}

impl AggregatedExposure {
    #[must_use]
    pub fn base_exposure(&self) -> f64 {
        self.net.abs()
    }
}

/// Everything a cycle reads besides exposures and active hedges. Built once per
/// invocation from a validated request and never shared across cycles.
#[derive(Debug, Clone, Default)]
pub struct CycleContext {
    pub volatility: HashMap<String, VolatilitySnapshot>,
    pub drawdown_r: f64,
    pub drawdown_risk_capital: Option<f64>,
    pub correlations: CorrelationMatrix,
    pub news: Vec<NewsEvent>,
    pub mode: HedgeMode,
    pub config: HedgeConfig,
}

impl CycleContext {
    #[must_use]
    pub fn snapshot(&self, symbol: &str) -> Option<&VolatilitySnapshot> {
        self.volatility.get(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HedgeAction {
    Open,
    Close,
}

/// A single open or close decision produced by one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgeDecision {
    pub action: HedgeAction,
    pub symbol: String,
    pub hedge_symbol: String,
    pub side: HedgeSide,
    /// Rounded to 6 decimal places.
    pub quantity: Decimal,
    pub reason: HedgeReason,
    pub score: f64,
    /// Set on every `CLOSE`.
    pub hedge_id: Option<i64>,
    pub close_price: Option<Decimal>,
    pub notes: Option<String>,
}

/// Decisions for one cycle, opens ordered by symbol, closes by hedge id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HedgePlan {
    pub opens: Vec<HedgeDecision>,
    pub closes: Vec<HedgeDecision>,
}

impl HedgePlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.opens.is_empty() && self.closes.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgeSummary {
    pub requested_opens: usize,
    pub requested_closes: usize,
    /// Decisions skipped or left unpublished because a write failed.
    pub failed: usize,
}

/// Result of one full evaluation cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HedgeResponse {
    pub opened: Vec<HedgeRow>,
    pub closed: Vec<HedgeRow>,
    pub summary: HedgeSummary,
}
