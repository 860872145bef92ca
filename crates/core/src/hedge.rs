//! Domain types for exposures, persisted hedges, and outbound hedge signals.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::CoreError;

/// Direction of an open exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExposureDirection {
    Long,
    Short,
}

impl ExposureDirection {
    /// +1 for long, -1 for short.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }
}

impl FromStr for ExposureDirection {
    type Err = CoreError;

    /// Accepts ledger spellings as well (`BUY`/`SELL`), case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" | "BUY" => Ok(Self::Long),
            "SHORT" | "SELL" => Ok(Self::Short),
            _ => Err(CoreError::unknown_variant("exposure direction", s)),
        }
    }
}

fn default_beta() -> f64 {
    1.0
}

/// One raw exposure row, either supplied by the caller or read from the trade ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureInput {
    pub symbol: String,
    pub direction: ExposureDirection,
    pub quantity: f64,
    /// Sensitivity coefficient, defaults to 1.
    #[serde(default = "default_beta")]
    pub beta: f64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub pip_value: Option<f64>,
}

impl ExposureInput {
    /// Creates an exposure with beta 1 and no price data.
    pub fn new(symbol: impl Into<String>, direction: ExposureDirection, quantity: f64) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
            quantity,
            beta: default_beta(),
            price: None,
            pip_value: None,
        }
    }

    /// Builder method to set beta.
    #[must_use]
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Builder method to set the last observed price.
    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Builder method to set the pip value.
    #[must_use]
    pub fn with_pip_value(mut self, pip_value: f64) -> Self {
        self.pip_value = Some(pip_value);
        self
    }
}

/// Side of a hedge position. Always opposite to the net exposure it offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HedgeSide {
    LongHedge,
    ShortHedge,
}

impl HedgeSide {
    /// Side that offsets a signed net exposure: long exposure is hedged short.
    #[must_use]
    pub fn against(net: f64) -> Self {
        if net > 0.0 {
            Self::ShortHedge
        } else {
            Self::LongHedge
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LongHedge => "LONG_HEDGE",
            Self::ShortHedge => "SHORT_HEDGE",
        }
    }
}

impl fmt::Display for HedgeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HedgeSide {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LONG_HEDGE" => Ok(Self::LongHedge),
            "SHORT_HEDGE" => Ok(Self::ShortHedge),
            _ => Err(CoreError::unknown_variant("hedge side", s)),
        }
    }
}

/// Cause that opened a hedge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HedgeReason {
    AtrSpike,
    DdLimit,
    News,
}

impl HedgeReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AtrSpike => "ATR_SPIKE",
            Self::DdLimit => "DD_LIMIT",
            Self::News => "NEWS",
        }
    }
}

impl fmt::Display for HedgeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HedgeReason {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ATR_SPIKE" => Ok(Self::AtrSpike),
            "DD_LIMIT" => Ok(Self::DdLimit),
            "NEWS" => Ok(Self::News),
            _ => Err(CoreError::unknown_variant("hedge reason", s)),
        }
    }
}

/// Lifecycle status of a persisted hedge.
///
/// `Cancelled` is only ever set by a manual override outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HedgeStatus {
    Open,
    Closed,
    Cancelled,
}

impl HedgeStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for HedgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HedgeStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(CoreError::unknown_variant("hedge status", s)),
        }
    }
}

/// A hedge row as stored in the hedge registry.
///
/// Serializes camelCase like the rest of the HTTP response; column-style
/// snake_case names are accepted on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HedgeRow {
    pub id: i64,
    /// Exposed symbol the hedge protects.
    pub symbol: String,
    /// Instrument actually traded for the hedge.
    #[serde(alias = "hedge_symbol")]
    pub hedge_symbol: String,
    pub side: HedgeSide,
    pub qty: Decimal,
    pub reason: HedgeReason,
    pub status: HedgeStatus,
    pub score: Option<f64>,
    pub metadata: JsonValue,
    #[serde(default, alias = "close_price")]
    pub close_price: Option<Decimal>,
    #[serde(alias = "opened_at")]
    pub opened_at: DateTime<Utc>,
    #[serde(default, alias = "closed_at")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl HedgeRow {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == HedgeStatus::Open
    }
}

/// Insert payload for a new hedge. Status is implied `OPEN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHedge {
    pub symbol: String,
    pub hedge_symbol: String,
    pub side: HedgeSide,
    pub qty: Decimal,
    pub reason: HedgeReason,
    pub score: f64,
    pub metadata: JsonValue,
}

/// Update payload that moves an open hedge to `CLOSED`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeClose {
    pub close_price: Option<Decimal>,
    /// Merged over the row's existing metadata.
    pub metadata: JsonValue,
}

/// Direction carried by an outbound hedge signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalDirection {
    Long,
    Short,
    Flat,
}

impl SignalDirection {
    /// Direction published when a hedge of the given side opens: the inverse of the side.
    #[must_use]
    pub const fn opening(side: HedgeSide) -> Self {
        match side {
            HedgeSide::LongHedge => Self::Short,
            HedgeSide::ShortHedge => Self::Long,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
            Self::Flat => "FLAT",
        }
    }
}

/// Order type requested from execution. Hedges are always sent at market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Market,
}

impl OrderType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Market => "MARKET",
        }
    }
}

/// Payload published to the signal channel consumed by execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeSignal {
    pub hedge_id: i64,
    /// Instrument to trade (the hedge symbol).
    pub symbol: String,
    pub direction: SignalDirection,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub reason: HedgeReason,
    pub score: f64,
    pub source: String,
}

/// Source tag written on every signal the engine publishes.
pub const SIGNAL_SOURCE: &str = "hedge-engine";

impl HedgeSignal {
    /// Signal that opens the hedge described by a freshly inserted row.
    #[must_use]
    pub fn open(row: &HedgeRow, score: f64) -> Self {
        Self {
            hedge_id: row.id,
            symbol: row.hedge_symbol.clone(),
            direction: SignalDirection::opening(row.side),
            order_type: OrderType::Market,
            quantity: row.qty,
            reason: row.reason,
            score,
            source: SIGNAL_SOURCE.to_string(),
        }
    }

    /// Flat signal that unwinds a closed hedge.
    #[must_use]
    pub fn close(row: &HedgeRow) -> Self {
        Self {
            hedge_id: row.id,
            symbol: row.hedge_symbol.clone(),
            direction: SignalDirection::Flat,
            order_type: OrderType::Market,
            quantity: row.qty,
            reason: row.reason,
            score: 1.0,
            source: SIGNAL_SOURCE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(side: HedgeSide) -> HedgeRow {
        HedgeRow {
            id: 7,
            symbol: "EURUSD".to_string(),
            hedge_symbol: "USDCHF".to_string(),
            side,
            qty: dec!(1000.5),
            reason: HedgeReason::News,
            status: HedgeStatus::Open,
            score: Some(1.3),
            metadata: serde_json::json!({}),
            close_price: None,
            opened_at: Utc::now(),
            closed_at: None,
        }
    }

    #[test]
    fn test_side_against_net() {
        assert_eq!(HedgeSide::against(5.0), HedgeSide::ShortHedge);
        assert_eq!(HedgeSide::against(-5.0), HedgeSide::LongHedge);
    }

    #[test]
    fn test_enum_string_roundtrip_matches_storage_format() {
        for reason in [HedgeReason::AtrSpike, HedgeReason::DdLimit, HedgeReason::News] {
            assert_eq!(reason.as_str().parse::<HedgeReason>().unwrap(), reason);
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.as_str()));
        }
        assert_eq!("closed".parse::<HedgeStatus>().unwrap(), HedgeStatus::Closed);
        assert!("FLAT_HEDGE".parse::<HedgeSide>().is_err());
    }

    #[test]
    fn test_exposure_direction_accepts_ledger_spellings() {
        assert_eq!("buy".parse::<ExposureDirection>().unwrap(), ExposureDirection::Long);
        assert_eq!("SELL".parse::<ExposureDirection>().unwrap(), ExposureDirection::Short);
        assert!("HOLD".parse::<ExposureDirection>().is_err());
    }

    #[test]
    fn test_exposure_defaults_beta_when_missing() {
        let exposure: ExposureInput =
            serde_json::from_str(r#"{"symbol":"EURUSD","direction":"LONG","quantity":10}"#)
                .unwrap();
        assert!((exposure.beta - 1.0).abs() < f64::EPSILON);
        assert!(exposure.price.is_none());
        assert!(exposure.pip_value.is_none());
    }

    #[test]
    fn test_open_signal_carries_inverse_of_side() {
        let signal = HedgeSignal::open(&row(HedgeSide::ShortHedge), 1.31);
        assert_eq!(signal.direction, SignalDirection::Long);
        assert_eq!(signal.symbol, "USDCHF");
        assert_eq!(signal.order_type, OrderType::Market);
        assert_eq!(signal.quantity, dec!(1000.5));
    }

    #[test]
    fn test_hedge_row_serializes_camel_case() {
        let json = serde_json::to_value(row(HedgeSide::ShortHedge)).unwrap();
        assert_eq!(json["hedgeSymbol"], "USDCHF");
        assert!(json.get("hedge_symbol").is_none());
        assert!(json["closePrice"].is_null());
        assert!(json.get("openedAt").is_some());
    }

    #[test]
    fn test_hedge_row_accepts_column_names() {
        let parsed: HedgeRow = serde_json::from_value(serde_json::json!({
            "id": 3,
            "symbol": "EURUSD",
            "hedge_symbol": "EURUSD",
            "side": "SHORT_HEDGE",
            "qty": 131000,
            "reason": "ATR_SPIKE",
            "status": "OPEN",
            "score": 1.31,
            "metadata": {},
            "opened_at": "2026-01-05T09:30:00Z"
        }))
        .unwrap();
        assert_eq!(parsed.hedge_symbol, "EURUSD");
        assert!(parsed.close_price.is_none());
        assert!(parsed.closed_at.is_none());
    }

    #[test]
    fn test_long_hedge_opens_short() {
        let signal = HedgeSignal::open(&row(HedgeSide::LongHedge), 1.0);
        assert_eq!(signal.direction, SignalDirection::Short);
        assert_eq!(signal.hedge_id, 7);
    }

    #[test]
    fn test_close_signal_is_flat_with_unit_score() {
        let signal = HedgeSignal::close(&row(HedgeSide::LongHedge));
        assert_eq!(signal.direction, SignalDirection::Flat);
        assert!((signal.score - 1.0).abs() < f64::EPSILON);
        assert_eq!(signal.source, SIGNAL_SOURCE);
    }
}
