//! Request validation.
//!
//! A request is either accepted whole or rejected before any read or
//! computation happens. Accepted requests are normalized (symbols trimmed and
//! upper-cased, config merged over the service defaults) into a
//! [`CycleContext`].

use std::collections::{BTreeMap, HashMap};

use hedgebot_core::{ExposureInput, HedgeConfig};

use crate::error::{HedgeError, Result};
use crate::types::{CorrelationMatrix, CycleContext, HedgeRequest, NewsEvent, VolatilitySnapshot};

/// A request that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    /// `None` means "read from the trade ledger".
    pub exposures: Option<Vec<ExposureInput>>,
    pub context: CycleContext,
}

/// Validates and normalizes a request against the service defaults.
///
/// # Errors
/// Returns `HedgeError::InvalidRequest` naming the first offending field.
pub fn validate_request(request: HedgeRequest, defaults: &HedgeConfig) -> Result<ValidatedRequest> {
    let config = match &request.config {
        Some(overrides) => defaults.merged(overrides),
        None => defaults.clone(),
    };
    config.validate()?;

    let exposures = request
        .exposures
        .map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, row)| validate_exposure(i, row))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?;

    let mut volatility = HashMap::with_capacity(request.volatility.len());
    for (i, snapshot) in request.volatility.into_iter().enumerate() {
        let snapshot = validate_snapshot(i, snapshot)?;
        // Later snapshots for the same symbol replace earlier ones.
        volatility.insert(snapshot.symbol.clone(), snapshot);
    }

    let drawdown_r = match request.drawdown_r {
        Some(value) if !value.is_finite() => {
            return Err(HedgeError::invalid("drawdownR", "must be a finite number"))
        }
        Some(value) => value,
        None => 0.0,
    };

    if let Some(capital) = request.drawdown_risk_capital {
        if !capital.is_finite() || capital < 0.0 {
            return Err(HedgeError::invalid(
                "drawdownRiskCapital",
                "must be a non-negative finite number",
            ));
        }
    }

    let news = request
        .news
        .into_iter()
        .enumerate()
        .map(|(i, event)| validate_news(i, event))
        .collect::<Result<Vec<_>>>()?;

    let correlations = validate_correlations(request.correlations)?;

    Ok(ValidatedRequest {
        exposures,
        context: CycleContext {
            volatility,
            drawdown_r,
            drawdown_risk_capital: request.drawdown_risk_capital,
            correlations,
            news,
            mode: request.mode,
            config,
        },
    })
}

/// Trims and upper-cases a symbol, rejecting blanks.
///
/// # Errors
/// Returns `HedgeError::InvalidRequest` if the symbol is empty after trimming.
pub fn normalize_symbol(raw: &str, field: &str) -> Result<String> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(HedgeError::invalid(field, "must not be blank"));
    }
    Ok(symbol)
}

fn check_optional_non_negative(value: Option<f64>, field: String) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(HedgeError::invalid(
            field,
            "must be a non-negative finite number",
        )),
        _ => Ok(()),
    }
}

fn validate_exposure(i: usize, mut row: ExposureInput) -> Result<ExposureInput> {
    row.symbol = normalize_symbol(&row.symbol, &format!("exposures[{i}].symbol"))?;
    if !row.beta.is_finite() {
        return Err(HedgeError::invalid(
            format!("exposures[{i}].beta"),
            "must be a finite number",
        ));
    }
    check_optional_non_negative(row.price, format!("exposures[{i}].price"))?;
    check_optional_non_negative(row.pip_value, format!("exposures[{i}].pipValue"))?;
    Ok(row)
}

fn validate_snapshot(i: usize, mut snapshot: VolatilitySnapshot) -> Result<VolatilitySnapshot> {
    snapshot.symbol = normalize_symbol(&snapshot.symbol, &format!("volatility[{i}].symbol"))?;
    if !snapshot.atr.is_finite() || snapshot.atr < 0.0 {
        return Err(HedgeError::invalid(
            format!("volatility[{i}].atr"),
            "must be a non-negative finite number",
        ));
    }
    if !snapshot.price.is_finite() || snapshot.price <= 0.0 {
        return Err(HedgeError::invalid(
            format!("volatility[{i}].price"),
            "must be a positive finite number",
        ));
    }
    // A non-positive median is tolerated: the snapshot simply cannot fire or close ATR hedges.
    if !snapshot.median_ratio.is_finite() {
        return Err(HedgeError::invalid(
            format!("volatility[{i}].medianRatio"),
            "must be a finite number",
        ));
    }
    check_optional_non_negative(snapshot.pip_value, format!("volatility[{i}].pipValue"))?;
    Ok(snapshot)
}

fn validate_news(i: usize, mut event: NewsEvent) -> Result<NewsEvent> {
    if !event.minutes_until.is_finite() {
        return Err(HedgeError::invalid(
            format!("news[{i}].minutesUntil"),
            "must be a finite number",
        ));
    }
    if let Some(symbol) = event.symbol.take() {
        event.symbol = Some(normalize_symbol(&symbol, &format!("news[{i}].symbol"))?);
    }
    Ok(event)
}

fn validate_correlations(raw: CorrelationMatrix) -> Result<CorrelationMatrix> {
    let mut matrix = BTreeMap::new();
    for (symbol, row) in raw {
        let symbol = normalize_symbol(&symbol, "correlations")?;
        let mut normalized = BTreeMap::new();
        for (candidate, value) in row {
            let candidate = normalize_symbol(&candidate, &format!("correlations.{symbol}"))?;
            if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
                return Err(HedgeError::invalid(
                    format!("correlations.{symbol}.{candidate}"),
                    format!("must lie in [-1, 1], got {value}"),
                ));
            }
            normalized.insert(candidate, value);
        }
        matrix
            .entry(symbol)
            .or_insert_with(BTreeMap::new)
            .extend(normalized);
    }
    Ok(matrix)
}
