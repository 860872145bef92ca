//! Folds raw exposure rows into one net/gross/beta record per symbol.

use std::collections::BTreeMap;

use hedgebot_core::ExposureInput;
use tracing::debug;

use crate::types::AggregatedExposure;

#[derive(Default)]
struct Accumulator {
    net: f64,
    gross: f64,
    weighted_beta: f64,
    price: Option<f64>,
    pip_value: Option<f64>,
}

/// Aggregates exposures per symbol.
///
/// Rows with a non-finite or non-positive quantity are discarded. The last
/// price and pip value seen for a symbol win. The map is ordered by symbol so
/// downstream decisions come out in a stable order.
#[must_use]
pub fn aggregate_exposures(exposures: &[ExposureInput]) -> BTreeMap<String, AggregatedExposure> {
    let mut acc: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for exposure in exposures {
        if !exposure.quantity.is_finite() || exposure.quantity <= 0.0 {
            debug!(
                symbol = exposure.symbol,
                quantity = exposure.quantity,
                "Discarding exposure with unusable quantity"
            );
            continue;
        }

        let entry = acc.entry(exposure.symbol.as_str()).or_default();
        entry.net += exposure.direction.sign() * exposure.quantity;
        entry.gross += exposure.quantity;
        entry.weighted_beta += exposure.quantity * exposure.beta;
        if exposure.price.is_some() {
            entry.price = exposure.price;
        }
        if exposure.pip_value.is_some() {
            entry.pip_value = exposure.pip_value;
        }
    }

    acc.into_iter()
        .map(|(symbol, a)| {
            let beta = if a.gross > 0.0 {
                a.weighted_beta / a.gross
            } else {
                1.0
            };
            (
                symbol.to_string(),
                AggregatedExposure {
                    symbol: symbol.to_string(),
                    net: a.net,
                    gross: a.gross,
                    beta,
                    price: a.price,
                    pip_value: a.pip_value,
                },
            )
        })
        .collect()
}
