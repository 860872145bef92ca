//! Hedge instrument selection.

use hedgebot_core::HedgeMode;

use crate::types::CorrelationMatrix;

/// A substitute must be at least this negatively correlated to be used in netting mode.
pub const NETTING_CORRELATION_THRESHOLD: f64 = -0.6;

/// Chooses the instrument that hedges `symbol`.
///
/// Hedging mode always offsets the symbol itself. Netting mode picks the most
/// negatively correlated candidate from the symbol's correlation row, provided
/// it is at or below [`NETTING_CORRELATION_THRESHOLD`]; ties go to the first
/// candidate in symbol order. Anything else falls back to the symbol itself.
#[must_use]
pub fn select_hedge_symbol(symbol: &str, mode: HedgeMode, correlations: &CorrelationMatrix) -> String {
    if mode == HedgeMode::Hedging {
        return symbol.to_string();
    }

    let best = correlations.get(symbol).and_then(|row| {
        row.iter()
            .filter(|(candidate, _)| candidate.as_str() != symbol)
            .fold(None::<(&String, f64)>, |best, (candidate, &value)| match best {
                Some((_, min)) if value >= min => best,
                _ => Some((candidate, value)),
            })
    });

    match best {
        Some((candidate, value)) if value <= NETTING_CORRELATION_THRESHOLD => {
            tracing::debug!(symbol, hedge_symbol = candidate, correlation = value, "Netting via substitute");
            candidate.clone()
        }
        _ => symbol.to_string(),
    }
}
