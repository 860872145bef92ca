//! Read-only access to the trade ledger's open trades.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use tracing::warn;

use hedgebot_core::{ExposureDirection, ExposureInput, TradeLedger};

/// `PostgreSQL`-backed [`TradeLedger`] over the `trades` table.
#[derive(Debug, Clone)]
pub struct PgTradeLedger {
    pool: PgPool,
}

impl PgTradeLedger {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Converts one ledger row, skipping rows whose direction or volume cannot be used.
fn to_exposure(symbol: String, direction: &str, volume: Decimal) -> Option<ExposureInput> {
    let direction = match direction.parse::<ExposureDirection>() {
        Ok(d) => d,
        Err(e) => {
            warn!(symbol, error = %e, "Skipping trade with unknown direction");
            return None;
        }
    };
    let Some(quantity) = volume.to_f64() else {
        warn!(symbol, %volume, "Skipping trade with unrepresentable volume");
        return None;
    };
    Some(ExposureInput::new(symbol, direction, quantity))
}

#[async_trait]
impl TradeLedger for PgTradeLedger {
    async fn open_exposures(&self) -> Result<Vec<ExposureInput>> {
        let rows = sqlx::query(
            r"
            SELECT symbol, direction, volume
            FROM trades
            WHERE closed_at IS NULL
            ORDER BY symbol ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut exposures = Vec::with_capacity(rows.len());
        for row in rows {
            let symbol: String = row.try_get("symbol")?;
            let direction: String = row.try_get("direction")?;
            let volume: Decimal = row.try_get("volume")?;
            exposures.extend(to_exposure(symbol, &direction, volume));
        }
        Ok(exposures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_row_conversion() {
        let exposure = to_exposure("EURUSD".to_string(), "sell", dec!(2.5)).unwrap();
        assert_eq!(exposure.direction, ExposureDirection::Short);
        assert!((exposure.quantity - 2.5).abs() < f64::EPSILON);
        assert!((exposure.beta - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_direction_is_skipped() {
        assert!(to_exposure("EURUSD".to_string(), "HOLD", dec!(1)).is_none());
    }
}
