//! Outbound signal channel backed by the `signals` table.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use hedgebot_core::{HedgeSignal, SignalPublisher};

/// Publishes hedge signals by inserting them for execution to pick up.
#[derive(Debug, Clone)]
pub struct PgSignalChannel {
    pool: PgPool,
}

impl PgSignalChannel {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SignalPublisher for PgSignalChannel {
    async fn publish(&self, signal: &HedgeSignal) -> Result<()> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO signals
                (hedge_id, symbol, direction, order_type, quantity, reason, score, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(signal.hedge_id)
        .bind(&signal.symbol)
        .bind(signal.direction.as_str())
        .bind(signal.order_type.as_str())
        .bind(signal.quantity)
        .bind(signal.reason.as_str())
        .bind(signal.score)
        .bind(&signal.source)
        .fetch_one(&self.pool)
        .await?;

        debug!(signal_id = id, hedge_id = signal.hedge_id, direction = signal.direction.as_str(), "Signal published");
        Ok(())
    }
}
